//! Request-level failures and their HTTP mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use todo_core::{TitleError, TodoId};

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected title; answered with 400 and the message as a plain-text body.
    #[error(transparent)]
    Validation(#[from] TitleError),

    /// No row with this id; answered with an empty 404.
    #[error("todo item {0} not found")]
    NotFound(TodoId),

    /// Request body that is not a todo payload.
    #[error(transparent)]
    Body(#[from] JsonRejection),

    /// An id segment that is not an integer names no item; answered with an
    /// empty 404.
    #[error(transparent)]
    Id(#[from] PathRejection),

    /// Fatal to the request only.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            ServiceError::Body(rejection) => match rejection {
                JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                    (StatusCode::BAD_REQUEST, rejection.body_text()).into_response()
                }
                other => other.into_response(),
            },
            ServiceError::Id(rejection) => {
                debug!(%rejection, "unmatched item id");
                StatusCode::NOT_FOUND.into_response()
            }
            ServiceError::Store(err) => {
                error!(error = %err, "todo store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
