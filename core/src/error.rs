//! Error types for the todo API client.
//!
//! # Design
//! Every non-success response collapses into one `ApiError` carrying a
//! human-readable message: the response body when there is one, otherwise a
//! synthesized status line. The status code is kept alongside the message so
//! callers that care can still tell a 404 from a 400, but `Display` shows only
//! the message.
//!
//! `ClientError` separates server-reported failures from transport failures
//! (connectivity, cancellation) so a UI can show distinct guidance for each.

use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// A non-success response from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: u16,
    message: String,
}

impl ApiError {
    /// Build from a response status and body. A blank body is replaced by
    /// `"Error: {code} {reason}"`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            status_line(status)
        } else {
            body.to_string()
        };
        Self { status, message }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

fn status_line(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("");
    format!("Error: {status} {reason}").trim_end().to_string()
}

/// Everything a todo API call can fail with.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request was cancelled or timed out before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ClientError {
    /// The `ApiError` behind this failure, if the server produced it.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_becomes_the_message() {
        let err = ApiError::from_response(400, "Task title is required.");
        assert_eq!(err.to_string(), "Task title is required.");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn empty_body_falls_back_to_status_line() {
        let err = ApiError::from_response(404, "");
        assert_eq!(err.message(), "Error: 404 Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn whitespace_body_counts_as_empty() {
        let err = ApiError::from_response(500, "  \n");
        assert_eq!(err.message(), "Error: 500 Internal Server Error");
    }

    #[test]
    fn unknown_status_has_no_reason_phrase() {
        let err = ApiError::from_response(599, "");
        assert_eq!(err.message(), "Error: 599");
    }

    #[test]
    fn api_variant_displays_only_the_message() {
        let err = ClientError::from(ApiError::from_response(400, "bad title"));
        assert_eq!(err.to_string(), "bad title");
        assert_eq!(err.as_api().map(ApiError::status), Some(400));
    }
}
