//! HTTP API for the todo list, backed by SQLite.
//!
//! Handlers are stateless: each one validates its input, performs a single
//! store operation, and maps the outcome to a status code. Extractor
//! rejections go through `ServiceError` too: an undecodable body is a 400 and
//! a non-integer id a 404.

pub mod cli;
pub mod error;
pub mod store;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::{debug, info};

use todo_core::{normalize_title, TodoId, TodoItemCreateDto, TodoItemDto, TodoItemUpdateDto, TODOS_PATH};

pub use error::ServiceError;
pub use store::{StoreError, TodoItem, TodoStore};

pub fn app(store: TodoStore) -> Router {
    Router::new()
        .route(TODOS_PATH, get(list_todos).post(create_todo))
        .route(
            &format!("{TODOS_PATH}/{{id}}"),
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(store)
}

pub async fn run(listener: TcpListener, store: TodoStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

async fn list_todos(State(store): State<TodoStore>) -> Result<Json<Vec<TodoItemDto>>, ServiceError> {
    let items = store.list().await?;
    Ok(Json(items.into_iter().map(TodoItemDto::from).collect()))
}

async fn get_todo(
    State(store): State<TodoStore>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<TodoItemDto>, ServiceError> {
    let Path(id) = id?;
    let item = store.get(id).await?.ok_or(ServiceError::NotFound(id))?;
    Ok(Json(item.into()))
}

async fn create_todo(
    State(store): State<TodoStore>,
    input: Result<Json<TodoItemCreateDto>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(input) = input?;
    let title = normalize_title(&input.title).inspect_err(|err| debug!(%err, "rejected create"))?;
    let item = store.insert(title).await?;
    info!(id = item.id, "created todo item");
    let location = format!("{TODOS_PATH}/{}", item.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoItemDto::from(item)),
    ))
}

async fn update_todo(
    State(store): State<TodoStore>,
    id: Result<Path<TodoId>, PathRejection>,
    input: Result<Json<TodoItemUpdateDto>, JsonRejection>,
) -> Result<StatusCode, ServiceError> {
    let Path(id) = id?;
    let Json(input) = input?;
    let title = normalize_title(&input.title).inspect_err(|err| debug!(id, %err, "rejected update"))?;
    if !store.update(id, title, input.is_done).await? {
        return Err(ServiceError::NotFound(id));
    }
    info!(id, is_done = input.is_done, "updated todo item");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_todo(
    State(store): State<TodoStore>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<StatusCode, ServiceError> {
    let Path(id) = id?;
    if !store.delete(id).await? {
        return Err(ServiceError::NotFound(id));
    }
    info!(id, "deleted todo item");
    Ok(StatusCode::NO_CONTENT)
}
