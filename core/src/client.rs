//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ClientError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{TodoId, TodoItemCreateDto, TodoItemDto, TodoItemUpdateDto};

/// Resource path of the todo collection, relative to the base URL.
pub const TODOS_PATH: &str = "/api/todos";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.request(HttpMethod::Get, self.collection_url())
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        self.request(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_create_todo(&self, title: &str) -> Result<HttpRequest, ClientError> {
        let input = TodoItemCreateDto {
            title: title.to_string(),
        };
        self.json_request(HttpMethod::Post, self.collection_url(), &input)
    }

    pub fn build_update_todo(
        &self,
        id: TodoId,
        input: &TodoItemUpdateDto,
    ) -> Result<HttpRequest, ClientError> {
        self.json_request(HttpMethod::Put, self.item_url(id), input)
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        self.request(HttpMethod::Delete, self.item_url(id))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItemDto>, ClientError> {
        ensure_success(&response)?;
        // An empty 2xx body is an empty list rather than a decode failure.
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<TodoItemDto, ClientError> {
        ensure_success(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoItemDto, ClientError> {
        ensure_success(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<(), ClientError> {
        ensure_success(&response)?;
        Ok(())
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ClientError> {
        ensure_success(&response)?;
        Ok(())
    }

    fn collection_url(&self) -> String {
        format!("{}{TODOS_PATH}", self.base_url)
    }

    fn item_url(&self, id: TodoId) -> String {
        format!("{}{TODOS_PATH}/{id}", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ClientError> {
        let body =
            serde_json::to_string(input).map_err(|e| ClientError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Collapse any non-2xx response into the uniform `ApiError`.
fn ensure_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_response(response.status, &response.body))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_todo_uses_item_path() {
        let req = client().build_get_todo(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/todos/42");
    }

    #[test]
    fn build_create_todo_sends_only_the_title() {
        let req = client().build_create_todo("Buy milk").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "Buy milk" }));
    }

    #[test]
    fn build_update_todo_sends_full_replacement() {
        let input = TodoItemUpdateDto {
            title: "Walk dog".to_string(),
            is_done: true,
        };
        let req = client().build_update_todo(5, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/todos/5");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "Walk dog", "isDone": true }));
    }

    #[test]
    fn build_delete_todo_has_no_body() {
        let req = client().build_delete_todo(9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/todos/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_success() {
        let todos = client()
            .parse_list_todos(response(200, r#"[{"id":1,"title":"Test","isDone":false}]"#))
            .unwrap();
        assert_eq!(
            todos,
            vec![TodoItemDto {
                id: 1,
                title: "Test".to_string(),
                is_done: false,
            }]
        );
    }

    #[test]
    fn parse_list_todos_empty_body_is_empty_list() {
        assert!(client().parse_list_todos(response(200, "")).unwrap().is_empty());
    }

    #[test]
    fn parse_get_todo_not_found_synthesizes_message() {
        let err = client().parse_get_todo(response(404, "")).unwrap_err();
        let api = err.as_api().expect("api error");
        assert!(api.is_not_found());
        assert_eq!(api.message(), "Error: 404 Not Found");
    }

    #[test]
    fn parse_create_todo_bad_request_keeps_body_text() {
        let err = client()
            .parse_create_todo(response(400, "Task title is required."))
            .unwrap_err();
        assert_eq!(err.to_string(), "Task title is required.");
    }

    #[test]
    fn parse_create_todo_success() {
        let todo = client()
            .parse_create_todo(response(201, r#"{"id":4,"title":"New","isDone":false}"#))
            .unwrap();
        assert_eq!(todo.id, 4);
        assert_eq!(todo.title, "New");
    }

    #[test]
    fn parse_update_todo_accepts_no_content() {
        assert!(client().parse_update_todo(response(204, "")).is_ok());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client().parse_delete_todo(response(404, "")).unwrap_err();
        assert!(matches!(err, ClientError::Api(ref api) if api.status() == 404));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/api/todos");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ClientError::Deserialization(_)));
    }
}
