//! Async API client used by the view model.

use async_trait::async_trait;
use tracing::debug;

use todo_core::{ClientError, TodoClient, TodoId, TodoItemDto, TodoItemUpdateDto};

use crate::transport::Transport;

/// The todo operations the view model needs. Every failure arrives as a
/// `ClientError`; server-side conditions are all `ClientError::Api`.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn get_all(&self) -> Result<Vec<TodoItemDto>, ClientError>;
    async fn get(&self, id: TodoId) -> Result<TodoItemDto, ClientError>;
    async fn create(&self, title: &str) -> Result<TodoItemDto, ClientError>;
    async fn update(&self, id: TodoId, input: &TodoItemUpdateDto) -> Result<(), ClientError>;
    async fn delete(&self, id: TodoId) -> Result<(), ClientError>;
}

/// `TodoApi` over a `TodoClient` and a transport.
#[derive(Debug, Clone)]
pub struct TodoApiService<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoApiService<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl<T: Transport> TodoApi for TodoApiService<T> {
    async fn get_all(&self) -> Result<Vec<TodoItemDto>, ClientError> {
        let response = self.transport.execute(self.client.build_list_todos()).await?;
        let items = self.client.parse_list_todos(response)?;
        debug!(count = items.len(), "fetched todo items");
        Ok(items)
    }

    async fn get(&self, id: TodoId) -> Result<TodoItemDto, ClientError> {
        let response = self.transport.execute(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    async fn create(&self, title: &str) -> Result<TodoItemDto, ClientError> {
        let request = self.client.build_create_todo(title)?;
        let response = self.transport.execute(request).await?;
        let item = self.client.parse_create_todo(response)?;
        debug!(id = item.id, "created todo item");
        Ok(item)
    }

    async fn update(&self, id: TodoId, input: &TodoItemUpdateDto) -> Result<(), ClientError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let response = self.transport.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}
