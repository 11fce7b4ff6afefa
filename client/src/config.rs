//! Where the client finds the API and how long it waits for it.

use std::sync::Arc;
use std::time::Duration;

use todo_core::ClientError;

use crate::api::{TodoApi, TodoApiService};
use crate::transport::ReqwestTransport;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout; expiry surfaces as a cancelled request.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn connect(&self) -> Result<Arc<dyn TodoApi>, ClientError> {
        let transport = ReqwestTransport::new(self.timeout)?;
        Ok(Arc::new(TodoApiService::new(&self.base_url, transport)))
    }
}
