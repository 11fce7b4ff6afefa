//! Executes `todo-core` requests over the network.
//!
//! # Design
//! `TodoClient` in the core only builds and parses plain-data requests. A
//! `Transport` performs the round-trip and is the single place where
//! connectivity failures and timeouts are told apart from server answers:
//! any response that arrives, whatever its status, is returned as data.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use todo_core::{ClientError, HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        (**self).execute(request).await
    }
}

/// `reqwest`-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(format!("failed building HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        debug!(method = %request.method, url = %request.path, "sending request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.http.request(method, &request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await.map_err(classify)?;

        debug!(status, "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

/// Map a `reqwest` failure onto the client taxonomy. Timeouts surface as
/// cancellation; everything that kept a response from arriving is a
/// connectivity failure.
fn classify(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Cancelled
    } else if err.is_decode() {
        ClientError::Deserialization(err.to_string())
    } else {
        ClientError::Connection(err.to_string())
    }
}
