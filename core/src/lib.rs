//! Shared core of the todo service: wire DTOs, title rules, and a
//! synchronous request builder / response parser.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The server uses the DTOs and
//! title rules; clients pair `TodoClient` with whatever transport they have.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - All non-success responses collapse into one `ApiError`; transport
//!   failures get their own `ClientError` variants.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod validation;

pub use client::{TodoClient, TODOS_PATH};
pub use error::{ApiError, ClientError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{TodoId, TodoItemCreateDto, TodoItemDto, TodoItemUpdateDto};
pub use validation::{normalize_title, TitleError, MAX_TITLE_LEN};
