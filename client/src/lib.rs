//! Client side of the todo service.
//!
//! # Overview
//! - `transport`: executes `todo-core` requests (`reqwest` in production).
//! - `api`: the async `TodoApi` the view model talks to.
//! - `observable` / `command`: the binding primitives a front end uses.
//! - `view_model`: `MainViewModel`, the load/add/toggle/delete flows.

pub mod api;
pub mod command;
pub mod config;
pub mod observable;
pub mod transport;
pub mod view_model;

pub use api::{TodoApi, TodoApiService};
pub use command::AsyncCommand;
pub use config::ClientConfig;
pub use observable::{Event, Observable, ObservableList, Subscription};
pub use transport::{ReqwestTransport, Transport};
pub use view_model::MainViewModel;
