//! Wire DTOs for the todo API.
//!
//! # Design
//! The server and every client speak these exact shapes, so both sides depend
//! on this module instead of redefining them. Field names are camelCased on
//! the wire (`id`, `title`, `isDone`).

use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned identifier of a todo item.
pub type TodoId = i64;

/// A single todo item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemDto {
    pub id: TodoId,
    pub title: String,
    pub is_done: bool,
}

/// Request payload for creating a todo. New items always start not done.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemCreateDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
}

/// Request payload for replacing the mutable fields of an existing todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemUpdateDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
}

impl TodoItemUpdateDto {
    /// Update that keeps the title and flips the done flag.
    pub fn toggled(item: &TodoItemDto) -> Self {
        Self {
            title: item.title.clone(),
            is_done: !item.is_done,
        }
    }
}

/// A missing or `null` title reads as empty so it fails title validation
/// rather than body decoding.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
