//! Todo items tracked for the session and the wider project.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a single todo item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not yet started.
    #[default]
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Finished.
    Completed,
}

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique item identifier.
    pub id: String,
    /// Human-readable description.
    pub content: String,
    /// Current status.
    #[serde(default)]
    pub status: TodoStatus,
}

impl TodoItem {
    /// Construct a pending item with a generated identifier.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            status: TodoStatus::Pending,
        }
    }
}
