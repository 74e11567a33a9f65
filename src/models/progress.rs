//! Append-only progress log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single durable progress note recorded by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Agent that recorded the entry.
    pub agent: String,
    /// Human-readable description of what was done.
    pub description: String,
}

impl ProgressEntry {
    /// Construct an entry stamped with the current time.
    #[must_use]
    pub fn new(agent: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            description: description.into(),
        }
    }
}
