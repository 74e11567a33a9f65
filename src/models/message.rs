//! Inter-agent mailbox message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A note left by one agent for another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    /// Unique message identifier (UUID v4 prefixed `msg:`).
    pub id: String,
    /// Sending agent.
    pub from: String,
    /// Recipient agent.
    pub to: String,
    /// Message text.
    pub body: String,
    /// Whether the recipient has read the message.
    #[serde(default)]
    pub read: bool,
    /// When the message was read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Agent that marked the message read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_by: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AgentMessage {
    /// Construct an unread message with a generated identifier.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: format!("msg:{}", Uuid::new_v4()),
            from: from.into(),
            to: to.into(),
            body: body.into(),
            read: false,
            read_at: None,
            read_by: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Flag the message as read by `reader`.
    pub fn mark_read(&mut self, reader: impl Into<String>) {
        self.read = true;
        self.read_at = Some(Utc::now());
        self.read_by = Some(reader.into());
    }
}
