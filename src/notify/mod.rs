//! Outbound notifications on state transitions of interest.
//!
//! The coordinator never notifies on its own. The surrounding layer compares
//! snapshots with [`describe_transition`] and hands the result to a
//! [`NotificationDispatcher`], which tries a desktop alert and a webhook
//! push independently. Delivery failures are logged and swallowed.

pub mod desktop;
pub mod webhook;

use serde::Serialize;
use tracing::{info_span, warn, Instrument};

use crate::config::NotificationConfig;
use crate::models::state::{WorkflowState, WorkflowStatus};

/// Title and body of a single notification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// Notification body.
    pub message: String,
}

impl Notification {
    /// Construct a notification.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Describe the change from `before` to `after`, if a human should hear
/// about it.
#[must_use]
pub fn describe_transition(before: &WorkflowState, after: &WorkflowState) -> Option<Notification> {
    if after.needs_human_input() && !before.needs_human_input() {
        let body = if after.human_message.is_empty() {
            "The agent has a question waiting for you.".to_owned()
        } else {
            after.human_message.clone()
        };
        return Some(Notification::new("Input needed", body));
    }

    if before.status == after.status {
        return None;
    }

    match after.status {
        WorkflowStatus::AgentDone => Some(Notification::new(
            "Agent finished",
            format!("{} reported its work done.", agent_label(after)),
        )),
        WorkflowStatus::Complete => Some(Notification::new(
            "Session complete",
            if after.task.is_empty() {
                "The session has completed.".to_owned()
            } else {
                format!("Completed: {}", after.task)
            },
        )),
        _ => None,
    }
}

fn agent_label(state: &WorkflowState) -> &str {
    if state.current_agent.is_empty() {
        "The agent"
    } else {
        &state.current_agent
    }
}

/// Delivers notifications to every configured channel.
pub struct NotificationDispatcher {
    desktop: bool,
    webhook: Option<webhook::WebhookClient>,
}

impl NotificationDispatcher {
    /// Build a dispatcher from configuration.
    #[must_use]
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            desktop: config.desktop,
            webhook: config
                .webhook_url
                .as_ref()
                .map(|url| webhook::WebhookClient::new(url.clone())),
        }
    }

    /// Whether any delivery channel is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.desktop || self.webhook.is_some()
    }

    /// Send `notification` to every channel. Never fails.
    pub async fn dispatch(&self, notification: &Notification) {
        let span = info_span!("notify", title = %notification.title);
        async {
            if self.desktop {
                if let Err(err) = desktop::alert(notification).await {
                    warn!(%err, "desktop alert failed");
                }
            }
            if let Some(webhook) = &self.webhook {
                if let Err(err) = webhook.push(notification).await {
                    warn!(%err, "webhook push failed");
                }
            }
        }
        .instrument(span)
        .await;
    }
}
