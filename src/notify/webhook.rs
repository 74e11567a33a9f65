//! Remote webhook push.

use std::time::Duration;

use tracing::debug;

use super::Notification;
use crate::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts notifications as JSON to a fixed URL.
pub struct WebhookClient {
    url: String,
    http: reqwest::Client,
}

impl WebhookClient {
    /// Construct a client for `url`.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
        }
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `{title, message}` to the webhook.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Notify` if the request fails or the server
    /// answers with a non-success status.
    pub async fn push(&self, notification: &Notification) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .json(notification)
            .send()
            .await
            .map_err(|err| AppError::Notify(format!("webhook request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Notify(format!("webhook returned {status}")));
        }
        debug!(%status, url = self.url(), "webhook delivered");
        Ok(())
    }
}
