//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Outbound notification settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct NotificationConfig {
    /// Whether to raise a local desktop alert.
    #[serde(default)]
    pub desktop: bool,
    /// Remote webhook receiving a JSON `{title, message}` POST.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_soft_stop_seconds() -> u64 {
    60
}

/// Global configuration parsed from `steward.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Location of the persisted session state document.
    pub state_path: PathBuf,
    /// Grace period between the agent reporting done and forced shutdown.
    #[serde(default = "default_soft_stop_seconds")]
    pub soft_stop_seconds: u64,
    /// Notification delivery settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a bare state path with every other value defaulted.
    #[must_use]
    pub fn for_state_path(state_path: PathBuf) -> Self {
        Self {
            state_path,
            soft_stop_seconds: default_soft_stop_seconds(),
            notifications: NotificationConfig::default(),
        }
    }

    /// Soft-stop grace period as a [`Duration`].
    #[must_use]
    pub fn soft_stop(&self) -> Duration {
        Duration::from_secs(self.soft_stop_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.state_path.as_os_str().is_empty() {
            return Err(AppError::Config("state_path must not be empty".into()));
        }

        if self.soft_stop_seconds == 0 {
            return Err(AppError::Config(
                "soft_stop_seconds must be greater than zero".into(),
            ));
        }

        if let Some(url) = &self.notifications.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "webhook_url must be an http(s) URL: {url}"
                )));
            }
        }

        Ok(())
    }
}
