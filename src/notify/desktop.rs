//! Local desktop alerts via the platform's notification command.

use tokio::process::Command;
use tracing::debug;

use super::Notification;
use crate::{AppError, Result};

/// Raise a desktop alert for `notification`.
///
/// # Errors
///
/// Returns `AppError::Notify` if the platform command cannot be started or
/// exits unsuccessfully, or if the platform has no supported command.
pub async fn alert(notification: &Notification) -> Result<()> {
    let mut command = platform_command(notification)?;
    let status = command
        .status()
        .await
        .map_err(|err| AppError::Notify(format!("failed to run alert command: {err}")))?;
    if status.success() {
        debug!("desktop alert shown");
        Ok(())
    } else {
        Err(AppError::Notify(format!("alert command exited with {status}")))
    }
}

#[cfg(target_os = "macos")]
fn platform_command(notification: &Notification) -> Result<Command> {
    let script = format!(
        "display notification {} with title {}",
        applescript_quote(&notification.message),
        applescript_quote(&notification.title),
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(script);
    Ok(command)
}

#[cfg(all(unix, not(target_os = "macos")))]
#[allow(clippy::unnecessary_wraps)] // Signature shared with other platforms.
fn platform_command(notification: &Notification) -> Result<Command> {
    let mut command = Command::new("notify-send");
    command.arg("--").arg(&notification.title).arg(&notification.message);
    Ok(command)
}

#[cfg(not(unix))]
fn platform_command(_notification: &Notification) -> Result<Command> {
    Err(AppError::Notify(
        "desktop alerts are not supported on this platform".into(),
    ))
}

#[cfg(any(target_os = "macos", test))]
fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
