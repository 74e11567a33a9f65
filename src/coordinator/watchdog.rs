//! One-shot soft-stop watchdog.
//!
//! Once an agent reports itself done it has a fixed grace period to exit.
//! The [`Watchdog`] bounds that period: after the first successful
//! [`arm`](Watchdog::arm) it invokes the supplied trigger exactly once when
//! the interval elapses, unless [`stop`](Watchdog::stop) runs first. Later
//! calls to `arm` are no-ops, however many callers race on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{AppError, Result};

/// Default grace period between "done" and forced shutdown.
pub const SOFT_STOP_INTERVAL: Duration = Duration::from_secs(60);

/// Idempotently armed one-shot timer.
pub struct Watchdog {
    interval: Duration,
    armed: AtomicBool,
    timer: Mutex<Option<CancellationToken>>,
}

impl Watchdog {
    /// Construct an unarmed watchdog firing `interval` after arming.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: AtomicBool::new(false),
            timer: Mutex::new(None),
        }
    }

    /// Configured grace period.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer so `trigger` runs once after the interval.
    ///
    /// Returns `true` for the call that armed the timer and `false` for
    /// every later call, whose trigger is dropped unused.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when called outside a tokio runtime. The
    /// watchdog stays unarmed in that case.
    pub fn arm<F>(&self, trigger: F) -> Result<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|err| {
            AppError::Config(format!("watchdog requires a tokio runtime: {err}"))
        })?;

        let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if self
            .armed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("watchdog already armed");
            return Ok(false);
        }

        let cancel = CancellationToken::new();
        let stopped = cancel.clone();
        let interval = self.interval;
        runtime.spawn(
            async move {
                tokio::select! {
                    () = stopped.cancelled() => {
                        debug!("watchdog stopped before firing");
                    }
                    () = tokio::time::sleep(interval) => {
                        warn!(
                            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
                            "soft-stop interval elapsed; triggering shutdown"
                        );
                        trigger();
                    }
                }
            }
            .instrument(info_span!("watchdog")),
        );
        *slot = Some(cancel);

        info!(
            interval_secs = interval.as_secs(),
            "soft-stop watchdog armed"
        );
        Ok(true)
    }

    /// Whether the watchdog has ever been armed, fired or not.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Disarm the timer if one is pending. Safe to call at any time.
    pub fn stop(&self) {
        let slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cancel) = slot.as_ref() {
            cancel.cancel();
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(SOFT_STOP_INTERVAL)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
