//! Single-slot answer mailbox for the ask/answer rendezvous.
//!
//! A capacity-one channel: depositing never blocks and an answer that
//! arrives while another is still unconsumed is dropped, not queued.

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{AppError, Result};

/// One-slot hand-off between a human responder and a waiting agent.
pub struct AnswerMailbox {
    tx: mpsc::Sender<String>,
    rx: Mutex<mpsc::Receiver<String>>,
}

impl AnswerMailbox {
    /// Construct an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Deposit an answer without blocking.
    ///
    /// Returns `false` when the slot already holds an unconsumed answer, in
    /// which case `answer` is discarded.
    pub fn deposit(&self, answer: String) -> bool {
        match self.tx.try_send(answer) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                debug!(len = dropped.len(), "mailbox full; answer discarded");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("mailbox closed; answer discarded");
                false
            }
        }
    }

    /// Wait for the next answer or for `cancel` to fire, whichever is first.
    ///
    /// Cancellation takes priority and never consumes a pending answer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if `cancel` fires first.
    pub async fn receive(&self, cancel: &CancellationToken) -> Result<String> {
        tokio::select! {
            biased;

            () = cancel.cancelled() => Err(AppError::Cancelled(
                "wait cancelled before an answer arrived".into(),
            )),

            answer = async { self.rx.lock().await.recv().await } => {
                answer.ok_or_else(|| AppError::Cancelled("answer mailbox closed".into()))
            }
        }
    }
}

impl Default for AnswerMailbox {
    fn default() -> Self {
        Self::new()
    }
}
