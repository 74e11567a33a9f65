//! In-process owner of the session state.
//!
//! The [`Coordinator`] guards one [`WorkflowState`] behind a single lock.
//! Every mutation runs under the lock, then the resulting copy is written
//! to disk and the registered observer is notified, both outside the lock.
//! Writes from concurrent mutations are therefore not ordered on disk: a
//! slower write of an older snapshot can land after a newer one.

pub mod mailbox;
pub mod watchdog;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::models::question::MultiChoiceQuestion;
use crate::models::state::WorkflowState;
use crate::persistence::store;
use crate::Result;

use self::mailbox::AnswerMailbox;
use self::watchdog::Watchdog;

/// Callback invoked after every successful mutation.
pub type Observer = Arc<dyn Fn() + Send + Sync>;

/// How a failed write after a mutation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistErrorMode {
    /// Return the store's error to the caller.
    Surface,
    /// Log the error at `warn` and report success.
    LogAndContinue,
}

struct Inner {
    state: WorkflowState,
    observer: Option<Observer>,
}

/// Clears the pending human prompt when dropped, so a waiter that is
/// abandoned mid-wait still reverts the record.
struct PromptCleanup<'a> {
    coordinator: &'a Coordinator,
}

impl Drop for PromptCleanup<'_> {
    fn drop(&mut self) {
        self.coordinator
            .update_best_effort(WorkflowState::clear_human_prompt);
    }
}

/// Lock-protected owner of one session's state record.
pub struct Coordinator {
    path: PathBuf,
    inner: Mutex<Inner>,
    mailbox: AnswerMailbox,
    watchdog: Watchdog,
}

impl Coordinator {
    /// Load the state document at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file is missing or unreadable and
    /// `AppError::Decode` if it is malformed. Callers tolerating a first run
    /// fall back to [`Coordinator::new_empty`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = store::load(&path)?;
        info!(path = %path.display(), status = %state.status, "state restored");
        Ok(Self::from_parts(path, state))
    }

    /// Start from an empty record without touching disk.
    #[must_use]
    pub fn new_empty(path: impl Into<PathBuf>) -> Self {
        Self::from_parts(path.into(), WorkflowState::new())
    }

    /// Start from `state`, writing it to `path` immediately.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the initial write fails.
    pub fn with_state(path: impl Into<PathBuf>, state: WorkflowState) -> Result<Self> {
        let path = path.into();
        store::save(&path, &state)?;
        Ok(Self::from_parts(path, state))
    }

    /// Replace the soft-stop grace period. Has no effect once armed.
    #[must_use]
    pub fn with_soft_stop(mut self, interval: Duration) -> Self {
        if !self.watchdog.is_armed() {
            self.watchdog = Watchdog::new(interval);
        }
        self
    }

    fn from_parts(path: PathBuf, state: WorkflowState) -> Self {
        Self {
            path,
            inner: Mutex::new(Inner {
                state,
                observer: None,
            }),
            mailbox: AnswerMailbox::new(),
            watchdog: Watchdog::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Location of the persisted state document.
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.path
    }

    /// Deep copy of the current record.
    #[must_use]
    pub fn snapshot(&self) -> WorkflowState {
        self.lock().state.clone()
    }

    /// Install the callback run after every successful mutation.
    ///
    /// The callback runs outside the lock and may call back into the
    /// coordinator. It replaces any previous observer.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock().observer = Some(Arc::new(observer));
    }

    /// Apply `mutate` under the lock, persist the result, then notify.
    ///
    /// The mutation is not rolled back when the write fails, so memory and
    /// disk diverge until the next successful write. The observer only runs
    /// after a successful write.
    ///
    /// # Errors
    ///
    /// Returns the store's `AppError::Io` if the write fails.
    pub fn update<R, F>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut WorkflowState) -> R,
    {
        self.update_with_mode(PersistErrorMode::Surface, mutate)
    }

    /// [`update`](Self::update) with an explicit policy for write failures.
    ///
    /// # Errors
    ///
    /// Returns the store's `AppError::Io` if the write fails and `mode` is
    /// [`PersistErrorMode::Surface`].
    pub fn update_with_mode<R, F>(&self, mode: PersistErrorMode, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut WorkflowState) -> R,
    {
        match mode {
            PersistErrorMode::Surface => {
                let (output, written) = self.apply(mutate);
                written.map(|()| output)
            }
            PersistErrorMode::LogAndContinue => Ok(self.update_best_effort(mutate)),
        }
    }

    /// Apply `mutate` and persist, logging a failed write instead of
    /// returning it.
    fn update_best_effort<R, F>(&self, mutate: F) -> R
    where
        F: FnOnce(&mut WorkflowState) -> R,
    {
        let (output, written) = self.apply(mutate);
        if let Err(err) = written {
            warn!(%err, path = %self.path.display(), "state write failed; continuing");
        }
        output
    }

    fn apply<R, F>(&self, mutate: F) -> (R, Result<()>)
    where
        F: FnOnce(&mut WorkflowState) -> R,
    {
        let (output, snapshot, observer) = {
            let mut inner = self.lock();
            let output = mutate(&mut inner.state);
            (output, inner.state.clone(), inner.observer.clone())
        };

        let written = store::save(&self.path, &snapshot);
        if written.is_ok() {
            if let Some(observer) = observer {
                observer();
            }
        }
        (output, written)
    }

    /// Post a question for the human and block until it is answered.
    ///
    /// The record is marked `waiting-for-human` with `question` and
    /// `message` attached. Once an answer arrives or `cancel` fires, the
    /// prompt is cleared and a still-waiting status reverts to `working`.
    /// That cleanup runs on every path, including when the returned future
    /// is dropped before completing, and only logs if its write fails.
    ///
    /// Only one call should be outstanding at a time; concurrent callers
    /// share the mailbox and may receive each other's answers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if posting the question cannot be persisted,
    /// without waiting. Returns `AppError::Cancelled` if `cancel` fires
    /// before an answer arrives.
    pub async fn ask_and_wait(
        &self,
        cancel: &CancellationToken,
        question: Option<MultiChoiceQuestion>,
        message: impl Into<String>,
    ) -> Result<String> {
        let message = message.into();
        let span = info_span!(
            "ask_and_wait",
            has_question = question.is_some(),
            work_gate = question.as_ref().is_some_and(|q| q.work_gate),
        );

        async move {
            self.update(|state| state.await_human(question, message))?;
            let cleanup = PromptCleanup { coordinator: self };
            info!("waiting for human answer");

            let outcome = self.mailbox.receive(cancel).await;
            drop(cleanup);

            match &outcome {
                Ok(_) => info!("human answer received"),
                Err(err) => info!(%err, "wait ended without an answer"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Hand an answer to the waiting agent without blocking.
    ///
    /// If an earlier answer is still unconsumed, this one is discarded.
    pub fn respond(&self, answer: impl Into<String>) {
        if self.mailbox.deposit(answer.into()) {
            debug!("answer deposited");
        } else {
            info!("answer dropped; an unconsumed answer is already pending");
        }
    }

    /// Arm the soft-stop watchdog so `trigger` runs once after the grace
    /// period. Calls after the first successful arm do nothing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when called outside a tokio runtime.
    pub fn arm_watchdog<F>(&self, trigger: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.watchdog.arm(trigger).map(|_| ())
    }

    /// Whether the watchdog has been armed, regardless of whether it fired.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.watchdog.is_armed()
    }

    /// Disarm the watchdog if it is pending. Idempotent.
    pub fn stop(&self) {
        self.watchdog.stop();
    }
}
