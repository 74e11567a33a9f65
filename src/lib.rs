#![forbid(unsafe_code)]

//! State coordination for a single human-supervised agent session.
//!
//! The [`Coordinator`] owns the session's [`WorkflowState`], persists it to
//! a JSON document after every mutation, blocks agents on human answers,
//! and arms a soft-stop watchdog once the agent reports itself done.

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod models;
pub mod notify;
pub mod persistence;

pub use config::GlobalConfig;
pub use coordinator::Coordinator;
pub use errors::{AppError, Result};
pub use models::state::WorkflowState;
