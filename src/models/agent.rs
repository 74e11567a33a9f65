//! Agent sequence and per-model status types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status reported for one model working under the current agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// Model is still producing output.
    Working,
    /// Model finished its turn.
    Done,
    /// Model failed.
    Error,
}

/// One entry in the ordered log of agents that have run this session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentRun {
    /// Agent name.
    pub agent: String,
    /// When the agent became current.
    pub start_time: DateTime<Utc>,
    /// Whether this is the running agent. At most one entry is current.
    #[serde(default)]
    pub is_current: bool,
}
