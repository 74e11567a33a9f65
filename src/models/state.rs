//! Session state record and the pure predicates and helpers over it.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::agent::{AgentRun, ModelStatus};
use super::cost::{CostSummary, TokenUsage};
use super::message::AgentMessage;
use super::null_as_default;
use super::progress::ProgressEntry;
use super::question::MultiChoiceQuestion;
use super::todo::TodoItem;

/// Lifecycle status of the session.
///
/// Unknown strings are carried verbatim in [`WorkflowStatus::Other`]; the
/// coordinator never restricts the value it is handed. Callers that accept
/// statuses from agents validate with [`WorkflowStatus::is_agent_settable`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    /// Agent is actively working.
    #[default]
    Working,
    /// Agent reported its part done; the session is winding down.
    AgentDone,
    /// The whole session is complete.
    Complete,
    /// Agent is blocked on a human answer.
    WaitingForHuman,
    /// Any other value, preserved as given.
    Other(String),
}

impl WorkflowStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Working => "working",
            Self::AgentDone => "agent-done",
            Self::Complete => "complete",
            Self::WaitingForHuman => "waiting-for-human",
            Self::Other(raw) => raw,
        }
    }

    /// Whether an agent may set this status directly.
    #[must_use]
    pub fn is_agent_settable(&self) -> bool {
        matches!(self, Self::Working | Self::AgentDone | Self::Complete)
    }
}

impl From<String> for WorkflowStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "working" => Self::Working,
            "agent-done" => Self::AgentDone,
            "complete" => Self::Complete,
            "waiting-for-human" => Self::WaitingForHuman,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for WorkflowStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        match status {
            WorkflowStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for WorkflowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the human and agent are collaborating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum InteractionMode {
    /// Agent drives itself with no human in the loop.
    SelfDrive,
    /// Open-ended ideation with the human.
    Brainstorming,
    /// Agent is implementing.
    Building,
    /// Reviewing finished work with the human.
    Retrospective,
    /// Agent keeps going across tasks.
    Continuous,
    /// Any other value, preserved as given.
    Other(String),
}

impl InteractionMode {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SelfDrive => "self-drive",
            Self::Brainstorming => "brainstorming",
            Self::Building => "building",
            Self::Retrospective => "retrospective",
            Self::Continuous => "continuous",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for InteractionMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "self-drive" => Self::SelfDrive,
            "brainstorming" => Self::Brainstorming,
            "building" => Self::Building,
            "retrospective" => Self::Retrospective,
            "continuous" => Self::Continuous,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for InteractionMode {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<InteractionMode> for String {
    fn from(mode: InteractionMode) -> Self {
        match mode {
            InteractionMode::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for InteractionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip predicates take a reference.
fn is_false(value: &bool) -> bool {
    !*value
}

/// The full state of one supervised session, persisted as a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Current lifecycle status.
    #[serde(default)]
    pub status: WorkflowStatus,
    /// Current objective.
    #[serde(default)]
    pub task: String,
    /// Append-only progress log.
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    /// Free-text prompt for the human; empty unless waiting for one.
    #[serde(default)]
    pub human_message: String,
    /// Structured questions for the human; absent unless waiting for one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_choice_question: Option<MultiChoiceQuestion>,
    /// Inter-agent mailbox.
    #[serde(default)]
    pub messages: Vec<AgentMessage>,
    /// How many times each agent has become current.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub visit_counts: BTreeMap<String, u32>,
    /// Status of each model under the current agent; cleared on transition.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub model_statuses: BTreeMap<String, ModelStatus>,
    /// Name of the running agent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_agent: String,
    /// Model used by the running agent.
    #[serde(default)]
    pub current_model: String,
    /// Ordered log of agents that have run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_sequence: Vec<AgentRun>,
    /// Aggregated cost accounting.
    #[serde(default)]
    pub cost: CostSummary,
    /// Session-scoped todo list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<TodoItem>,
    /// Project-scoped todo list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_todos: Vec<TodoItem>,
    /// Identifier of the host session, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Collaboration mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_mode: Option<InteractionMode>,
    /// One-line synopsis of the session.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Set once a human edits the summary; blocks regeneration.
    #[serde(default, skip_serializing_if = "is_false")]
    pub summary_manual: bool,
}

impl WorkflowState {
    /// Empty record with `status = working`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a human has something to answer right now.
    ///
    /// A `waiting-for-human` status with neither a message nor a question
    /// is not actionable.
    #[must_use]
    pub fn needs_human_input(&self) -> bool {
        self.status == WorkflowStatus::WaitingForHuman
            && (self.multi_choice_question.is_some() || !self.human_message.is_empty())
    }

    /// Whether interactive tools are permitted in the current mode.
    #[must_use]
    pub fn tools_allowed(&self) -> bool {
        matches!(
            self.interaction_mode,
            Some(InteractionMode::Brainstorming | InteractionMode::Retrospective)
        )
    }

    /// Attach a pending prompt and mark the session as waiting on a human.
    pub fn await_human(&mut self, question: Option<MultiChoiceQuestion>, message: String) {
        self.multi_choice_question = question;
        self.human_message = message;
        self.status = WorkflowStatus::WaitingForHuman;
    }

    /// Drop any pending prompt, reverting a waiting status to `working`.
    pub fn clear_human_prompt(&mut self) {
        self.multi_choice_question = None;
        self.human_message.clear();
        if self.status == WorkflowStatus::WaitingForHuman {
            self.status = WorkflowStatus::Working;
        }
    }

    /// Append a timestamped progress note.
    pub fn append_progress(&mut self, agent: impl Into<String>, description: impl Into<String>) {
        self.progress.push(ProgressEntry::new(agent, description));
    }

    /// Make `agent` the running agent.
    ///
    /// Every earlier sequence entry loses its current flag, so at most one
    /// entry is current afterwards. Model statuses belong to the previous
    /// agent and are cleared.
    pub fn begin_agent(&mut self, agent: impl Into<String>, model: impl Into<String>) {
        let agent = agent.into();
        for run in &mut self.agent_sequence {
            run.is_current = false;
        }
        self.agent_sequence.push(AgentRun {
            agent: agent.clone(),
            start_time: Utc::now(),
            is_current: true,
        });
        *self.visit_counts.entry(agent.clone()).or_insert(0) += 1;
        self.model_statuses.clear();
        self.current_model = model.into();
        self.current_agent = agent;
    }

    /// The sequence entry flagged current, if any.
    #[must_use]
    pub fn current_run(&self) -> Option<&AgentRun> {
        self.agent_sequence.iter().find(|run| run.is_current)
    }

    /// Record the status of one model under the current agent.
    pub fn set_model_status(&mut self, model: impl Into<String>, status: ModelStatus) {
        self.model_statuses.insert(model.into(), status);
    }

    /// Leave a message for another agent, returning its identifier.
    pub fn post_message(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        body: impl Into<String>,
    ) -> String {
        let message = AgentMessage::new(from, to, body);
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// Mark the message with `id` as read by `reader`.
    ///
    /// Returns `false` when no message has that identifier.
    pub fn mark_read(&mut self, id: &str, reader: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|msg| msg.id == id) {
            Some(msg) => {
                msg.mark_read(reader);
                true
            }
            None => false,
        }
    }

    /// Unread messages addressed to `agent`, oldest first.
    #[must_use]
    pub fn unread_for(&self, agent: &str) -> Vec<&AgentMessage> {
        self.messages
            .iter()
            .filter(|msg| !msg.read && msg.to == agent)
            .collect()
    }

    /// Record the cost of one step taken by `agent`.
    pub fn record_step_cost(
        &mut self,
        agent: impl Into<String>,
        step: impl Into<String>,
        cost: f64,
        tokens: TokenUsage,
    ) {
        self.cost.record_step(agent, step, cost, tokens);
    }

    /// Replace the generated summary unless a human has edited it.
    ///
    /// Returns whether the summary changed.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> bool {
        if self.summary_manual {
            return false;
        }
        self.summary = summary.into();
        true
    }

    /// Store a hand-written summary and stop further regeneration.
    pub fn set_manual_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
        self.summary_manual = true;
    }
}
