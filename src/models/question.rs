//! Multi-choice questions posed to the human supervisor.

use serde::{Deserialize, Serialize};

/// One question with its selectable options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question text shown to the human.
    pub question: String,
    /// Choices offered for this question.
    #[serde(default)]
    pub options: Vec<String>,
    /// Whether more than one option may be selected.
    #[serde(default)]
    pub multi_select: bool,
}

/// A batch of questions awaiting a human answer.
///
/// When `work_gate` is set the batch asks for explicit approval before the
/// agent proceeds with its work.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceQuestion {
    /// Ordered questions.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Whether this batch gates further work on human approval.
    #[serde(default)]
    pub work_gate: bool,
}

impl MultiChoiceQuestion {
    /// Single-question batch.
    #[must_use]
    pub fn single(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            questions: vec![Question {
                question: question.into(),
                options,
                multi_select: false,
            }],
            work_gate: false,
        }
    }

    /// Approval gate with the given prompt and approve/reject choices.
    #[must_use]
    pub fn work_gate(question: impl Into<String>) -> Self {
        let mut gate = Self::single(question, vec!["Approve".into(), "Reject".into()]);
        gate.work_gate = true;
        gate
    }
}
