//! Cost and token accounting aggregated across agents and steps.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token counts by category. Every field is independently additive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt tokens.
    #[serde(default)]
    pub input: u64,
    /// Completion tokens.
    #[serde(default)]
    pub output: u64,
    /// Reasoning tokens.
    #[serde(default)]
    pub reasoning: u64,
    /// Tokens served from the prompt cache.
    #[serde(default)]
    pub cache_read: u64,
    /// Tokens written to the prompt cache.
    #[serde(default)]
    pub cache_write: u64,
}

impl TokenUsage {
    /// Fold `other` into `self`, field by field.
    pub fn accumulate(&mut self, other: &Self) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
        self.reasoning = self.reasoning.saturating_add(other.reasoning);
        self.cache_read = self.cache_read.saturating_add(other.cache_read);
        self.cache_write = self.cache_write.saturating_add(other.cache_write);
    }

    /// Sum of every category.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.reasoning)
            .saturating_add(self.cache_read)
            .saturating_add(self.cache_write)
    }
}

impl Add for TokenUsage {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.accumulate(&rhs);
        self
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.accumulate(&rhs);
    }
}

/// Cost of a single step taken by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepCost {
    /// Step label.
    pub step: String,
    /// Cost in US dollars.
    pub cost: f64,
    /// Tokens consumed by the step.
    #[serde(default)]
    pub tokens: TokenUsage,
    /// When the step was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Per-agent cost breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCost {
    /// Total cost across the agent's steps.
    #[serde(default)]
    pub total_cost: f64,
    /// Total tokens across the agent's steps.
    #[serde(default)]
    pub tokens: TokenUsage,
    /// Individual steps in recording order.
    #[serde(default)]
    pub steps: Vec<StepCost>,
}

/// Session-wide cost accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    /// Total cost across all agents.
    #[serde(default)]
    pub total_cost: f64,
    /// Total tokens across all agents.
    #[serde(default)]
    pub tokens: TokenUsage,
    /// Breakdown keyed by agent name.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentCost>,
}

impl CostSummary {
    /// Record one step for `agent`, rolling it into the agent and global
    /// totals.
    pub fn record_step(
        &mut self,
        agent: impl Into<String>,
        step: impl Into<String>,
        cost: f64,
        tokens: TokenUsage,
    ) {
        let entry = self.agents.entry(agent.into()).or_default();
        entry.total_cost += cost;
        entry.tokens += tokens;
        entry.steps.push(StepCost {
            step: step.into(),
            cost,
            tokens,
            timestamp: Utc::now(),
        });

        self.total_cost += cost;
        self.tokens += tokens;
    }
}
