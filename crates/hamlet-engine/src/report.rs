//! What one tick did, per agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hamlet_contracts::{agent::AgentId, decision::DecisionOutcome};

/// Why an agent received no decision this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A non-expired operation is in progress.
    Busy,
    MidActivity,
    Moving,
    /// The world does not know this agent yet.
    NoSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    /// True when the whole cycle was skipped for lack of connected clients.
    pub paused: bool,
    pub considered: usize,
    pub decided: Vec<DecisionOutcome>,
    pub skipped: Vec<(AgentId, SkipReason)>,
    pub failed: Vec<AgentId>,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            paused: false,
            considered: 0,
            decided: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn outcome_for(&self, agent: &AgentId) -> Option<&DecisionOutcome> {
        self.decided.iter().find(|o| &o.agent_id == agent)
    }

    pub fn skip_reason(&self, agent: &AgentId) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|(id, _)| id == agent)
            .map(|(_, reason)| *reason)
    }
}
