//! Agent identity, character profiles, and per-agent runtime state.

use std::{collections::VecDeque, fmt};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::message::CoordinatorMessage;

/// Stable identifier for an agent living in the world.
///
/// Used as the key for runtime state, world-sync calls, coordinator inboxes,
/// and scheduled task ownership. Example: `AgentId("finn".into())`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A character-specific activity that is tried before the global pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialActivity {
    pub description: String,
    pub emoji: String,
    /// Independent probability in `[0, 1]` that this activity triggers.
    pub chance: f64,
    pub duration_ms: u64,
}

/// The personality bound to an agent: who it is and how it tends to behave.
///
/// The two `*_chance` fields are the behavioral weights the tick engine rolls
/// against when choosing between socializing and doing something alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    /// Zone the agent gravitates back to when wandering elsewhere.
    pub preferred_zone: String,
    #[serde(default = "default_interaction_chance")]
    pub interaction_chance: f64,
    #[serde(default = "default_activity_chance")]
    pub activity_chance: f64,
    #[serde(default)]
    pub special_activities: Vec<SpecialActivity>,
}

fn default_interaction_chance() -> f64 {
    0.3
}

fn default_activity_chance() -> f64 {
    0.2
}

/// A long-running action an agent is currently committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InProgressOperation {
    pub name: String,
    pub started_at: DateTime<Utc>,
}

impl InProgressOperation {
    /// True once the operation has been running longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.started_at > timeout
    }
}

/// Derived, in-process state the tick engine keeps for each registered agent.
///
/// Never persisted: it is rebuilt from registration on every process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRuntimeState {
    pub agent_id: AgentId,
    pub character: CharacterProfile,
    pub last_decision_time: Option<DateTime<Utc>>,
    pub in_progress: Option<InProgressOperation>,
    /// Inbox messages read from the coordinator but not yet acted on,
    /// oldest first.
    #[serde(default)]
    pub pending_messages: VecDeque<CoordinatorMessage>,
}

impl AgentRuntimeState {
    pub fn new(agent_id: AgentId, character: CharacterProfile) -> Self {
        Self {
            agent_id,
            character,
            last_decision_time: None,
            in_progress: None,
            pending_messages: VecDeque::new(),
        }
    }
}
