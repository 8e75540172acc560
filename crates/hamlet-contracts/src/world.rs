//! Read-only world state handed to the deciding logic.
//!
//! The world collaborator owns the real state; the runtime only ever sees a
//! point-in-time `WorldSnapshot` per agent and mutates the world through
//! explicit commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// A position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// What an agent is visibly busy with, and until when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentActivity {
    pub description: String,
    pub until: DateTime<Utc>,
}

/// One agent's view of the world at the moment it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub position: Position,
    pub zone: String,
    /// Nearby agents, closest first.
    pub nearby_agents: Vec<AgentId>,
    pub is_moving: bool,
    pub current_activity: Option<CurrentActivity>,
    pub last_conversation_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl WorldSnapshot {
    /// An idle, stationary snapshot in `zone` with nobody around.
    pub fn idle_in(zone: impl Into<String>) -> Self {
        Self {
            position: Position { x: 0.0, y: 0.0 },
            zone: zone.into(),
            nearby_agents: Vec::new(),
            is_moving: false,
            current_activity: None,
            last_conversation_at: None,
            last_activity_at: None,
        }
    }

    /// True while the agent's current activity has not yet ended.
    pub fn is_mid_activity(&self, now: DateTime<Utc>) -> bool {
        self.current_activity
            .as_ref()
            .is_some_and(|activity| activity.until > now)
    }
}

/// The activity update pushed to the world when an agent starts doing something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    pub description: String,
    pub emoji: String,
    pub until: DateTime<Utc>,
}
