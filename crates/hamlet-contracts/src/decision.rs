//! The typed output of one agent's decision in one tick.
//!
//! `Decision` is a closed set: every path through the tick engine, whether
//! rule-based or model-assisted, ends in exactly one of these variants.
//! Text fields are truncated on construction, never rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// Longest spoken message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 80;

/// Longest activity description, in characters.
pub const MAX_ACTIVITY_CHARS: usize = 50;

/// The emotional tone attached to spoken text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
        };
        f.write_str(name)
    }
}

/// One action for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Wander {
        zone: String,
    },
    Approach {
        target: AgentId,
    },
    Speak {
        message: String,
        emotion: Emotion,
    },
    Activity {
        description: String,
        emoji: String,
        duration_ms: u64,
    },
    Idle,
}

impl Decision {
    pub fn wander(zone: impl Into<String>) -> Self {
        Decision::Wander { zone: zone.into() }
    }

    pub fn approach(target: AgentId) -> Self {
        Decision::Approach { target }
    }

    /// Build a `Speak`, truncating `message` to [`MAX_MESSAGE_CHARS`].
    pub fn speak(message: &str, emotion: Emotion) -> Self {
        Decision::Speak {
            message: truncate_chars(message, MAX_MESSAGE_CHARS),
            emotion,
        }
    }

    /// Build an `Activity`, truncating `description` to [`MAX_ACTIVITY_CHARS`].
    pub fn activity(description: &str, emoji: impl Into<String>, duration_ms: u64) -> Self {
        Decision::Activity {
            description: truncate_chars(description, MAX_ACTIVITY_CHARS),
            emoji: emoji.into(),
            duration_ms,
        }
    }

    /// Short discriminant used in logs and shared context keys.
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Wander { .. } => "wander",
            Decision::Approach { .. } => "approach",
            Decision::Speak { .. } => "speak",
            Decision::Activity { .. } => "activity",
            Decision::Idle => "idle",
        }
    }
}

/// Which path produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// An urgent coordinator message was relayed verbatim.
    Inbox,
    /// The language model's reply was parsed.
    Model,
    /// A rule-based branch chose without the model.
    Rule,
    /// Something failed and the cheapest safe default was used.
    Fallback,
}

/// A decision together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub agent_id: AgentId,
    pub decision: Decision,
    pub source: DecisionSource,
    /// Significant decisions bypass cooldowns and are broadcast.
    pub significant: bool,
}

/// Truncate `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
