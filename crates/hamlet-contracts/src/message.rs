//! Messages exchanged with the coordinator, the language model, and the
//! memory/relationship sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{agent::AgentId, decision::Emotion};

/// Inbox priority as reported by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl MessagePriority {
    /// High and urgent messages pre-empt every other decision rule.
    pub fn is_urgent(self) -> bool {
        matches!(self, MessagePriority::High | MessagePriority::Urgent)
    }
}

/// One message sitting in an agent's coordinator inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorMessage {
    pub from: AgentId,
    /// Discriminant, e.g. "chat", "alert", "task".
    pub kind: String,
    pub content: String,
    pub priority: MessagePriority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A text-completion request for the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub history: Vec<ChatMessage>,
    /// Optional tool definitions, passed through opaquely.
    pub tools: Option<Vec<serde_json::Value>>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// A record of one agent speaking to another, offered to memory and
/// relationship sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub speaker: AgentId,
    pub listener: AgentId,
    pub message: String,
    pub emotion: Emotion,
    pub significant: bool,
    pub at: DateTime<Utc>,
}
