//! Collaborator trait definitions for the hamlet runtime.
//!
//! These traits define everything the decision-and-scheduling engine talks to:
//!
//! - `WorldSync`: owner of world state; the only way to change it
//! - `LanguageModel`: opaque, slow, fallible text completion
//! - `Coordinator`: agent inboxes, shared context, broadcast, alerts
//! - `InteractionSink`: best-effort memory / relationship recorders
//!
//! Implementations live outside the core. Every call site in the engine and
//! the task runner treats an `Err` from these traits as "degrade and move on".

use async_trait::async_trait;

use hamlet_contracts::{
    agent::AgentId,
    decision::Emotion,
    error::HamletResult,
    message::{CoordinatorMessage, GenerateRequest, GenerateResponse, InteractionRecord},
    world::{ActivityUpdate, Position, WorldSnapshot},
};

/// The world-state persistence and broadcast layer.
///
/// The runtime never mutates world state directly: it reads one
/// `WorldSnapshot` per agent per tick and issues the commands below.
#[async_trait]
pub trait WorldSync: Send + Sync {
    /// Read a point-in-time copy of one agent's surroundings.
    ///
    /// `Ok(None)` means the world does not (yet) know this agent.
    async fn get_agent_state(&self, agent: &AgentId) -> HamletResult<Option<WorldSnapshot>>;

    /// Announce a newly registered agent and the zone it prefers.
    async fn register_agent(&self, agent: &AgentId, preferred_zone: &str) -> HamletResult<()>;

    async fn send_move(&self, agent: &AgentId, x: f64, y: f64) -> HamletResult<()>;

    async fn send_approach(&self, agent: &AgentId, target: &AgentId) -> HamletResult<()>;

    async fn send_speak(
        &self,
        agent: &AgentId,
        message: &str,
        emotion: Emotion,
    ) -> HamletResult<()>;

    async fn update_agent_activity(
        &self,
        agent: &AgentId,
        update: ActivityUpdate,
    ) -> HamletResult<()>;

    /// Pick a walkable destination inside `zone`.
    async fn get_wander_destination(&self, zone: &str) -> HamletResult<Position>;

    /// Start the conversation cooldown for `agent`.
    async fn record_conversation_end(&self, agent: &AgentId) -> HamletResult<()>;

    /// Number of clients currently watching the world.
    async fn get_client_count(&self) -> HamletResult<usize>;
}

/// The natural-language generation model, consumed as an opaque capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> HamletResult<GenerateResponse>;

    /// False when the model is known to be unreachable or unconfigured.
    fn is_available(&self) -> bool {
        true
    }
}

/// Cross-agent coordination: inboxes, shared context, and broadcast.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Read up to `limit` pending messages for `agent`, oldest first.
    async fn get_messages(
        &self,
        agent: &AgentId,
        limit: usize,
    ) -> HamletResult<Vec<CoordinatorMessage>>;

    async fn set_shared_context(&self, key: &str, value: serde_json::Value) -> HamletResult<()>;

    async fn broadcast(
        &self,
        sender: &AgentId,
        kind: &str,
        text: &str,
        data: serde_json::Value,
    ) -> HamletResult<()>;

    async fn alert(&self, source: &str, text: &str, data: serde_json::Value) -> HamletResult<()>;
}

/// A fire-and-forget recorder of interactions (memories, relationships).
///
/// Callers never wait on the outcome: see [`crate::sink::BestEffortSinks`].
#[async_trait]
pub trait InteractionSink: Send + Sync {
    /// Short label used in logs when a write fails.
    fn name(&self) -> &str;

    async fn record(&self, interaction: &InteractionRecord) -> HamletResult<()>;
}
