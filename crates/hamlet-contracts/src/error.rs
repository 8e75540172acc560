//! Runtime error types for the hamlet agent runtime.
//!
//! Collaborator calls return `HamletResult<T>`. Nothing in the tick engine or
//! the task runner lets one of these escape a cycle: every call site turns an
//! `Err` into a log line and a degraded outcome.

use thiserror::Error;

/// The unified error type for the hamlet runtime.
#[derive(Debug, Error)]
pub enum HamletError {
    /// A configuration value is missing, malformed, or out of range.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// No character profile resolves for the agent being registered.
    #[error("no character profile for agent '{agent_id}'")]
    UnknownCharacter { agent_id: String },

    /// The world collaborator rejected or failed a call.
    #[error("world sync failed: {reason}")]
    WorldSync { reason: String },

    /// The language model call failed or returned nothing usable.
    #[error("language model call failed: {reason}")]
    Model { reason: String },

    /// The coordinator collaborator failed a call.
    #[error("coordinator call failed: {reason}")]
    Coordinator { reason: String },

    /// A best-effort sink could not record an interaction.
    #[error("sink write failed: {reason}")]
    Sink { reason: String },

    /// A scheduled task handler returned an error or panicked.
    #[error("task '{name}' failed: {reason}")]
    TaskFailed { name: String, reason: String },

    /// No task is registered under the given name.
    #[error("no task named '{name}'")]
    TaskNotFound { name: String },
}

/// Convenience alias used throughout the hamlet crates.
pub type HamletResult<T> = Result<T, HamletError>;
