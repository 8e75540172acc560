//! # hamlet-engine
//!
//! The agent tick engine: one runtime state per registered agent, a
//! fixed-period cycle that decides for every ready agent, and execution of
//! each decision against the world collaborator.
//!
//! ## Overview
//!
//! Cheap rule-based choices (approach, activity, wander) are interleaved with
//! expensive model-assisted ones. Model calls are gated by a random roll and
//! by the shared [`RateLimiter`](hamlet_core::rate_limit::RateLimiter); the
//! model's reply is turned into a typed decision by
//! [`DecisionParser`](hamlet_parser::DecisionParser).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hamlet_engine::{AgentTickEngine, CharacterRoster};
//!
//! let engine = AgentTickEngine::builder(world, CharacterRoster::new(cast))
//!     .model(model)
//!     .coordinator(coordinator)
//!     .build();
//! engine.register_agent(AgentId::new("sage"), None).await;
//! engine.start();
//! ```

pub mod activity;
pub mod engine;
pub mod prompt;
pub mod report;
pub mod roster;

pub use activity::ActivityPool;
pub use engine::{AgentTickEngine, EngineBuilder, DECIDE_OPERATION};
pub use report::{CycleReport, SkipReason};
pub use roster::CharacterRoster;

// ── Tests ─────────────────────────────────────────────────────────────────────
