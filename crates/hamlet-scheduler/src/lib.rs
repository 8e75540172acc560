//! # hamlet-scheduler
//!
//! Runs heterogeneous periodic jobs (feed scans, health checks, social
//! posts) on per-task intervals, independent of the agent tick.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hamlet_scheduler::{task_fn, TaskRunner, TaskSpec};
//!
//! let runner = TaskRunner::new(SchedulerConfig::default(), Arc::new(SystemClock));
//! runner.register_task(TaskSpec::new("scan", "sage", 60_000, task_fn(|| async { Ok(()) })));
//! runner.start();
//! ```
//!
//! Task topology is static: tasks are registered at startup and never
//! removed. All state lives in process.

pub mod handler;
pub mod runner;

pub use handler::{task_fn, FnTask, TaskHandler, TaskSpec};
pub use runner::{SweepReport, TaskRunner};

// ── Tests ─────────────────────────────────────────────────────────────────────
