//! Reference town demo scenarios.
//!
//! Each scenario wires the real hamlet components (tick engine, task runner,
//! alert and dedup stores, rate limiter) to the in-memory collaborators and
//! drives them with a manual clock, so a run is reproducible for a given seed.

pub mod market_watch;
pub mod town_square;
