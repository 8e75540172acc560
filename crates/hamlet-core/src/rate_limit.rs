//! Rolling per-minute budget for language-model calls.
//!
//! One `RateLimiter` is shared (behind an `Arc`) by every component that may
//! call the model. `try_acquire` holds a single lock across check and
//! increment, so two concurrent callers can never both take the last slot.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use hamlet_contracts::config::RateLimitConfig;

use crate::clock::Clock;

/// Call count within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

/// Cumulative counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStats {
    pub granted: u64,
    pub denied: u64,
}

struct LimiterState {
    window: RateLimitWindow,
    stats: RateLimitStats,
}

pub struct RateLimiter {
    ceiling: u32,
    window_len: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = RateLimitWindow {
            count: 0,
            window_start: clock.now(),
        };
        Self {
            ceiling: config.max_calls_per_minute,
            window_len: Duration::seconds(60),
            clock,
            state: Mutex::new(LimiterState {
                window,
                stats: RateLimitStats::default(),
            }),
        }
    }

    /// Take one call slot if the current window has room.
    ///
    /// The window resets lazily: the first check more than 60 seconds after
    /// `window_start` zeroes the count and restarts the window at `now`
    /// before the request is evaluated. A denied request changes nothing
    /// except the `denied` counter.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("rate limiter lock poisoned");

        if now - state.window.window_start > self.window_len {
            state.window = RateLimitWindow {
                count: 0,
                window_start: now,
            };
        }

        if state.window.count >= self.ceiling {
            state.stats.denied += 1;
            debug!(
                ceiling = self.ceiling,
                window_start = %state.window.window_start,
                "model call budget exhausted"
            );
            return false;
        }

        state.window.count += 1;
        state.stats.granted += 1;
        true
    }

    /// Slots left in the current window, as of the last reset.
    pub fn remaining(&self) -> u32 {
        let state = self.state.lock().expect("rate limiter lock poisoned");
        self.ceiling.saturating_sub(state.window.count)
    }

    pub fn window(&self) -> RateLimitWindow {
        self.state.lock().expect("rate limiter lock poisoned").window
    }

    pub fn stats(&self) -> RateLimitStats {
        self.state.lock().expect("rate limiter lock poisoned").stats
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}
