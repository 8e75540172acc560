//! Configuration sections for every hamlet component.
//!
//! Each section deserializes with `#[serde(default)]`, so a TOML file only
//! needs to name the values it overrides. Durations are stored as
//! milliseconds and exposed through `Duration` accessors.

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Zone used when neither a snapshot nor a configured zone list says better.
pub const DEFAULT_ZONE: &str = "main_city";

/// Agent tick engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub interval_ms: u64,
    /// Agents decided concurrently per batch; batches run one after another.
    pub batch_size: usize,
    /// An in-progress operation older than this is considered stuck.
    pub operation_timeout_ms: u64,
    pub conversation_cooldown_ms: u64,
    pub activity_cooldown_ms: u64,
    /// Probability that a successful social roll consults the model.
    pub llm_probability: f64,
    /// Probability that an agent outside its preferred zone heads home.
    pub return_home_chance: f64,
    /// How many inbox messages to read per agent per tick.
    pub inbox_limit: usize,
    pub max_tokens: u32,
    /// Skip whole cycles while no client is watching the world.
    pub pause_without_clients: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            batch_size: 4,
            operation_timeout_ms: 60_000,
            conversation_cooldown_ms: 30_000,
            activity_cooldown_ms: 15_000,
            llm_probability: 0.3,
            return_home_chance: 0.2,
            inbox_limit: 5,
            max_tokens: 150,
            pause_without_clients: false,
        }
    }
}

impl TickConfig {
    pub fn interval(&self) -> StdDuration {
        StdDuration::from_millis(self.interval_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        millis(self.operation_timeout_ms)
    }

    pub fn conversation_cooldown(&self) -> Duration {
        millis(self.conversation_cooldown_ms)
    }

    pub fn activity_cooldown(&self) -> Duration {
        millis(self.activity_cooldown_ms)
    }
}

/// Scheduled task runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub sweep_interval_ms: u64,
    /// Maximum number of run records kept in history.
    pub history_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 30_000,
            history_capacity: 200,
        }
    }
}

impl SchedulerConfig {
    pub fn sweep_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.sweep_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_calls_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls_per_minute: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertStoreConfig {
    pub capacity: usize,
}

impl Default for AlertStoreConfig {
    fn default() -> Self {
        Self { capacity: 500 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub capacity: usize,
    /// Normalized characters that contribute to a fingerprint.
    pub prefix_len: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            prefix_len: 100,
        }
    }
}

/// Decision parser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Zones a `WANDER <zone>` token is matched against.
    pub zones: Vec<String>,
    pub default_zone: String,
    pub activity_min_ms: u64,
    pub activity_max_ms: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            default_zone: DEFAULT_ZONE.to_string(),
            activity_min_ms: 30_000,
            activity_max_ms: 120_000,
        }
    }
}

/// One weighted entry in the global activity pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolActivity {
    pub description: String,
    pub emoji: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}
