//! The aggregate town configuration and its loaders.
//!
//! Every section is optional in the TOML document; omitted sections take
//! their documented defaults. Loading always validates.
//!
//! ```toml
//! [tick]
//! interval_ms = 5000
//! batch_size = 2
//!
//! [parser]
//! zones = ["main_city", "park", "harbor"]
//!
//! [[characters]]
//! id = "sage"
//! name = "Sage"
//! preferred_zone = "park"
//!
//! [[activities]]
//! description = "people watching"
//! emoji = "👀"
//! weight = 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hamlet_contracts::{
    agent::CharacterProfile,
    config::{
        AlertStoreConfig, DedupConfig, ParserConfig, PoolActivity, RateLimitConfig,
        SchedulerConfig, TickConfig,
    },
    error::{HamletError, HamletResult},
};

use crate::validate::validate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownConfig {
    pub tick: TickConfig,
    pub scheduler: SchedulerConfig,
    pub rate_limit: RateLimitConfig,
    pub alerts: AlertStoreConfig,
    pub dedup: DedupConfig,
    pub parser: ParserConfig,
    pub characters: Vec<CharacterProfile>,
    /// The shared weighted activity pool.
    pub activities: Vec<PoolActivity>,
}

impl TownConfig {
    /// Parse and validate a TOML document.
    ///
    /// Returns `HamletError::Config` if the TOML is malformed, does not match
    /// the schema, or fails validation.
    pub fn from_toml_str(s: &str) -> HamletResult<Self> {
        let config: TownConfig = toml::from_str(s).map_err(|e| HamletError::Config {
            reason: format!("failed to parse town TOML: {}", e),
        })?;
        config.validate()?;
        debug!(
            characters = config.characters.len(),
            activities = config.activities.len(),
            zones = config.parser.zones.len(),
            "town configuration loaded"
        );
        Ok(config)
    }

    /// Read the file at `path`, then parse and validate it.
    pub fn from_file(path: &Path) -> HamletResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HamletError::Config {
            reason: format!("failed to read town config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> HamletResult<String> {
        toml::to_string_pretty(self).map_err(|e| HamletError::Config {
            reason: format!("failed to serialize town config: {}", e),
        })
    }

    /// Check every cross-field constraint. The first violation wins.
    pub fn validate(&self) -> HamletResult<()> {
        validate(self)
    }
}
