//! # hamlet-config
//!
//! TOML-driven configuration for a whole town: every component's tunables,
//! the character cast and the shared activity pool.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hamlet_config::TownConfig;
//!
//! let town = TownConfig::from_file(Path::new("town.toml"))?;
//! let engine = AgentTickEngine::builder(world, CharacterRoster::new(town.characters.clone()))
//!     .config(town.tick.clone())
//!     .parser_config(town.parser.clone())
//!     .build();
//! ```

pub mod town;
mod validate;

pub use town::TownConfig;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use hamlet_contracts::{config::TickConfig, error::HamletError};

    use super::TownConfig;

    const TOWN: &str = r#"
[tick]
interval_ms = 5000
batch_size = 2
llm_probability = 0.5

[rate_limit]
max_calls_per_minute = 30

[parser]
zones = ["main_city", "park", "harbor"]
activity_min_ms = 10000
activity_max_ms = 20000

[[characters]]
id = "sage"
name = "Sage"
bio = "Keeps the park tidy."
preferred_zone = "park"
interaction_chance = 0.6

[[characters.special_activities]]
description = "pruning roses"
emoji = "🌹"
chance = 0.25
duration_ms = 60000

[[characters]]
id = "finn"
name = "Finn"
preferred_zone = "harbor"

[[activities]]
description = "people watching"
emoji = "👀"
weight = 3

[[activities]]
description = "stretching"
emoji = "🏃"
"#;

    fn expect_config_error(toml: &str, needle: &str) {
        match TownConfig::from_toml_str(toml) {
            Err(HamletError::Config { reason }) => {
                assert!(reason.contains(needle), "'{}' not in '{}'", needle, reason)
            }
            other => panic!("expected config error containing '{}', got {:?}", needle, other),
        }
    }

    #[test]
    fn test_full_document_loads() {
        let town = TownConfig::from_toml_str(TOWN).unwrap();
        assert_eq!(town.tick.interval_ms, 5000);
        assert_eq!(town.tick.batch_size, 2);
        // Unspecified fields keep their defaults.
        assert_eq!(town.tick.operation_timeout_ms, 60_000);
        assert_eq!(town.scheduler.sweep_interval_ms, 30_000);
        assert_eq!(town.alerts.capacity, 500);
        assert_eq!(town.rate_limit.max_calls_per_minute, 30);
        assert_eq!(town.parser.default_zone, "main_city");

        assert_eq!(town.characters.len(), 2);
        assert_eq!(town.characters[0].special_activities[0].emoji, "🌹");
        assert_eq!(town.characters[1].interaction_chance, 0.3);
        assert_eq!(town.activities[1].weight, 1);
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        let town = TownConfig::from_toml_str("").unwrap();
        assert_eq!(town, TownConfig::default());
        assert_eq!(town.tick, TickConfig::default());
    }

    #[test]
    fn test_malformed_toml() {
        expect_config_error("[tick\ninterval_ms = 1", "failed to parse town TOML");
        expect_config_error("[tick]\ninterval_ms = \"fast\"", "failed to parse town TOML");
    }

    #[test]
    fn test_probability_out_of_range() {
        expect_config_error("[tick]\nllm_probability = 1.5", "tick.llm_probability");
        expect_config_error(
            "[[characters]]\nid = \"sage\"\nname = \"Sage\"\npreferred_zone = \"park\"\nactivity_chance = -0.1",
            "characters.sage.activity_chance",
        );
    }

    #[test]
    fn test_zero_sizes_rejected() {
        expect_config_error("[tick]\nbatch_size = 0", "batch_size");
        expect_config_error("[rate_limit]\nmax_calls_per_minute = 0", "max_calls_per_minute");
        expect_config_error("[alerts]\ncapacity = 0", "alerts.capacity");
    }

    #[test]
    fn test_duration_bounds_ordered() {
        expect_config_error(
            "[parser]\nactivity_min_ms = 5000\nactivity_max_ms = 1000",
            "exceeds parser.activity_max_ms",
        );
    }

    #[test]
    fn test_duplicate_character_ids() {
        let toml = r#"
[[characters]]
id = "sage"
name = "Sage"
preferred_zone = "park"

[[characters]]
id = "SAGE"
name = "Other Sage"
preferred_zone = "park"
"#;
        expect_config_error(toml, "duplicate character id");
    }

    #[test]
    fn test_preferred_zone_must_be_known() {
        let toml = r#"
[parser]
zones = ["park"]

[[characters]]
id = "finn"
name = "Finn"
preferred_zone = "moon"
"#;
        expect_config_error(toml, "unknown zone 'moon'");
    }

    #[test]
    fn test_from_file_and_round_trip() {
        let path = std::env::temp_dir().join(format!("hamlet-town-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TOWN.as_bytes()).unwrap();
        drop(file);

        let town = TownConfig::from_file(&path).unwrap();
        let rendered = town.to_toml_string().unwrap();
        assert_eq!(TownConfig::from_toml_str(&rendered).unwrap(), town);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            TownConfig::from_file(&path),
            Err(HamletError::Config { .. })
        ));
    }
}
