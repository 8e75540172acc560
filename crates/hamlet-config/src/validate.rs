//! Range and consistency checks for a loaded `TownConfig`.

use std::collections::HashSet;

use hamlet_contracts::error::{HamletError, HamletResult};

use crate::town::TownConfig;

fn invalid(reason: impl Into<String>) -> HamletError {
    HamletError::Config {
        reason: reason.into(),
    }
}

fn check_probability(field: &str, value: f64) -> HamletResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{} must be within [0, 1], got {}", field, value)))
    }
}

pub(crate) fn validate(config: &TownConfig) -> HamletResult<()> {
    let tick = &config.tick;
    if tick.interval_ms == 0 {
        return Err(invalid("tick.interval_ms must be greater than zero"));
    }
    if tick.batch_size == 0 {
        return Err(invalid("tick.batch_size must be greater than zero"));
    }
    check_probability("tick.llm_probability", tick.llm_probability)?;
    check_probability("tick.return_home_chance", tick.return_home_chance)?;

    if config.scheduler.sweep_interval_ms == 0 {
        return Err(invalid("scheduler.sweep_interval_ms must be greater than zero"));
    }
    if config.rate_limit.max_calls_per_minute == 0 {
        return Err(invalid("rate_limit.max_calls_per_minute must be greater than zero"));
    }
    if config.alerts.capacity == 0 {
        return Err(invalid("alerts.capacity must be greater than zero"));
    }
    if config.dedup.capacity == 0 || config.dedup.prefix_len == 0 {
        return Err(invalid("dedup.capacity and dedup.prefix_len must be greater than zero"));
    }

    let parser = &config.parser;
    if parser.activity_min_ms > parser.activity_max_ms {
        return Err(invalid(format!(
            "parser.activity_min_ms ({}) exceeds parser.activity_max_ms ({})",
            parser.activity_min_ms, parser.activity_max_ms
        )));
    }
    if parser.default_zone.trim().is_empty() {
        return Err(invalid("parser.default_zone must not be empty"));
    }

    let zones: HashSet<&str> = parser.zones.iter().map(String::as_str).collect();
    let mut ids = HashSet::new();
    for character in &config.characters {
        if character.id.trim().is_empty() {
            return Err(invalid("character id must not be empty"));
        }
        if !ids.insert(character.id.to_lowercase()) {
            return Err(invalid(format!("duplicate character id '{}'", character.id)));
        }
        if !zones.is_empty() && !zones.contains(character.preferred_zone.as_str()) {
            return Err(invalid(format!(
                "character '{}' prefers unknown zone '{}'",
                character.id, character.preferred_zone
            )));
        }
        check_probability(
            &format!("characters.{}.interaction_chance", character.id),
            character.interaction_chance,
        )?;
        check_probability(
            &format!("characters.{}.activity_chance", character.id),
            character.activity_chance,
        )?;
        for special in &character.special_activities {
            check_probability(
                &format!("characters.{}.special_activities.chance", character.id),
                special.chance,
            )?;
        }
    }

    Ok(())
}
