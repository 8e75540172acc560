//! The decision parser: free-form model text → one typed `Decision`.
//!
//! Parsing never fails. Each stage narrows the input and, when it cannot make
//! sense of what is left, falls back to the cheapest safe decision: wandering
//! in the agent's current zone (or the configured default zone).
//!
//! Stages:
//!
//! 1. Markup stripping; only the first logical line is kept.
//! 2. Keyword detection: the earliest recognised keyword in the line wins,
//!    regardless of which action it names.
//! 3. Per-action capture (quoted / unquoted text, identifiers, zone tokens).
//! 4. No keyword at all: any quoted span of 5–80 characters becomes speech.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use hamlet_contracts::{
    agent::AgentId,
    config::ParserConfig,
    decision::{truncate_chars, Decision, MAX_ACTIVITY_CHARS, MAX_MESSAGE_CHARS},
    world::WorldSnapshot,
};
use hamlet_core::random::RandomSource;

use crate::{clean::first_logical_line, emoji::select_emoji, emotion::detect_emotion};

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(speak|say|approach|activity|do|wander|walk|move|idle|wait|nothing)\b")
        .expect("keyword pattern is valid")
});

static LEADING_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s:=>\-–—]*").expect("separator pattern is valid"));

static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("double quote pattern is valid"));

// A single quote only opens a capture when it does not sit inside a word, so
// apostrophes ("I'm", "town's") never start one.
static SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w])'([^']*)'(?:[^\w]|$)").expect("single quote pattern is valid")
});

static UNTERMINATED_DOUBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)$"#).expect("unterminated quote pattern is valid"));

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?i:to(?:wards?)?\s+)?(?i:the\s+)?["'@]?([\w.\-]+)"#)
        .expect("identifier pattern is valid")
});

static LAST_RESORT_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]{5,80})""#).expect("last resort pattern is valid"));

/// The action a keyword names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Speak,
    Approach,
    Activity,
    Wander,
    Idle,
}

impl Action {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "speak" | "say" => Some(Action::Speak),
            "approach" => Some(Action::Approach),
            "activity" | "do" => Some(Action::Activity),
            "wander" | "walk" | "move" => Some(Action::Wander),
            "idle" | "wait" | "nothing" => Some(Action::Idle),
            _ => None,
        }
    }
}

/// Turns raw model output into a `Decision`.
///
/// The only non-determinism is the activity duration, drawn from the
/// injected `RandomSource` within the configured bounds.
pub struct DecisionParser {
    config: ParserConfig,
    random: Arc<dyn RandomSource>,
}

impl DecisionParser {
    pub fn new(config: ParserConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `raw` in the context of an optional world snapshot.
    pub fn parse(&self, raw: &str, snapshot: Option<&WorldSnapshot>) -> Decision {
        let Some(line) = first_logical_line(raw) else {
            debug!("empty model output, falling back to wander");
            return self.fallback(snapshot);
        };

        let Some(found) = KEYWORD.captures(&line).and_then(|caps| {
            let keyword = caps.get(1)?;
            Action::from_keyword(keyword.as_str()).map(|action| (action, keyword.end()))
        }) else {
            return self.parse_without_keyword(&line, snapshot);
        };

        let (action, keyword_end) = found;
        let rest = LEADING_SEPARATORS.replace(&line[keyword_end..], "").into_owned();

        let decision = match action {
            Action::Speak => capture_text(&rest, MAX_MESSAGE_CHARS)
                .map(|message| Decision::speak(&message, detect_emotion(&message))),
            Action::Approach => self.parse_approach(&rest, snapshot),
            Action::Activity => capture_text(&rest, MAX_ACTIVITY_CHARS).map(|description| {
                let duration_ms = self
                    .random
                    .range_inclusive(self.config.activity_min_ms, self.config.activity_max_ms);
                Decision::activity(&description, select_emoji(&description), duration_ms)
            }),
            Action::Wander => Some(self.parse_wander(&rest, snapshot)),
            Action::Idle => Some(Decision::Idle),
        };

        decision.unwrap_or_else(|| {
            debug!(?action, line = %line, "nothing to capture after keyword, falling back to wander");
            self.fallback(snapshot)
        })
    }

    fn parse_without_keyword(&self, line: &str, snapshot: Option<&WorldSnapshot>) -> Decision {
        if let Some(quoted) = LAST_RESORT_QUOTE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|text| !text.is_empty())
        {
            return Decision::speak(quoted, detect_emotion(quoted));
        }
        debug!(line = %line, "no action keyword found, falling back to wander");
        self.fallback(snapshot)
    }

    /// Resolve an approach target against the nearby-agent list.
    ///
    /// A non-empty nearby list is authoritative: an unknown or missing name is
    /// replaced by the closest agent rather than rejected.
    fn parse_approach(&self, rest: &str, snapshot: Option<&WorldSnapshot>) -> Option<Decision> {
        let captured = IDENTIFIER
            .captures(rest)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end_matches(['.', '-']).to_string())
            .filter(|id| !id.is_empty());

        let nearby = snapshot.map(|s| s.nearby_agents.as_slice()).unwrap_or(&[]);
        if let Some(first) = nearby.first() {
            let target = captured
                .as_deref()
                .and_then(|id| nearby.iter().find(|n| n.as_str().eq_ignore_ascii_case(id)))
                .unwrap_or(first);
            return Some(Decision::approach(target.clone()));
        }

        captured.map(|id| Decision::approach(AgentId(id)))
    }

    fn parse_wander(&self, rest: &str, snapshot: Option<&WorldSnapshot>) -> Decision {
        let zone = IDENTIFIER
            .captures(rest)
            .and_then(|caps| caps.get(1))
            .and_then(|m| self.match_zone(m.as_str()));

        match zone {
            Some(zone) => Decision::wander(zone),
            None => self.fallback(snapshot),
        }
    }

    /// Match a zone token against the known zones: exact first, then
    /// substring in either direction ("main" ↔ "main_city").
    fn match_zone(&self, token: &str) -> Option<String> {
        let token = token.to_lowercase();
        if token.len() < 2 {
            return None;
        }
        let zones = &self.config.zones;

        zones
            .iter()
            .find(|zone| zone.to_lowercase() == token)
            .or_else(|| {
                zones.iter().find(|zone| {
                    let zone = zone.to_lowercase();
                    zone.contains(&token) || token.contains(&zone)
                })
            })
            .cloned()
    }

    fn fallback(&self, snapshot: Option<&WorldSnapshot>) -> Decision {
        let zone = snapshot
            .map(|s| s.zone.clone())
            .unwrap_or_else(|| self.config.default_zone.clone());
        Decision::wander(zone)
    }
}

/// Capture free text after a keyword, trying in order: a double-quoted span,
/// a single-quoted span, a double quote that is never closed, and finally the
/// unquoted remainder. The first non-blank capture wins and is truncated to
/// `max` characters. A closed double-quoted span is taken verbatim; the other
/// forms are trimmed.
fn capture_text(rest: &str, max: usize) -> Option<String> {
    let quoted = |re: &Regex, trim: bool| {
        re.captures_iter(rest)
            .filter_map(|caps| caps.get(1))
            .map(|m| if trim { m.as_str().trim() } else { m.as_str() })
            .find(|text| !text.trim().is_empty())
            .map(str::to_string)
    };

    quoted(&DOUBLE_QUOTED, false)
        .or_else(|| quoted(&SINGLE_QUOTED, true))
        .or_else(|| quoted(&UNTERMINATED_DOUBLE, true))
        .or_else(|| {
            let bare: String = rest
                .trim()
                .trim_matches(['"', '\''])
                .trim()
                .chars()
                .take(max)
                .collect();
            (!bare.is_empty()).then_some(bare)
        })
        .map(|text| truncate_chars(&text, max))
}
