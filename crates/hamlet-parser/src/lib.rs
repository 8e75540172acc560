//! # hamlet-parser
//!
//! Tolerant parsing of free-form language-model output into a typed
//! [`Decision`](hamlet_contracts::decision::Decision).
//!
//! This crate provides [`parser::DecisionParser`], plus the two lookups it
//! leans on: [`emotion::detect_emotion`] and [`emoji::select_emoji`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use hamlet_parser::DecisionParser;
//!
//! let parser = DecisionParser::new(ParserConfig::default(), Arc::new(SeededRandom::from_entropy()));
//! let decision = parser.parse("SPEAK \"lovely morning!\"", Some(&snapshot));
//! ```
//!
//! The parser has no side effects and never fails: malformed text degrades
//! to wandering in the agent's current zone.

pub mod clean;
pub mod emoji;
pub mod emotion;
pub mod parser;

pub use emoji::select_emoji;
pub use emotion::detect_emotion;
pub use parser::DecisionParser;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hamlet_contracts::{
        agent::AgentId,
        config::ParserConfig,
        decision::{Decision, Emotion},
        world::WorldSnapshot,
    };
    use hamlet_core::random::FixedRandom;

    use crate::DecisionParser;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn parser() -> DecisionParser {
        DecisionParser::new(
            ParserConfig {
                zones: vec![
                    "main_city".to_string(),
                    "park".to_string(),
                    "market_square".to_string(),
                    "harbor".to_string(),
                ],
                default_zone: "main_city".to_string(),
                activity_min_ms: 30_000,
                activity_max_ms: 90_000,
            },
            Arc::new(FixedRandom::always_pass()),
        )
    }

    fn snapshot_with(zone: &str, nearby: &[&str]) -> WorldSnapshot {
        WorldSnapshot {
            nearby_agents: nearby.iter().map(|n| AgentId::new(*n)).collect(),
            ..WorldSnapshot::idle_in(zone)
        }
    }

    fn expect_speak(decision: Decision) -> (String, Emotion) {
        match decision {
            Decision::Speak { message, emotion } => (message, emotion),
            other => panic!("expected Speak, got {:?}", other),
        }
    }

    // ── SPEAK / SAY ───────────────────────────────────────────────────────────

    #[test]
    fn test_speak_double_quoted() {
        let (message, _) = expect_speak(parser().parse(r#"SPEAK "Lovely morning""#, None));
        assert_eq!(message, "Lovely morning");
    }

    #[test]
    fn test_speak_quoted_message_is_exact() {
        let long = "y".repeat(80);
        for text in ["a", "hello there, neighbour", long.as_str()] {
            let raw = format!("SPEAK \"{}\" and then some", text);
            let (message, _) = expect_speak(parser().parse(&raw, None));
            assert_eq!(message, text);
        }
    }

    #[test]
    fn test_speak_quoted_message_keeps_markup_and_padding() {
        let cases = [
            ("1. **SPEAK** \"snake__case is fun\"", "snake__case is fun"),
            ("SPEAK \" padded \"", " padded "),
            ("SPEAK \"it\u{2019}s mine\"", "it\u{2019}s mine"),
            ("SAY \u{201C}*waves*\u{201D}", "*waves*"),
        ];
        for (raw, expected) in cases {
            let (message, _) = expect_speak(parser().parse(raw, None));
            assert_eq!(message, expected, "parsing {:?}", raw);
        }
    }

    #[test]
    fn test_first_action_wins_across_lines() {
        let snapshot = snapshot_with("park", &["bob"]);
        let (message, _) = expect_speak(parser().parse("SPEAK \"a\"\nAPPROACH bob", Some(&snapshot)));
        assert_eq!(message, "a");
    }

    #[test]
    fn test_speak_truncates_to_80() {
        let raw = format!("SPEAK \"{}\"", "x".repeat(1000));
        let (message, _) = expect_speak(parser().parse(&raw, None));
        assert_eq!(message.chars().count(), 80);
    }

    #[test]
    fn test_speak_single_quoted() {
        let (message, _) = expect_speak(parser().parse("say: 'see you at the harbor'", None));
        assert_eq!(message, "see you at the harbor");
    }

    #[test]
    fn test_speak_unterminated_quote() {
        let (message, _) = expect_speak(parser().parse("SPEAK \"the bakery opens soon", None));
        assert_eq!(message, "the bakery opens soon");
    }

    #[test]
    fn test_speak_unquoted() {
        let (message, _) = expect_speak(parser().parse("Say: I'm off to find some bread", None));
        assert_eq!(message, "I'm off to find some bread");
    }

    #[test]
    fn test_speak_with_markup() {
        let raw = "```\n1. **SPEAK** `\"Fresh fish today!\"`\n```";
        let (message, _) = expect_speak(parser().parse(raw, None));
        assert_eq!(message, "Fresh fish today!");
    }

    #[test]
    fn test_speak_detects_emotion() {
        let (_, emotion) = expect_speak(parser().parse("SPEAK \"😢 this is awesome\"", None));
        assert_eq!(emotion, Emotion::Sad);

        let (_, emotion) = expect_speak(parser().parse("SPEAK \"what a great catch\"", None));
        assert_eq!(emotion, Emotion::Surprised);
    }

    // ── Keyword ordering ──────────────────────────────────────────────────────

    #[test]
    fn test_earliest_keyword_wins_over_priority() {
        let snapshot = snapshot_with("park", &["finn"]);
        // WANDER appears before SPEAK in the line.
        let decision = parser().parse("WANDER to the harbor, then SPEAK \"hi\"", Some(&snapshot));
        assert_eq!(decision, Decision::wander("harbor"));

        let decision = parser().parse("idle, maybe say \"hi\" later", Some(&snapshot));
        assert_eq!(decision, Decision::Idle);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(parser().parse("nothing", None), Decision::Idle);
        assert_eq!(parser().parse("Wait.", None), Decision::Idle);
    }

    // ── APPROACH ──────────────────────────────────────────────────────────────

    #[test]
    fn test_approach_unknown_substitutes_first_nearby() {
        let snapshot = snapshot_with("park", &["finn", "ghost"]);
        let decision = parser().parse("APPROACH unknown", Some(&snapshot));
        assert_eq!(decision, Decision::approach(AgentId::new("finn")));
    }

    #[test]
    fn test_approach_matches_case_insensitively() {
        let snapshot = snapshot_with("park", &["finn", "ghost"]);
        let decision = parser().parse("approach \"GHOST\"", Some(&snapshot));
        assert_eq!(decision, Decision::approach(AgentId::new("ghost")));
    }

    #[test]
    fn test_approach_without_snapshot_is_verbatim() {
        let decision = parser().parse("APPROACH Marlowe.", None);
        assert_eq!(decision, Decision::approach(AgentId::new("Marlowe")));
    }

    #[test]
    fn test_approach_with_empty_nearby_is_verbatim() {
        let snapshot = snapshot_with("park", &[]);
        let decision = parser().parse("APPROACH towards sage", Some(&snapshot));
        assert_eq!(decision, Decision::approach(AgentId::new("sage")));
    }

    #[test]
    fn test_approach_nothing_captured_uses_first_nearby() {
        let snapshot = snapshot_with("park", &["finn"]);
        let decision = parser().parse("APPROACH", Some(&snapshot));
        assert_eq!(decision, Decision::approach(AgentId::new("finn")));
    }

    // ── ACTIVITY / DO ─────────────────────────────────────────────────────────

    #[test]
    fn test_activity_captures_emoji_and_duration() {
        match parser().parse("ACTIVITY \"reading an old book by the fountain\"", None) {
            Decision::Activity {
                description,
                emoji,
                duration_ms,
            } => {
                assert_eq!(description, "reading an old book by the fountain");
                assert_eq!(emoji, "📖");
                // FixedRandom::always_pass picks the lower bound.
                assert_eq!(duration_ms, 30_000);
            }
            other => panic!("expected Activity, got {:?}", other),
        }
    }

    #[test]
    fn test_activity_truncates_to_50() {
        let raw = format!("DO \"{}\"", "fishing ".repeat(20));
        match parser().parse(&raw, None) {
            Decision::Activity { description, emoji, .. } => {
                assert_eq!(description.chars().count(), 50);
                assert_eq!(emoji, "🎣");
            }
            other => panic!("expected Activity, got {:?}", other),
        }
    }

    // ── WANDER / WALK / MOVE ──────────────────────────────────────────────────

    #[test]
    fn test_wander_partial_zone_match() {
        assert_eq!(parser().parse("WANDER main", None), Decision::wander("main_city"));
        assert_eq!(parser().parse("walk to market", None), Decision::wander("market_square"));
        assert_eq!(parser().parse("MOVE harbor_docks", None), Decision::wander("harbor"));
    }

    #[test]
    fn test_wander_unknown_zone_falls_back_to_snapshot_zone() {
        let snapshot = snapshot_with("park", &[]);
        assert_eq!(parser().parse("WANDER moon", Some(&snapshot)), Decision::wander("park"));
        assert_eq!(parser().parse("WANDER", Some(&snapshot)), Decision::wander("park"));
    }

    #[test]
    fn test_wander_without_snapshot_uses_default_zone() {
        assert_eq!(parser().parse("wander somewhere", None), Decision::wander("main_city"));
    }

    // ── No keyword ────────────────────────────────────────────────────────────

    #[test]
    fn test_last_resort_quoted_span_becomes_speech() {
        let (message, _) = expect_speak(parser().parse("I think \"good evening folks\" fits", None));
        assert_eq!(message, "good evening folks");
    }

    #[test]
    fn test_short_quoted_span_is_not_speech() {
        let snapshot = snapshot_with("harbor", &[]);
        assert_eq!(parser().parse("hmm \"ok\"", Some(&snapshot)), Decision::wander("harbor"));
    }

    #[test]
    fn test_garbage_defaults_to_wander() {
        assert_eq!(parser().parse("", None), Decision::wander("main_city"));
        assert_eq!(parser().parse("¯\\_(ツ)_/¯", None), Decision::wander("main_city"));
        let snapshot = snapshot_with("park", &["finn"]);
        assert_eq!(parser().parse("   \n\n", Some(&snapshot)), Decision::wander("park"));
    }

    #[test]
    fn test_speak_with_nothing_to_say_falls_back() {
        let snapshot = snapshot_with("park", &[]);
        assert_eq!(parser().parse("SPEAK \"\"", Some(&snapshot)), Decision::wander("park"));
    }
}
