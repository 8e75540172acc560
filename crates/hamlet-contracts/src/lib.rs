//! # hamlet-contracts
//!
//! Shared types, configuration sections, and error contracts for the hamlet
//! agent runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod agent;
pub mod alert;
pub mod config;
pub mod decision;
pub mod error;
pub mod message;
pub mod task;
pub mod world;

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use agent::{AgentId, InProgressOperation};
    use alert::{Alert, AlertId, AlertQuery, AlertSeverity, AlertType};
    use decision::{truncate_chars, Decision, Emotion, MAX_ACTIVITY_CHARS, MAX_MESSAGE_CHARS};
    use error::HamletError;
    use world::{CurrentActivity, WorldSnapshot};

    // ── Decision construction ────────────────────────────────────────────────

    #[test]
    fn speak_truncates_long_messages() {
        let long = "x".repeat(1000);
        match Decision::speak(&long, Emotion::Neutral) {
            Decision::Speak { message, .. } => assert_eq!(message.chars().count(), MAX_MESSAGE_CHARS),
            other => panic!("expected Speak, got {:?}", other),
        }
    }

    #[test]
    fn activity_truncates_description() {
        let long = "painting ".repeat(20);
        match Decision::activity(&long, "🎨", 1_000) {
            Decision::Activity { description, .. } => {
                assert_eq!(description.chars().count(), MAX_ACTIVITY_CHARS)
            }
            other => panic!("expected Activity, got {:?}", other),
        }
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let text = "héllo wörld 😊😊😊";
        let cut = truncate_chars(text, 13);
        assert_eq!(cut.chars().count(), 13);
        assert!(cut.ends_with('😊'));
        assert_eq!(truncate_chars("short", 80), "short");
    }

    #[test]
    fn decision_serializes_with_type_tag() {
        let json = serde_json::to_value(Decision::wander("market")).unwrap();
        assert_eq!(json["type"], "wander");
        assert_eq!(json["zone"], "market");

        let idle = serde_json::to_value(Decision::Idle).unwrap();
        assert_eq!(idle["type"], "idle");
    }

    // ── Snapshot helpers ─────────────────────────────────────────────────────

    #[test]
    fn mid_activity_only_before_until() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let mut snapshot = WorldSnapshot::idle_in("park");
        assert!(!snapshot.is_mid_activity(now));

        snapshot.current_activity = Some(CurrentActivity {
            description: "reading".to_string(),
            until: now + Duration::seconds(5),
        });
        assert!(snapshot.is_mid_activity(now));
        assert!(!snapshot.is_mid_activity(now + Duration::seconds(5)));
    }

    #[test]
    fn operation_expiry_is_strict() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let op = InProgressOperation {
            name: "decide".to_string(),
            started_at: start,
        };
        let timeout = Duration::seconds(60);
        assert!(!op.is_expired(start + Duration::seconds(60), timeout));
        assert!(op.is_expired(start + Duration::seconds(61), timeout));
    }

    // ── Alert queries ────────────────────────────────────────────────────────

    #[test]
    fn alert_query_filters_are_conjunctive() {
        let alert = Alert {
            id: AlertId::new(),
            alert_type: AlertType::Pump,
            severity: AlertSeverity::Warning,
            title: "spike".to_string(),
            message: "volume up".to_string(),
            data: serde_json::Value::Null,
            timestamp: Utc::now(),
            acknowledged: true,
        };

        assert!(AlertQuery::default().matches(&alert));
        assert!(AlertQuery {
            alert_type: Some(AlertType::Pump),
            severity: Some(AlertSeverity::Warning),
            ..Default::default()
        }
        .matches(&alert));
        assert!(!AlertQuery {
            unacknowledged_only: true,
            ..Default::default()
        }
        .matches(&alert));
        assert!(!AlertQuery {
            alert_type: Some(AlertType::Rug),
            ..Default::default()
        }
        .matches(&alert));
    }

    #[test]
    fn alert_type_uses_snake_case() {
        let json = serde_json::to_string(&AlertType::FeeReminder).unwrap();
        assert_eq!(json, "\"fee_reminder\"");
    }

    // ── AgentId ──────────────────────────────────────────────────────────────

    #[test]
    fn agent_id_serializes_transparently() {
        let id = AgentId::new("finn");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"finn\"");
        assert_eq!(id.to_string(), "finn");
    }

    // ── HamletError display messages ─────────────────────────────────────────

    #[test]
    fn error_unknown_character_display() {
        let err = HamletError::UnknownCharacter {
            agent_id: "ghost".to_string(),
        };
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn error_task_failed_display() {
        let err = HamletError::TaskFailed {
            name: "market-scan".to_string(),
            reason: "upstream timeout".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("market-scan"));
        assert!(msg.contains("upstream timeout"));
    }

    #[test]
    fn error_config_display() {
        let err = HamletError::Config {
            reason: "batch_size must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
    }
}
