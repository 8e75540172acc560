//! # hamlet-ref-town
//!
//! Reference town for the hamlet agent runtime.
//!
//! Provides in-memory implementations of every collaborator the runtime talks
//! to, a small fictional town to run them in, and two end-to-end scenarios:
//!
//! 1. **Town Square**: the agent tick engine deciding for the whole cast over
//!    a number of cycles, with a scripted language model, an urgent inbox
//!    notice, and deduplicated model speech.
//! 2. **Market Watch**: the task runner polling a mock market feed into the
//!    alert store, posting deduplicated summaries, and retrying a health
//!    check that never succeeds.
//!
//! All data is hardcoded and fictional. No external calls are made.

pub mod coordinator;
pub mod model;
pub mod scenarios;
pub mod sink;
pub mod town;
pub mod world;

pub use coordinator::InMemoryCoordinator;
pub use model::ScriptedModel;
pub use sink::RecordingSink;
pub use world::InMemoryWorld;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use hamlet_contracts::{
        agent::AgentId,
        alert::{AlertSeverity, AlertType},
        decision::Emotion,
        error::HamletError,
        message::{ChatMessage, GenerateRequest, InteractionRecord, MessagePriority},
        world::{ActivityUpdate, Position},
    };
    use hamlet_core::{
        clock::{Clock, ManualClock},
        random::FixedRandom,
        traits::{Coordinator, InteractionSink, LanguageModel, WorldSync},
    };

    use super::*;
    use crate::{
        scenarios::{market_watch, town_square},
        town::{canned_replies, default_town, default_zones, market_script, MarketTick, Zone},
    };

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn world(clock: Arc<ManualClock>, roll: f64) -> InMemoryWorld {
        InMemoryWorld::new(default_zones(), "main_city", clock, Arc::new(FixedRandom(roll)))
    }

    fn id(s: &str) -> AgentId {
        AgentId::new(s)
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            system_prompt: "You are Finn.".to_string(),
            user_prompt: "You are in harbor.".to_string(),
            history: Vec::<ChatMessage>::new(),
            tools: None,
            max_tokens: 50,
        }
    }

    // ── Town data ─────────────────────────────────────────────────────────────

    #[test]
    fn test_default_town_is_valid() {
        let town = default_town().unwrap();
        assert_eq!(town.characters.len(), 5);
        assert_eq!(town.activities.len(), 4);

        let zone_names: Vec<String> = default_zones().into_iter().map(|z| z.name).collect();
        assert_eq!(town.parser.zones, zone_names);
        for character in &town.characters {
            assert!(zone_names.contains(&character.preferred_zone));
        }
    }

    #[test]
    fn test_zone_geometry() {
        let zone = Zone::new("park", (100.0, 0.0), (200.0, 100.0));
        assert_eq!(zone.center(), Position { x: 150.0, y: 50.0 });
        assert!(zone.contains(Position { x: 100.0, y: 100.0 }));
        assert!(!zone.contains(Position { x: 99.9, y: 50.0 }));
        assert_eq!(zone.point_at(0.0, 1.0), Position { x: 100.0, y: 100.0 });
        assert_eq!(zone.point_at(2.0, -1.0), Position { x: 200.0, y: 0.0 });
    }

    #[test]
    fn test_market_tick_classification() {
        let cases = [
            (0.0, true, Some((AlertType::Launch, AlertSeverity::Info))),
            (-95.0, false, Some((AlertType::Rug, AlertSeverity::Critical))),
            (-30.0, false, Some((AlertType::Dump, AlertSeverity::Warning))),
            (150.0, false, Some((AlertType::Pump, AlertSeverity::Critical))),
            (30.0, false, Some((AlertType::Pump, AlertSeverity::Warning))),
            (12.0, false, None),
        ];
        for (change_pct, new_listing, expected) in cases {
            let tick = MarketTick {
                symbol: "HAM".to_string(),
                change_pct,
                new_listing,
            };
            assert_eq!(tick.classify(), expected, "change {}", change_pct);
        }
        assert_eq!(market_script().len(), 5);
    }

    // ── InMemoryWorld ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_registration_places_at_zone_center() {
        let world = world(clock(), 0.5);
        world.register_agent(&id("sage"), "park").await.unwrap();
        world.register_agent(&id("ghost"), "nowhere").await.unwrap();

        assert_eq!(world.position_of(&id("sage")), Some(Position { x: 150.0, y: 50.0 }));
        assert_eq!(world.zone_of(&id("ghost")).as_deref(), Some("main_city"));

        // Re-registering keeps the current position.
        world.place_agent(&id("sage"), Position { x: 10.0, y: 10.0 });
        world.register_agent(&id("sage"), "park").await.unwrap();
        assert_eq!(world.position_of(&id("sage")), Some(Position { x: 10.0, y: 10.0 }));
    }

    #[tokio::test]
    async fn test_snapshot_lists_nearby_closest_first() {
        let world = world(clock(), 0.5).with_nearby_radius(10.0);
        world.place_agent(&id("finn"), Position { x: 50.0, y: 150.0 });
        world.place_agent(&id("marlowe"), Position { x: 58.0, y: 150.0 });
        world.place_agent(&id("sage"), Position { x: 53.0, y: 150.0 });
        world.place_agent(&id("wren"), Position { x: 70.0, y: 150.0 });

        let snapshot = world.get_agent_state(&id("finn")).await.unwrap().unwrap();
        assert_eq!(snapshot.zone, "harbor");
        assert_eq!(snapshot.nearby_agents, vec![id("sage"), id("marlowe")]);
        assert!(!snapshot.is_moving);

        assert!(world.get_agent_state(&id("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_move_and_approach() {
        let world = world(clock(), 0.5);
        world.place_agent(&id("finn"), Position { x: 50.0, y: 150.0 });
        world.place_agent(&id("sage"), Position { x: 150.0, y: 50.0 });

        world.send_move(&id("finn"), 120.0, 120.0).await.unwrap();
        assert_eq!(world.zone_of(&id("finn")).as_deref(), Some("market_square"));

        world.send_approach(&id("finn"), &id("sage")).await.unwrap();
        let snapshot = world.get_agent_state(&id("finn")).await.unwrap().unwrap();
        assert_eq!(snapshot.nearby_agents, vec![id("sage")]);

        assert!(matches!(
            world.send_approach(&id("finn"), &id("nobody")).await,
            Err(HamletError::WorldSync { .. })
        ));
        assert!(world.send_move(&id("nobody"), 0.0, 0.0).await.is_err());
    }

    #[tokio::test]
    async fn test_activity_and_conversation_times() {
        let clock = clock();
        let world = world(clock.clone(), 0.5);
        world.place_agent(&id("wren"), Position { x: 10.0, y: 10.0 });

        let until = clock.now() + Duration::seconds(30);
        world
            .update_agent_activity(
                &id("wren"),
                ActivityUpdate {
                    description: "reading".to_string(),
                    emoji: "📖".to_string(),
                    until,
                },
            )
            .await
            .unwrap();
        world.record_conversation_end(&id("wren")).await.unwrap();

        let snapshot = world.get_agent_state(&id("wren")).await.unwrap().unwrap();
        assert!(snapshot.is_mid_activity(clock.now()));
        assert_eq!(snapshot.last_activity_at, Some(clock.now()));
        assert_eq!(snapshot.last_conversation_at, Some(clock.now()));
        assert_eq!(world.activity_emoji(&id("wren")).as_deref(), Some("📖"));

        clock.advance(Duration::seconds(31));
        assert!(world.activity_emoji(&id("wren")).is_none());
    }

    #[tokio::test]
    async fn test_wander_destination_stays_in_zone() {
        let world = world(clock(), 0.25);
        let harbor = world.get_wander_destination("harbor").await.unwrap();
        assert_eq!(harbor, Position { x: 25.0, y: 125.0 });

        // Unknown zones fall back to the default zone.
        let fallback = world.get_wander_destination("moon").await.unwrap();
        assert_eq!(fallback, Position { x: 25.0, y: 25.0 });

        let empty = InMemoryWorld::new(Vec::new(), "main_city", clock(), Arc::new(FixedRandom(0.5)));
        assert!(empty.get_wander_destination("harbor").await.is_err());
    }

    #[tokio::test]
    async fn test_speech_log_and_clients() {
        let world = world(clock(), 0.5);
        world.place_agent(&id("finn"), Position { x: 1.0, y: 1.0 });

        world.send_speak(&id("finn"), "Ahoy!", Emotion::Happy).await.unwrap();
        assert!(world.send_speak(&id("nobody"), "hi", Emotion::Neutral).await.is_err());

        let log = world.speech_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "Ahoy!");
        assert_eq!(log[0].emotion, Emotion::Happy);

        assert_eq!(world.get_client_count().await.unwrap(), 0);
        world.set_client_count(3);
        assert_eq!(world.get_client_count().await.unwrap(), 3);

        assert!(world.set_moving(&id("finn"), true));
        assert!(world.get_agent_state(&id("finn")).await.unwrap().unwrap().is_moving);
        assert!(!world.set_moving(&id("nobody"), true));
    }

    // ── ScriptedModel ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_scripted_model_cycles_and_fails_on_demand() {
        let model = ScriptedModel::new(vec!["IDLE".to_string(), "APPROACH finn".to_string()]);
        let replies: Vec<String> = [
            model.generate(request()).await.unwrap().text,
            model.generate(request()).await.unwrap().text,
            model.generate(request()).await.unwrap().text,
        ]
        .into();
        assert_eq!(replies, vec!["IDLE", "APPROACH finn", "IDLE"]);

        model.set_failing(true);
        assert!(matches!(
            model.generate(request()).await,
            Err(HamletError::Model { .. })
        ));
        assert_eq!(model.calls(), 4);
        assert_eq!(model.requests()[0].system_prompt, "You are Finn.");

        let silent = ScriptedModel::new(Vec::new());
        assert!(silent.generate(request()).await.is_err());
        assert!(!canned_replies().is_empty());
    }

    // ── InMemoryCoordinator ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_inbox_drains_oldest_first() {
        let coordinator = InMemoryCoordinator::new(clock());
        for n in 1..=3 {
            coordinator.send(
                &id("mayor"),
                &id("wren"),
                "chat",
                &format!("message {}", n),
                MessagePriority::Normal,
            );
        }

        let first = coordinator.get_messages(&id("wren"), 2).await.unwrap();
        let contents: Vec<&str> = first.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 1", "message 2"]);
        assert_eq!(coordinator.pending(&id("wren")), 1);

        let rest = coordinator.get_messages(&id("wren"), 10).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert!(coordinator.get_messages(&id("wren"), 10).await.unwrap().is_empty());
        assert!(coordinator.get_messages(&id("finn"), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_broadcast_and_alert_logs() {
        let clock = clock();
        let coordinator = InMemoryCoordinator::new(clock.clone());

        coordinator
            .set_shared_context("agent:finn:last_decision", json!({ "decision": "idle" }))
            .await
            .unwrap();
        coordinator
            .set_shared_context("agent:finn:last_decision", json!({ "decision": "wander" }))
            .await
            .unwrap();
        assert_eq!(
            coordinator.context("agent:finn:last_decision"),
            Some(json!({ "decision": "wander" }))
        );
        assert_eq!(coordinator.context_keys().len(), 1);

        coordinator
            .broadcast(&id("finn"), "speech", "Ahoy!", json!({}))
            .await
            .unwrap();
        coordinator
            .alert("market-scan", "HAM +120%", json!({ "symbol": "HAM" }))
            .await
            .unwrap();

        let broadcasts = coordinator.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].kind, "speech");
        assert_eq!(broadcasts[0].at, clock.now());
        assert_eq!(coordinator.alerts()[0].source, "market-scan");
    }

    // ── RecordingSink ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_recording_sink_filters_by_listener() {
        let sink = RecordingSink::new("memories");
        assert!(sink.is_empty());
        for listener in ["sage", "wren", "sage"] {
            sink.record(&InteractionRecord {
                speaker: id("finn"),
                listener: id(listener),
                message: "Ahoy!".to_string(),
                emotion: Emotion::Happy,
                significant: false,
                at: Utc::now(),
            })
            .await
            .unwrap();
        }
        assert_eq!(sink.name(), "memories");
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.heard_by(&id("sage")).len(), 2);
        assert_eq!(sink.records()[1].listener, id("wren"));
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    /// Every agent is accounted for in every cycle, the urgent notice is
    /// relayed exactly once, and nothing fails.
    #[tokio::test]
    async fn test_town_square_end_to_end() {
        let summary = town_square::run_scenario(6, 7).await.unwrap();

        assert_eq!(summary.cycles, 6);
        assert_eq!(summary.agents, 5);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.total_decisions() + summary.skipped, 5 * 6);
        assert_eq!(summary.decisions_by_source.get("inbox"), Some(&1));
        assert!(summary.broadcasts >= 1);
        assert!(summary.spoken_lines >= 1);
        assert_eq!(summary.shared_context_keys, 5);
        assert!(summary.model_calls <= 6, "rate limiter caps model calls per minute");
    }

    #[tokio::test]
    async fn test_town_square_is_reproducible() {
        let a = town_square::run_scenario(5, 42).await.unwrap();
        let b = town_square::run_scenario(5, 42).await.unwrap();
        assert_eq!(a.decisions_by_kind, b.decisions_by_kind);
        assert_eq!(a.decisions_by_source, b.decisions_by_source);
        assert_eq!(a.model_calls, b.model_calls);
        assert_eq!(a.skipped, b.skipped);
    }

    #[tokio::test]
    async fn test_market_watch_end_to_end() {
        let summary = market_watch::run_scenario().await.unwrap();

        assert_eq!(summary.sweeps, market_watch::SWEEPS);
        // Six scans, four scheduled posts, five failed health checks.
        assert_eq!(summary.task_runs, 15);
        assert_eq!(summary.task_failures, 5);

        assert_eq!(summary.alerts_stored, 6);
        assert_eq!(summary.critical_alerts, 2);
        assert_eq!(summary.coordinator_alerts, 2);

        assert_eq!(summary.posts_published, 4);
        // The manual trigger repeats the last post and is suppressed.
        assert_eq!(summary.posts_suppressed, 1);
        assert!(summary.manual_trigger_ok);

        // Failed sweeps retry after half the 120s interval.
        assert_eq!(summary.health_retry_ms, 60_000);
    }
}
