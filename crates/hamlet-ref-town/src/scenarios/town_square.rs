//! Scenario 1: Town Square
//!
//! The whole cast lives through `cycles` ticks of the agent tick engine.
//!
//! Walk-through for the demo run:
//!   1. The town configuration is loaded and validated from embedded TOML
//!   2. Every character is registered and placed in its preferred zone
//!   3. The mayor leaves an urgent notice in one agent's inbox
//!   4. Each cycle decides for every ready agent; the model is consulted
//!      under the shared rate limiter, repeated speech is deduplicated
//!   5. The clock advances one tick interval between cycles
//!   6. Totals per decision kind and source are reported at the end

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Duration, TimeZone, Utc};

use hamlet_alerts::DedupStore;
use hamlet_contracts::{
    agent::AgentId,
    decision::{Decision, DecisionSource},
    error::HamletResult,
    message::MessagePriority,
};
use hamlet_core::{
    clock::{Clock, ManualClock},
    random::SeededRandom,
    rate_limit::RateLimiter,
};
use hamlet_engine::{ActivityPool, AgentTickEngine, CharacterRoster};

use crate::{
    coordinator::InMemoryCoordinator,
    model::ScriptedModel,
    sink::RecordingSink,
    town::{canned_replies, default_town, default_zones},
    world::InMemoryWorld,
};

/// Who leaves the urgent notice, and for whom.
const MAYOR: &str = "mayor";
const NOTICE_RECIPIENT: &str = "wren";
const NOTICE: &str = "The harbor bell is ringing, everyone to the square!";

/// What one run of the scenario produced.
#[derive(Debug, Clone, Default)]
pub struct TownSquareSummary {
    pub cycles: usize,
    pub agents: usize,
    /// Executed decisions, keyed by kind ("speak", "wander", ...).
    pub decisions_by_kind: BTreeMap<&'static str, usize>,
    pub decisions_by_source: BTreeMap<&'static str, usize>,
    pub skipped: usize,
    pub failed: usize,
    pub model_calls: usize,
    pub spoken_lines: usize,
    pub broadcasts: usize,
    pub interactions_recorded: usize,
    pub shared_context_keys: usize,
}

impl TownSquareSummary {
    pub fn total_decisions(&self) -> usize {
        self.decisions_by_kind.values().sum()
    }
}

/// Run Scenario 1: Town Square.
///
/// The same `seed` always yields the same sequence of decisions.
pub async fn run_scenario(cycles: usize, seed: u64) -> HamletResult<TownSquareSummary> {
    println!("=== Scenario 1: Town Square ===");
    println!();

    // ── Wire up the components ────────────────────────────────────────────────

    let town = default_town()?;
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    ));

    let world = Arc::new(InMemoryWorld::new(
        default_zones(),
        town.parser.default_zone.clone(),
        clock.clone(),
        Arc::new(SeededRandom::from_seed(seed.wrapping_add(1))),
    ));
    world.set_client_count(1);

    let model = Arc::new(ScriptedModel::new(canned_replies()));
    let coordinator = Arc::new(InMemoryCoordinator::new(clock.clone()));
    let memories = Arc::new(RecordingSink::new("memories"));
    let limiter = Arc::new(RateLimiter::new(&town.rate_limit, clock.clone()));
    let dedup = Arc::new(DedupStore::new(&town.dedup));

    let engine = AgentTickEngine::builder(world.clone(), CharacterRoster::new(town.characters.clone()))
        .config(town.tick.clone())
        .parser_config(town.parser.clone())
        .model(model.clone())
        .coordinator(coordinator.clone())
        .sink(memories.clone())
        .limiter(limiter.clone())
        .activity_pool(ActivityPool::new(town.activities.clone()))
        .dedup(dedup)
        .random(Arc::new(SeededRandom::from_seed(seed)))
        .clock(clock.clone())
        .build();

    for character in &town.characters {
        engine.register_agent(AgentId::new(&character.id), None).await;
    }

    println!("  Cast:       {} characters", town.characters.len());
    println!("  Zones:      {}", town.parser.zones.join(", "));
    println!("  Model:      scripted, {} calls/minute", limiter.ceiling());
    println!("  Seed:       {}", seed);
    println!();

    coordinator.send(
        &AgentId::new(MAYOR),
        &AgentId::new(NOTICE_RECIPIENT),
        "notice",
        NOTICE,
        MessagePriority::Urgent,
    );

    // ── Run the cycles ────────────────────────────────────────────────────────

    let mut summary = TownSquareSummary {
        cycles,
        agents: town.characters.len(),
        ..Default::default()
    };
    let tick = Duration::milliseconds(i64::try_from(town.tick.interval_ms).unwrap_or(i64::MAX));

    for cycle in 1..=cycles {
        let report = engine.run_cycle().await;
        println!(
            "  [cycle {:>2} @ {}] decided {}, skipped {}, failed {}",
            cycle,
            report.started_at.format("%H:%M:%S"),
            report.decided.len(),
            report.skipped.len(),
            report.failed.len()
        );

        for outcome in &report.decided {
            println!(
                "      {:<8} {:<9} {}",
                outcome.agent_id,
                source_label(outcome.source),
                describe(&outcome.decision)
            );
            *summary
                .decisions_by_kind
                .entry(outcome.decision.kind())
                .or_default() += 1;
            *summary
                .decisions_by_source
                .entry(source_label(outcome.source))
                .or_default() += 1;
        }
        summary.skipped += report.skipped.len();
        summary.failed += report.failed.len();

        clock.advance(tick);
    }

    // Sink writes are detached; give them a moment to land.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    summary.model_calls = model.calls();
    summary.spoken_lines = world.speech_log().len();
    summary.broadcasts = coordinator.broadcasts().len();
    summary.interactions_recorded = memories.len();
    summary.shared_context_keys = coordinator.context_keys().len();

    // ── Report ────────────────────────────────────────────────────────────────

    println!();
    println!("  Decisions:             {}", summary.total_decisions());
    for (kind, count) in &summary.decisions_by_kind {
        println!("    {:<10} {}", kind, count);
    }
    println!(
        "  Inbox relays:          {}",
        summary
            .decisions_by_source
            .get(source_label(DecisionSource::Inbox))
            .copied()
            .unwrap_or(0)
    );
    println!("  Model calls:           {}", summary.model_calls);
    println!("  Lines spoken:          {}", summary.spoken_lines);
    println!("  Interactions recorded: {}", summary.interactions_recorded);
    println!("  Clock now:             {}", clock.now().format("%H:%M:%S"));
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(summary)
}

pub fn source_label(source: DecisionSource) -> &'static str {
    match source {
        DecisionSource::Inbox => "inbox",
        DecisionSource::Model => "model",
        DecisionSource::Rule => "rule",
        DecisionSource::Fallback => "fallback",
    }
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Wander { zone } => format!("wanders to {}", zone),
        Decision::Approach { target } => format!("approaches {}", target),
        Decision::Speak { message, emotion } => format!("says \"{}\" ({})", message, emotion),
        Decision::Activity {
            description, emoji, ..
        } => format!("{} {}", emoji, description),
        Decision::Idle => "idles".to_string(),
    }
}
