//! Scenario 2: Market Watch
//!
//! Marlowe keeps an eye on the market through three scheduled tasks that run
//! independently of the agent tick:
//!
//!   - `market-scan`   polls the mock feed and files alerts in the alert store;
//!                     critical ones are also raised through the coordinator
//!   - `social-post`   summarizes the newest alert as a post, suppressing
//!                     near-duplicates with the dedup store
//!   - `health-check`  pings a price oracle that is always down, to show the
//!                     half-interval retry
//!
//! The clock advances one sweep interval at a time and the sweep is run by
//! hand, so the schedule is fully deterministic.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use hamlet_alerts::{AlertStore, DedupStore};
use hamlet_contracts::{
    agent::AgentId,
    alert::{AlertQuery, AlertSeverity},
    error::{HamletError, HamletResult},
    task::TaskTrigger,
};
use hamlet_core::{
    clock::{Clock, ManualClock},
    traits::Coordinator,
};
use hamlet_scheduler::{task_fn, TaskRunner, TaskSpec};

use crate::{
    coordinator::InMemoryCoordinator,
    town::{default_town, market_script, MarketTick},
};

pub const WATCHER: &str = "marlowe";
pub const SCAN_TASK: &str = "market-scan";
pub const POST_TASK: &str = "social-post";
pub const HEALTH_TASK: &str = "health-check";

const SCAN_INTERVAL_MS: u64 = 60_000;
const POST_INTERVAL_MS: u64 = 90_000;
const HEALTH_INTERVAL_MS: u64 = 120_000;

/// Sweeps performed per run.
pub const SWEEPS: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct MarketWatchSummary {
    pub sweeps: usize,
    pub task_runs: usize,
    pub task_failures: usize,
    pub alerts_stored: usize,
    pub critical_alerts: usize,
    pub coordinator_alerts: usize,
    pub posts_published: usize,
    pub posts_suppressed: usize,
    pub manual_trigger_ok: bool,
    /// Milliseconds between the health check's last failure and its retry.
    pub health_retry_ms: i64,
}

/// Replays the market script one scan at a time.
struct MarketFeed {
    script: Vec<Vec<MarketTick>>,
    scans: usize,
}

impl MarketFeed {
    fn next_scan(&mut self) -> Vec<MarketTick> {
        let scan = self.script.get(self.scans).cloned().unwrap_or_default();
        self.scans += 1;
        scan
    }
}

/// Run Scenario 2: Market Watch.
pub async fn run_scenario() -> HamletResult<MarketWatchSummary> {
    println!("=== Scenario 2: Market Watch ===");
    println!();

    // ── Wire up the components ────────────────────────────────────────────────

    let town = default_town()?;
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    ));

    let alerts = Arc::new(AlertStore::new(&town.alerts, clock.clone()));
    let dedup = Arc::new(DedupStore::new(&town.dedup));
    let coordinator = Arc::new(InMemoryCoordinator::new(clock.clone()));
    let runner = TaskRunner::new(town.scheduler.clone(), clock.clone());

    let feed = Arc::new(Mutex::new(MarketFeed {
        script: market_script(),
        scans: 0,
    }));

    // ── Register the tasks ────────────────────────────────────────────────────

    let scan = {
        let feed = Arc::clone(&feed);
        let alerts = Arc::clone(&alerts);
        let coordinator = Arc::clone(&coordinator);
        task_fn(move || {
            let feed = Arc::clone(&feed);
            let alerts = Arc::clone(&alerts);
            let coordinator = Arc::clone(&coordinator);
            async move { scan_market(&feed, &alerts, coordinator.as_ref()).await }
        })
    };

    let poster = Arc::new(Poster {
        alerts: Arc::clone(&alerts),
        dedup: Arc::clone(&dedup),
        coordinator: Arc::clone(&coordinator),
        published: AtomicUsize::new(0),
        suppressed: AtomicUsize::new(0),
    });
    let post = {
        let poster = Arc::clone(&poster);
        task_fn(move || {
            let poster = Arc::clone(&poster);
            async move { poster.post().await }
        })
    };

    let health = task_fn(ping_price_oracle);

    runner.register_task(TaskSpec::new(SCAN_TASK, WATCHER, SCAN_INTERVAL_MS, scan));
    runner.register_task(TaskSpec::new(POST_TASK, WATCHER, POST_INTERVAL_MS, post));
    let health_id =
        runner.register_task(TaskSpec::new(HEALTH_TASK, WATCHER, HEALTH_INTERVAL_MS, health));

    for task in runner.list_tasks() {
        println!(
            "  Task {:<13} every {:>4}s for {}",
            task.name,
            task.interval_ms / 1000,
            task.agent_id
        );
    }
    println!();

    // ── Sweep ─────────────────────────────────────────────────────────────────

    let step = Duration::milliseconds(
        i64::try_from(town.scheduler.sweep_interval_ms).unwrap_or(i64::MAX),
    );
    let mut summary = MarketWatchSummary {
        sweeps: SWEEPS,
        ..Default::default()
    };

    for sweep in 1..=SWEEPS {
        clock.advance(step);
        let report = runner.run_sweep().await;
        summary.task_runs += report.ran;
        summary.task_failures += report.failed;
        if report.ran > 0 {
            println!(
                "  [sweep {:>2} @ {}] ran {}, ok {}, failed {}",
                sweep,
                clock.now().format("%H:%M:%S"),
                report.ran,
                report.succeeded,
                report.failed
            );
        }
    }

    // An operator asks for a post right now, outside the schedule.
    summary.manual_trigger_ok = runner.trigger_task(POST_TASK).await;

    if let Some(info) = runner.task(health_id) {
        let last_failure = runner
            .history(usize::MAX)
            .into_iter()
            .find(|r| r.task_id == health_id && r.trigger == TaskTrigger::Sweep)
            .map(|r| r.finished_at);
        if let Some(failed_at) = last_failure {
            summary.health_retry_ms = (info.next_run - failed_at).num_milliseconds();
        }
    }

    summary.alerts_stored = alerts.len();
    summary.critical_alerts = alerts
        .get_alerts(&AlertQuery {
            severity: Some(AlertSeverity::Critical),
            ..Default::default()
        })
        .len();
    summary.coordinator_alerts = coordinator.alerts().len();
    summary.posts_published = poster.published.load(Ordering::SeqCst);
    summary.posts_suppressed = poster.suppressed.load(Ordering::SeqCst);

    // ── Report ────────────────────────────────────────────────────────────────

    println!();
    println!("  Newest alerts:");
    for alert in alerts.get_alerts(&AlertQuery {
        limit: Some(5),
        ..Default::default()
    }) {
        println!("    {:<8} {}", format!("{:?}", alert.severity), alert.title);
    }
    println!();
    println!("  Alerts stored:         {}", summary.alerts_stored);
    println!("  Critical (raised):     {} ({})", summary.critical_alerts, summary.coordinator_alerts);
    println!(
        "  Posts:                 {} published, {} suppressed as duplicates",
        summary.posts_published, summary.posts_suppressed
    );
    println!("  Task runs / failures:  {} / {}", summary.task_runs, summary.task_failures);
    println!(
        "  Health check retry in: {}s (interval {}s)",
        summary.health_retry_ms / 1000,
        HEALTH_INTERVAL_MS / 1000
    );
    println!(
        "  Manual post trigger:   {}",
        if summary.manual_trigger_ok { "OK" } else { "FAILED" }
    );
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(summary)
}

async fn scan_market(
    feed: &Mutex<MarketFeed>,
    alerts: &AlertStore,
    coordinator: &dyn Coordinator,
) -> HamletResult<()> {
    let ticks = feed.lock().expect("market feed lock poisoned").next_scan();

    for tick in ticks {
        let Some((alert_type, severity)) = tick.classify() else {
            continue;
        };
        let title = if tick.new_listing {
            format!("{} listed", tick.symbol)
        } else {
            format!("{} {:+.0}%", tick.symbol, tick.change_pct)
        };
        let data = json!({ "symbol": tick.symbol, "change_pct": tick.change_pct });
        let alert = alerts.create_alert(
            alert_type,
            severity,
            title.clone(),
            format!("seen by {} on the market feed", WATCHER),
            data.clone(),
        );
        if alert.severity == AlertSeverity::Critical {
            coordinator.alert(SCAN_TASK, &title, data).await?;
        }
    }
    Ok(())
}

/// Publishes the newest alert as a social post, once per distinct text.
struct Poster {
    alerts: Arc<AlertStore>,
    dedup: Arc<DedupStore>,
    coordinator: Arc<InMemoryCoordinator>,
    published: AtomicUsize,
    suppressed: AtomicUsize,
}

impl Poster {
    async fn post(&self) -> HamletResult<()> {
        let Some(text) = compose_post(&self.alerts) else {
            return Ok(());
        };
        if self.dedup.check_and_remember(&text) {
            self.suppressed.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }
        self.coordinator
            .broadcast(&AgentId::new(WATCHER), "social_post", &text, json!({}))
            .await?;
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn ping_price_oracle() -> HamletResult<()> {
    Err(HamletError::WorldSync {
        reason: "price oracle unreachable".to_string(),
    })
}

/// A post about the newest alert, if there is one.
fn compose_post(alerts: &AlertStore) -> Option<String> {
    let newest = alerts
        .get_alerts(&AlertQuery {
            limit: Some(1),
            ..Default::default()
        })
        .into_iter()
        .next()?;
    Some(format!("Market news from the square: {}!", newest.title))
}
