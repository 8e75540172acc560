//! hamlet Reference Town: Demo CLI
//!
//! Runs one or all of the reference town scenarios, or feeds a single line of
//! model output through the decision parser.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- town-square --cycles 12 --seed 7
//!   cargo run -p demo -- market-watch
//!   cargo run -p demo -- parse 'SPEAK "Morning, Finn!"' --zone harbor --nearby finn,sage

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hamlet_contracts::{agent::AgentId, error::HamletResult, world::WorldSnapshot};
use hamlet_core::random::SeededRandom;
use hamlet_parser::DecisionParser;
use hamlet_ref_town::{
    scenarios::{market_watch, town_square},
    town::default_town,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// hamlet: a tick-driven town of autonomous agents.
///
/// Each subcommand runs the real engine, task runner, and stores against the
/// in-memory reference town.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "hamlet reference town demo",
    long_about = "Runs hamlet reference town scenarios showing rule and model-assisted\n\
                  agent decisions, scheduled tasks, alerts, and deduplication."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run both scenarios in sequence with their default settings.
    RunAll,
    /// Scenario 1: the whole cast over a number of tick cycles.
    TownSquare {
        /// Number of tick cycles to run.
        #[arg(long, default_value_t = 12)]
        cycles: usize,
        /// Seed for every random roll, so runs are reproducible.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// Scenario 2: scheduled market scans, posts, and a failing health check.
    MarketWatch,
    /// Parse one line of model output into a decision.
    Parse {
        /// The raw model reply.
        text: String,
        /// Zone the deciding agent is in.
        #[arg(long)]
        zone: Option<String>,
        /// Comma-separated nearby agent ids, closest first.
        #[arg(long, value_delimiter = ',')]
        nearby: Vec<String>,
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all().await
        }
        Command::TownSquare { cycles, seed } => {
            print_banner();
            town_square::run_scenario(cycles, seed).await.map(|_| ())
        }
        Command::MarketWatch => {
            print_banner();
            market_watch::run_scenario().await.map(|_| ())
        }
        Command::Parse {
            text,
            zone,
            nearby,
            seed,
        } => parse_once(&text, zone, nearby, seed),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

async fn run_all() -> HamletResult<()> {
    town_square::run_scenario(12, 7).await?;
    market_watch::run_scenario().await?;
    println!("All scenarios completed successfully.");
    Ok(())
}

fn parse_once(text: &str, zone: Option<String>, nearby: Vec<String>, seed: u64) -> HamletResult<()> {
    let town = default_town()?;
    let parser = DecisionParser::new(town.parser, Arc::new(SeededRandom::from_seed(seed)));

    let snapshot = zone.map(|zone| {
        let mut snapshot = WorldSnapshot::idle_in(zone);
        snapshot.nearby_agents = nearby
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(AgentId::new)
            .collect();
        snapshot
    });

    let decision = parser.parse(text, snapshot.as_ref());
    println!("  Input:    {}", text);
    println!("  Decision: {}", decision.kind());
    match serde_json::to_string_pretty(&decision) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("  (could not render decision: {})", e),
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("hamlet: Autonomous Agent Town Runtime");
    println!("Reference Town Demo");
    println!("======================================");
    println!();
    println!("Per agent, per tick:");
    println!("  [1] Claim the agent; skip it if busy, mid-activity, or walking");
    println!("  [2] Urgent inbox message → relayed as significant speech");
    println!("  [3] Company nearby → approach, or ask the model (rate limited)");
    println!("  [4] Otherwise start an activity, or wander (sometimes home)");
    println!("  [5] Execute against the world, record interactions, share context");
    println!();
}
