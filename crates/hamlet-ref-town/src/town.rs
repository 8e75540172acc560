//! The reference town's fixed data.
//!
//! Everything here is hardcoded and fictional: the cast and tunables come from
//! the embedded `towns/default.toml`, zone geometry and the canned model
//! replies are defined inline, and the market feed replays a fixed script.

use hamlet_config::TownConfig;
use hamlet_contracts::{
    alert::{AlertSeverity, AlertType},
    error::HamletResult,
    world::Position,
};
use serde::{Deserialize, Serialize};

/// Embedded configuration for the reference town.
pub const DEFAULT_TOWN_TOML: &str = include_str!("../towns/default.toml");

/// Parse and validate the embedded town configuration.
pub fn default_town() -> HamletResult<TownConfig> {
    TownConfig::from_toml_str(DEFAULT_TOWN_TOML)
}

// ── Zones ─────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub min: Position,
    pub max: Position,
}

impl Zone {
    pub fn new(name: impl Into<String>, min: (f64, f64), max: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            min: Position { x: min.0, y: min.1 },
            max: Position { x: max.0, y: max.1 },
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: Position) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }

    pub fn center(&self) -> Position {
        Position {
            x: (self.min.x + self.max.x) / 2.0,
            y: (self.min.y + self.max.y) / 2.0,
        }
    }

    /// The point at fractions `(fx, fy)` of the way across the zone.
    pub fn point_at(&self, fx: f64, fy: f64) -> Position {
        Position {
            x: self.min.x + (self.max.x - self.min.x) * fx.clamp(0.0, 1.0),
            y: self.min.y + (self.max.y - self.min.y) * fy.clamp(0.0, 1.0),
        }
    }
}

/// The four districts of the reference town, laid out on a 200 x 200 grid.
pub fn default_zones() -> Vec<Zone> {
    vec![
        Zone::new("main_city", (0.0, 0.0), (100.0, 100.0)),
        Zone::new("park", (100.0, 0.0), (200.0, 100.0)),
        Zone::new("harbor", (0.0, 100.0), (100.0, 200.0)),
        Zone::new("market_square", (100.0, 100.0), (200.0, 200.0)),
    ]
}

// ── Canned model replies ──────────────────────────────────────────────────────

/// Replies the scripted model cycles through. They exercise every branch of
/// the decision parser, including a reply with no recognizable action.
pub fn canned_replies() -> Vec<String> {
    [
        "SPEAK \"Lovely morning for it, isn't it?\"",
        "APPROACH finn",
        "ACTIVITY \"feeding the pigeons\"",
        "SPEAK \"Did you hear the bell ring at midnight?!\"",
        "WANDER market",
        "*stretches* SPEAK \"Lovely morning for it, isn't it?\"",
        "I think I'll just stand here a while.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ── Market feed (mock) ────────────────────────────────────────────────────────

/// One observation of a token on the mock market feed.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTick {
    pub symbol: String,
    /// Price change since the previous scan, in percent.
    pub change_pct: f64,
    /// True the first time a token is seen.
    pub new_listing: bool,
}

impl MarketTick {
    fn new(symbol: &str, change_pct: f64, new_listing: bool) -> Self {
        Self {
            symbol: symbol.to_string(),
            change_pct,
            new_listing,
        }
    }

    /// Map a tick to an alert, if it deserves one.
    ///
    /// | condition          | alert                  |
    /// |--------------------|------------------------|
    /// | new listing        | Launch, Info           |
    /// | change <= -90%     | Rug, Critical          |
    /// | change <= -30%     | Dump, Warning          |
    /// | change >= +100%    | Pump, Critical         |
    /// | change >= +30%     | Pump, Warning          |
    pub fn classify(&self) -> Option<(AlertType, AlertSeverity)> {
        if self.new_listing {
            return Some((AlertType::Launch, AlertSeverity::Info));
        }
        match self.change_pct {
            c if c <= -90.0 => Some((AlertType::Rug, AlertSeverity::Critical)),
            c if c <= -30.0 => Some((AlertType::Dump, AlertSeverity::Warning)),
            c if c >= 100.0 => Some((AlertType::Pump, AlertSeverity::Critical)),
            c if c >= 30.0 => Some((AlertType::Pump, AlertSeverity::Warning)),
            _ => None,
        }
    }
}

/// Successive scans of the mock feed. Scans past the end are quiet.
pub fn market_script() -> Vec<Vec<MarketTick>> {
    vec![
        vec![
            MarketTick::new("HAM", 0.0, true),
            MarketTick::new("BREAD", 2.5, false),
        ],
        vec![
            MarketTick::new("HAM", 45.0, false),
            MarketTick::new("BREAD", -1.0, false),
        ],
        vec![
            MarketTick::new("HAM", 120.0, false),
            MarketTick::new("CHEESE", 0.0, true),
        ],
        vec![
            MarketTick::new("HAM", -35.0, false),
            MarketTick::new("CHEESE", 8.0, false),
        ],
        vec![MarketTick::new("CHEESE", -95.0, false)],
    ]
}
