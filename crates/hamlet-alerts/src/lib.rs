//! # hamlet-alerts
//!
//! Bounded, in-memory stores for operator-facing output.
//!
//! - [`AlertStore`]: a capped, insertion-ordered alert log. Queries filter by
//!   type, severity and acknowledgement and always return newest-first.
//! - [`DedupStore`]: a capped set of SHA-256 fingerprints of normalized
//!   content, used to suppress near-identical generated posts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hamlet_alerts::{AlertStore, DedupStore};
//!
//! let alerts = AlertStore::new(&AlertStoreConfig::default(), Arc::new(SystemClock));
//! alerts.create_alert(AlertType::Pump, AlertSeverity::Warning, "HAM +40%", "in 5 minutes", json!({}));
//!
//! let dedup = DedupStore::new(&DedupConfig::default());
//! if !dedup.check_and_remember(&post) { publish(&post); }
//! ```

pub mod dedup;
pub mod store;

pub use dedup::{fingerprint, normalize, DedupStore};
pub use store::AlertStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
