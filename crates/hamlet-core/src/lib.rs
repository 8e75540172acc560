//! # hamlet-core
//!
//! Collaborator contracts and shared mechanisms for the hamlet runtime.
//!
//! This crate provides:
//! - The collaborator traits (`WorldSync`, `LanguageModel`, `Coordinator`,
//!   `InteractionSink`)
//! - `Clock` and `RandomSource`, injected everywhere time or chance matters
//! - The `RateLimiter` shared by every component that calls the model
//! - `BestEffortSinks`, the fire-and-forget boundary for interaction records
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hamlet_core::{rate_limit::RateLimiter, clock::SystemClock};
//!
//! let limiter = Arc::new(RateLimiter::new(&RateLimitConfig::default(), Arc::new(SystemClock)));
//! if limiter.try_acquire() { /* call the model */ }
//! ```

pub mod clock;
pub mod random;
pub mod rate_limit;
pub mod sink;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use random::{FixedRandom, RandomSource, SeededRandom};
pub use rate_limit::RateLimiter;
pub use sink::BestEffortSinks;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use hamlet_contracts::{
        agent::AgentId,
        config::RateLimitConfig,
        decision::Emotion,
        error::{HamletError, HamletResult},
        message::InteractionRecord,
    };

    use super::*;
    use crate::traits::InteractionSink;

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn limiter(ceiling: u32, clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(
            &RateLimitConfig {
                max_calls_per_minute: ceiling,
            },
            clock,
        )
    }

    // ── RateLimiter ───────────────────────────────────────────────────────────

    /// Exactly `ceiling` calls succeed inside one window; the next one fails.
    #[test]
    fn test_ceiling_reached_within_window() {
        let clock = manual_clock();
        let limiter = limiter(15, clock.clone());

        for i in 0..15 {
            clock.advance(Duration::seconds(1));
            assert!(limiter.try_acquire(), "call {} should be granted", i + 1);
        }
        assert!(!limiter.try_acquire(), "16th call must be denied");
        assert_eq!(limiter.remaining(), 0);
    }

    /// After a gap longer than 60 seconds the window restarts at the caller's
    /// `now` and the counter restarts at 1.
    #[test]
    fn test_window_resets_after_gap() {
        let clock = manual_clock();
        let limiter = limiter(15, clock.clone());

        for _ in 0..15 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());

        clock.advance(Duration::seconds(61));
        assert!(limiter.try_acquire());

        let window = limiter.window();
        assert_eq!(window.count, 1);
        assert_eq!(window.window_start, clock.now());
    }

    /// Exactly 60 seconds is still the same window.
    #[test]
    fn test_window_boundary_is_exclusive() {
        let clock = manual_clock();
        let limiter = limiter(1, clock.clone());

        assert!(limiter.try_acquire());
        clock.advance(Duration::seconds(60));
        assert!(!limiter.try_acquire());
        clock.advance(Duration::milliseconds(1));
        assert!(limiter.try_acquire());
    }

    /// A denied call does not touch the window.
    #[test]
    fn test_denied_call_does_not_mutate_window() {
        let clock = manual_clock();
        let limiter = limiter(2, clock.clone());

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        let before = limiter.window();

        assert!(!limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.window(), before);

        let stats = limiter.stats();
        assert_eq!(stats.granted, 2);
        assert_eq!(stats.denied, 2);
    }

    /// Many threads racing for the last slots never overshoot the ceiling.
    #[test]
    fn test_concurrent_acquire_never_overshoots() {
        let clock = manual_clock();
        let limiter = Arc::new(limiter(15, clock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || (0..10).filter(|_| limiter.try_acquire()).count())
            })
            .collect();

        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 15);
        assert_eq!(limiter.window().count, 15);
    }

    /// A zero ceiling denies everything.
    #[test]
    fn test_zero_ceiling_denies() {
        let limiter = limiter(0, manual_clock());
        assert!(!limiter.try_acquire());
    }

    // ── RandomSource ──────────────────────────────────────────────────────────

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::from_seed(42);
        let b = SeededRandom::from_seed(42);
        let xs: Vec<f64> = (0..5).map(|_| a.next_f64()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.next_f64()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_seeded_random_ranges() {
        let rng = SeededRandom::from_seed(7);
        for _ in 0..100 {
            let v = rng.range_inclusive(10, 20);
            assert!((10..=20).contains(&v));
            assert!(rng.next_below(3) < 3);
        }
        assert_eq!(rng.range_inclusive(5, 5), 5);
        assert_eq!(rng.next_below(0), 0);
    }

    #[test]
    fn test_fixed_random_forces_branches() {
        assert!(FixedRandom::always_pass().chance(0.1));
        assert!(!FixedRandom::always_fail().chance(0.99));
        assert_eq!(FixedRandom::always_fail().next_below(4), 3);
        assert_eq!(FixedRandom::always_pass().range_inclusive(100, 200), 100);
        assert_eq!(FixedRandom::always_fail().range_inclusive(100, 200), 200);
    }

    // ── ManualClock ───────────────────────────────────────────────────────────

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let clock = manual_clock();
        let start = clock.now();
        assert_eq!(clock.now(), start);
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now() - start, Duration::seconds(30));
    }

    // ── BestEffortSinks ───────────────────────────────────────────────────────

    struct FlakySink {
        fail: bool,
        seen: Arc<Mutex<Vec<InteractionRecord>>>,
    }

    #[async_trait]
    impl InteractionSink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn record(&self, interaction: &InteractionRecord) -> HamletResult<()> {
            self.seen.lock().unwrap().push(interaction.clone());
            if self.fail {
                Err(HamletError::Sink {
                    reason: "memory store offline".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    /// A failing sink neither fails the caller nor prevents other sinks from
    /// receiving the record.
    #[tokio::test]
    async fn test_sink_failures_are_swallowed() {
        let good = Arc::new(Mutex::new(Vec::new()));
        let bad = Arc::new(Mutex::new(Vec::new()));

        let mut sinks = BestEffortSinks::new();
        sinks.push(Arc::new(FlakySink { fail: true, seen: bad.clone() }));
        sinks.push(Arc::new(FlakySink { fail: false, seen: good.clone() }));

        sinks.offer(InteractionRecord {
            speaker: AgentId::new("finn"),
            listener: AgentId::new("ghost"),
            message: "hello".to_string(),
            emotion: Emotion::Happy,
            significant: false,
            at: Utc::now(),
        });

        for _ in 0..50 {
            if good.lock().unwrap().len() == 1 && bad.lock().unwrap().len() == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(good.lock().unwrap().len(), 1);
        assert_eq!(bad.lock().unwrap().len(), 1);
    }
}
