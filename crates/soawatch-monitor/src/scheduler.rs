//! Due-zone selection and next-due computation.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use soawatch_core::{schedule, Zone};
use std::collections::HashSet;
use std::time::Duration;

/// Default upper bound of scheduling jitter
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(250);

/// Picks due zones and spaces out their next checks
#[derive(Debug)]
pub struct Scheduler {
    max_jitter: Duration,
    rng: Mutex<StdRng>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JITTER)
    }
}

impl Scheduler {
    /// Scheduler with entropy-seeded jitter
    #[must_use]
    pub fn new(max_jitter: Duration) -> Self {
        Self {
            max_jitter,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Scheduler with reproducible jitter
    #[must_use]
    pub fn seeded(max_jitter: Duration, seed: u64) -> Self {
        Self {
            max_jitter,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Upper bound of the jitter added to each due time
    #[must_use]
    pub const fn max_jitter(&self) -> Duration {
        self.max_jitter
    }

    /// Keep zones that are due at `now`, each zone at most once.
    ///
    /// The store already filters; this guards against a store that returns
    /// stale rows or the same zone twice.
    #[must_use]
    pub fn select(&self, zones: Vec<Zone>, now: DateTime<Utc>) -> Vec<Zone> {
        let mut seen = HashSet::new();
        zones
            .into_iter()
            .filter(|z| z.is_due(now) && seen.insert(z.id.clone()))
            .collect()
    }

    /// `now + clamp(cadence, 1, 60)s + jitter`
    #[must_use]
    pub fn next_check_at(&self, now: DateTime<Utc>, cadence_seconds: i64) -> DateTime<Utc> {
        let jitter = schedule::jitter(&mut *self.rng.lock(), self.max_jitter);
        schedule::next_check_at(now, cadence_seconds, jitter)
    }
}
