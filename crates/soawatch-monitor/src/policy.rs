//! What happens when a store operation fails.

use serde::{Deserialize, Serialize};
use soawatch_core::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

use crate::clock::Clock;

/// Action once retries are exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnWriteFailure {
    /// Log with zone context, record a warning on the zone's result, carry on
    #[default]
    Continue,
    /// Stop the zone's round and report it as an error
    AbortZone,
}

/// Retry and failure handling for store operations made during a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePolicy {
    /// Total attempts per operation, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Backoff before the first retry
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on any backoff
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// What to do when every attempt failed
    #[serde(default)]
    pub on_failure: OnWriteFailure,
}

const fn default_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    2000
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            on_failure: OnWriteFailure::default(),
        }
    }
}

impl WritePolicy {
    /// Single attempt, then continue
    #[must_use]
    pub const fn best_effort() -> Self {
        Self {
            attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            on_failure: OnWriteFailure::Continue,
        }
    }

    /// Set the failure action
    #[must_use]
    pub const fn on_failure(mut self, action: OnWriteFailure) -> Self {
        self.on_failure = action;
        self
    }

    /// Set the attempt count
    #[must_use]
    pub const fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Backoff before retry number `attempt` (0-based), doubling and capped
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let backoff = self
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(backoff.min(self.max_backoff_ms))
    }

    /// Run `op`, retrying retryable errors with backoff on `clock`.
    ///
    /// `zone` and `what` only label the log lines.
    pub async fn run<T, F, Fut>(&self, clock: &dyn Clock, zone: &str, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < attempts && e.is_retryable() => {
                    warn!(zone, what, attempt = attempt + 1, error = %e, "store operation failed, retrying");
                    clock.sleep(self.backoff_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(zone, what, attempts = attempt + 1, error = %e, "store operation failed");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Utc;
    use soawatch_core::WatchError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = WritePolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(1600));
        assert_eq!(policy.backoff_for(5), Duration::from_millis(2000));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let clock = ManualClock::new(Utc::now());
        let calls = &AtomicU32::new(0);
        let result = WritePolicy::default()
            .run(&clock, "example.com", "append check", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(WatchError::Store("locked".into()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn gives_up_after_attempts() {
        let clock = ManualClock::new(Utc::now());
        let calls = &AtomicU32::new(0);
        let result: Result<()> = WritePolicy::default()
            .attempts(2)
            .run(&clock, "example.com", "schedule", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WatchError::Store("down".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_fails_immediately() {
        let clock = ManualClock::new(Utc::now());
        let calls = &AtomicU32::new(0);
        let result: Result<()> = WritePolicy::default()
            .run(&clock, "example.com", "schedule", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WatchError::Config("bad".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn parses_from_toml() {
        let policy: WritePolicy = toml::from_str("attempts = 5\non_failure = \"abort-zone\"").unwrap();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.on_failure, OnWriteFailure::AbortZone);
        assert_eq!(policy.initial_backoff_ms, 100);
    }
}
