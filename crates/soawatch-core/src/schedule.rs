//! Cadence clamping and jittered due times.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// Shortest permitted cadence
pub const MIN_CADENCE_SECS: u32 = 1;

/// Longest permitted cadence
pub const MAX_CADENCE_SECS: u32 = 60;

/// Clamp a stored cadence into `[MIN_CADENCE_SECS, MAX_CADENCE_SECS]`.
#[must_use]
pub fn clamp_cadence(cadence_seconds: i64) -> u32 {
    let clamped = cadence_seconds.clamp(i64::from(MIN_CADENCE_SECS), i64::from(MAX_CADENCE_SECS));
    u32::try_from(clamped).unwrap_or(MAX_CADENCE_SECS)
}

/// Uniform jitter in `[0, max)` at millisecond resolution; zero when `max` is
/// below one millisecond.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.gen_range(0..max_ms))
}

/// Next due time: `now + clamp(cadence) + jitter`.
#[must_use]
pub fn next_check_at(now: DateTime<Utc>, cadence_seconds: i64, jitter: Duration) -> DateTime<Utc> {
    let cadence = chrono::Duration::seconds(i64::from(clamp_cadence(cadence_seconds)));
    let jitter = chrono::Duration::from_std(jitter).unwrap_or_else(|_| chrono::Duration::zero());
    now + cadence + jitter
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clamps_out_of_range_cadence() {
        assert_eq!(clamp_cadence(0), 1);
        assert_eq!(clamp_cadence(-30), 1);
        assert_eq!(clamp_cadence(1), 1);
        assert_eq!(clamp_cadence(30), 30);
        assert_eq!(clamp_cadence(60), 60);
        assert_eq!(clamp_cadence(3600), 60);
        assert_eq!(clamp_cadence(i64::MAX), 60);
    }

    #[test]
    fn jitter_stays_below_max() {
        let mut rng = StdRng::seed_from_u64(7);
        let max = Duration::from_millis(250);
        for _ in 0..10_000 {
            assert!(jitter(&mut rng, max) < max);
        }
    }

    #[test]
    fn zero_max_means_no_jitter() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(jitter(&mut rng, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn next_check_uses_clamped_cadence() {
        let now = Utc::now();
        let next = next_check_at(now, 500, Duration::from_millis(120));
        assert_eq!(next - now, chrono::Duration::milliseconds(60_120));

        let next = next_check_at(now, 0, Duration::ZERO);
        assert_eq!(next - now, chrono::Duration::seconds(1));
    }

    #[test]
    fn due_time_always_moves_forward() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut now = Utc::now();
        for cadence in [-5, 0, 1, 15, 60, 90] {
            let next = next_check_at(now, cadence, jitter(&mut rng, Duration::from_millis(250)));
            assert!(next > now);
            now = next;
        }
    }
}
