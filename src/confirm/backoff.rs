//! Exponential backoff schedule for confirmation polling.

use std::time::Duration;

use crate::error::{Error, Result};

/// Computes the wait before each successive poll attempt.
///
/// Attempt 0 waits for the base interval; every later attempt multiplies the
/// previous interval by the growth factor, saturating at the maximum
/// interval. Optional jitter perturbs the chosen interval by up to the
/// configured fraction in either direction, never below zero.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base: Duration,
    factor: f64,
    max: Duration,
    jitter: Option<f64>,
}

impl BackoffPolicy {
    /// Creates a policy. The base must be non-zero, the factor greater than
    /// one, and the maximum at least the base.
    pub fn new(base: Duration, factor: f64, max: Duration) -> Result<Self> {
        if base.is_zero() {
            return Err(Error::InvalidPolicy("base interval must be non-zero".into()));
        }
        if !(factor > 1.0) {
            return Err(Error::InvalidPolicy(format!(
                "growth factor must be > 1, got {factor}"
            )));
        }
        if max < base {
            return Err(Error::InvalidPolicy(
                "maximum interval must be >= base interval".into(),
            ));
        }
        Ok(Self {
            base,
            factor,
            max,
            jitter: None,
        })
    }

    /// Enables jitter as a fraction of the chosen interval, in `[0, 1]`.
    pub fn with_jitter(mut self, fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidPolicy(format!(
                "jitter fraction must be within [0, 1], got {fraction}"
            )));
        }
        self.jitter = Some(fraction);
        Ok(self)
    }

    /// The wait before the given attempt (0-indexed). Pure aside from
    /// jitter, which stays within the configured fraction of the interval.
    pub fn next_wait(&self, attempt: u32) -> Duration {
        let nominal = self.base.as_secs_f64() * self.factor.powf(f64::from(attempt));
        let capped = nominal.min(self.max.as_secs_f64());

        match self.jitter {
            Some(fraction) => {
                let spread = capped * fraction * (2.0 * jitter_unit() - 1.0);
                Duration::from_secs_f64((capped + spread).max(0.0))
            }
            None => Duration::from_secs_f64(capped),
        }
    }
}

impl Default for BackoffPolicy {
    /// One second, doubling, capped at ten seconds, no jitter.
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(10),
            jitter: None,
        }
    }
}

/// Pseudo-random value in `[0, 1)` without an external RNG dependency.
fn jitter_unit() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    f64::from(nanos % 1000) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_saturation() {
        let policy =
            BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10)).unwrap();
        assert_eq!(policy.next_wait(0), Duration::from_secs(1));
        assert_eq!(policy.next_wait(1), Duration::from_secs(2));
        assert_eq!(policy.next_wait(2), Duration::from_secs(4));
        assert_eq!(policy.next_wait(3), Duration::from_secs(8));
        assert_eq!(policy.next_wait(4), Duration::from_secs(10));
        assert_eq!(policy.next_wait(5), Duration::from_secs(10));
    }

    #[test]
    fn waits_are_non_decreasing_and_bounded() {
        let policy =
            BackoffPolicy::new(Duration::from_millis(250), 1.7, Duration::from_secs(30)).unwrap();
        let mut previous = Duration::ZERO;
        for attempt in 0..64 {
            let wait = policy.next_wait(attempt);
            assert!(wait >= previous, "wait shrank at attempt {attempt}");
            assert!(wait <= Duration::from_secs(30));
            previous = wait;
        }
    }

    #[test]
    fn huge_attempt_counts_saturate_instead_of_overflowing() {
        let policy =
            BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10)).unwrap();
        assert_eq!(policy.next_wait(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn jitter_stays_within_the_configured_fraction() {
        let policy = BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10))
            .unwrap()
            .with_jitter(0.25)
            .unwrap();
        for attempt in 0..8 {
            let nominal = 1.0_f64 * 2.0_f64.powf(f64::from(attempt)).min(10.0);
            let wait = policy.next_wait(attempt).as_secs_f64();
            assert!(wait >= nominal * 0.75 - 1e-9, "attempt {attempt}: {wait}");
            assert!(wait <= nominal * 1.25 + 1e-9, "attempt {attempt}: {wait}");
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(BackoffPolicy::new(Duration::ZERO, 2.0, Duration::from_secs(10)).is_err());
        assert!(BackoffPolicy::new(Duration::from_secs(1), 1.0, Duration::from_secs(10)).is_err());
        assert!(BackoffPolicy::new(Duration::from_secs(5), 2.0, Duration::from_secs(1)).is_err());
        assert!(
            BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10))
                .unwrap()
                .with_jitter(1.5)
                .is_err()
        );
    }
}
