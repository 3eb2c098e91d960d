//! Backoff interval calculation.
//!
//! Two policies are available; a [`Backoff`] uses exactly one of them.
//!
//! - [`BackoffStrategy::FullJitter`] (default): the interval is `min << attempt`, clamped to
//!   `[min, max]`, and the delay is drawn uniformly from `[0, interval)`. A shift that overflows
//!   falls back to `min`.
//! - [`BackoffStrategy::Multiplicative`]: attempt `0` waits exactly `min`; later attempts wait
//!   `min * multiplier^attempt` capped at `max`, scaled by `1 + jitter * u` with `u` uniform in
//!   `[-1, 1]`, then clamped into `[0, max]`.
//!
//! Attempt semantics follow the retry loop: the first wait happens before attempt `2`, so the
//! loop never asks for attempt `0` or `1`. Both are still valid inputs here.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use tryloop::{backoff, Backoff};
//!
//! let delay = backoff(3, Duration::from_millis(8), Duration::from_millis(512));
//! assert!(delay < Duration::from_millis(64));
//!
//! assert_eq!(Backoff::disabled().delay(7), Duration::ZERO);
//! ```

use crate::jitter::Jitter;
use rand::{rng, Rng};
use std::time::Duration;

/// Default growth factor for [`BackoffStrategy::Multiplicative`].
pub const DEFAULT_MULTIPLIER: f64 = 1.6;

/// Default jitter factor for [`BackoffStrategy::Multiplicative`].
pub const DEFAULT_JITTER: f64 = 0.2;

/// Policy used to turn an attempt index into a delay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BackoffStrategy {
    /// Shift-based growth with full jitter.
    #[default]
    FullJitter,
    /// Multiplicative growth with symmetric jitter.
    Multiplicative { multiplier: f64, jitter: f64 },
}

impl BackoffStrategy {
    /// Multiplicative strategy with the default multiplier (1.6) and jitter (0.2).
    pub fn multiplicative() -> Self {
        BackoffStrategy::Multiplicative { multiplier: DEFAULT_MULTIPLIER, jitter: DEFAULT_JITTER }
    }
}

/// Backoff bounds plus the strategy applied between them.
///
/// A disabled backoff always yields a zero delay.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Backoff {
    bounds: Option<Bounds>,
    #[cfg_attr(feature = "serde", serde(default))]
    strategy: BackoffStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Bounds {
    min: Duration,
    max: Duration,
}

impl Backoff {
    /// Full-jitter backoff between `min` and `max`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { bounds: Some(Bounds { min, max }), strategy: BackoffStrategy::FullJitter }
    }

    /// Backoff that never sleeps.
    pub fn disabled() -> Self {
        Self { bounds: None, strategy: BackoffStrategy::FullJitter }
    }

    /// Replace the strategy, keeping the bounds.
    pub fn with_strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Lower bound, or `None` when disabled.
    pub fn min(&self) -> Option<Duration> {
        self.bounds.map(|b| b.min)
    }

    /// Upper bound, or `None` when disabled.
    pub fn max(&self) -> Option<Duration> {
        self.bounds.map(|b| b.max)
    }

    pub fn strategy(&self) -> BackoffStrategy {
        self.strategy
    }

    pub fn is_disabled(&self) -> bool {
        self.bounds.is_none()
    }

    /// Delay to wait before `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let mut rng = rng();
        self.delay_with_rng(attempt, &mut rng)
    }

    /// Delay to wait before `attempt`, drawing jitter from `rng`.
    pub fn delay_with_rng<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let Some(Bounds { min, max }) = self.bounds else {
            return Duration::ZERO;
        };
        match self.strategy {
            BackoffStrategy::FullJitter => {
                Jitter::Full.apply_with_rng(interval(attempt, min, max), rng)
            }
            BackoffStrategy::Multiplicative { multiplier, jitter } => {
                multiplicative_with_rng(attempt, min, max, multiplier, jitter, rng)
            }
        }
    }
}

/// Full-jitter delay for `attempt` between `min` and `max`.
///
/// Returns a uniformly random duration in `[0, interval)` where the interval is
/// `min << attempt` clamped to `max`. A zero interval returns zero.
pub fn backoff(attempt: u32, min: Duration, max: Duration) -> Duration {
    Backoff::new(min, max).delay(attempt)
}

/// Multiplicative delay for `attempt` between `min` and `max`.
///
/// `attempt == 0` returns `min` untouched.
pub fn multiplicative_backoff(
    attempt: u32,
    min: Duration,
    max: Duration,
    multiplier: f64,
    jitter: f64,
) -> Duration {
    let mut rng = rng();
    multiplicative_with_rng(attempt, min, max, multiplier, jitter, &mut rng)
}

/// Un-jittered shift-based interval, clamped to `[min, max]` (or `max` if `min > max`).
fn interval(attempt: u32, min: Duration, max: Duration) -> Duration {
    let min_nanos = min.as_nanos();
    let shifted = if attempt < u128::BITS && min_nanos.leading_zeros() >= attempt {
        min_nanos << attempt
    } else {
        min_nanos
    };
    if shifted > max.as_nanos() {
        return max;
    }
    from_nanos_saturated(shifted)
}

fn multiplicative_with_rng<R: Rng>(
    attempt: u32,
    min: Duration,
    max: Duration,
    multiplier: f64,
    jitter: f64,
    rng: &mut R,
) -> Duration {
    if attempt == 0 {
        return min.min(max);
    }
    let exponent = attempt.min(i32::MAX as u32) as i32;
    let grown = min.as_secs_f64() * multiplier.powi(exponent);
    // max.as_secs_f64() can round past Duration::MAX, so compare after converting
    let base = if !grown.is_finite() || grown < 0.0 {
        max
    } else {
        Duration::try_from_secs_f64(grown).ok().filter(|d| *d <= max).unwrap_or(max)
    };
    Jitter::Symmetric(jitter).apply_with_rng(base, rng).min(max)
}

fn from_nanos_saturated(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = nanos / NANOS_PER_SEC;
    match u64::try_from(secs) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
