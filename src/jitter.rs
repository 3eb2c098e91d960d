//! Jitter strategies applied to a backoff interval.
//!
//! - `Full`: uniform in `[0, interval)`, the shift-based policy's randomization.
//! - `Symmetric(factor)`: `interval * (1 + factor * u)` with `u` uniform in `[-1, 1]`, the
//!   multiplicative policy's randomization.
//!
//! Notes:
//! - RNG: `apply` uses `rand`'s thread-local RNG, so concurrent retry loops never share
//!   generator state. Deterministic RNGs can be injected via `apply_with_rng`.
//! - Precision: nanosecond resolution; intervals beyond `u64::MAX` nanoseconds saturate.
//! - Results are never negative.
//!
//! Example:
//! ```rust
//! use std::time::Duration;
//! use tryloop::Jitter;
//!
//! let interval = Duration::from_millis(100);
//! assert!(Jitter::Full.apply(interval) < interval);
//! assert_eq!(Jitter::Symmetric(0.0).apply(interval), interval);
//! ```

use rand::{rng, Rng};
use std::time::Duration;

/// Jitter strategy for randomizing retry delays
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Jitter {
    /// Full jitter: random in `[0, interval)`
    Full,
    /// Symmetric jitter: scale by `1 + factor * u`, `u` in `[-1, 1]`
    Symmetric(f64),
}

impl Jitter {
    /// Apply jitter to an interval using the thread-local RNG.
    pub fn apply(&self, interval: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(interval, &mut rng)
    }

    /// Apply jitter with a custom RNG (for testing)
    pub fn apply_with_rng<R: Rng>(&self, interval: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::Full => {
                let nanos = as_nanos_saturated(interval);
                if nanos == 0 {
                    return Duration::ZERO;
                }
                Duration::from_nanos(rng.random_range(0..nanos))
            }
            Jitter::Symmetric(factor) => {
                let factor = if factor.is_finite() { factor.abs() } else { 0.0 };
                let u: f64 = rng.random_range(-1.0..=1.0);
                let scaled = interval.as_secs_f64() * (1.0 + factor * u);
                if scaled <= 0.0 {
                    return Duration::ZERO;
                }
                Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX)
            }
        }
    }
}

fn as_nanos_saturated(duration: Duration) -> u64 {
    duration.as_nanos().try_into().unwrap_or(u64::MAX)
}
