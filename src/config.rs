//! Retry configuration and process-wide defaults.
//!
//! A [`RetryConfig`] is a plain `Copy` value: every run takes its own copy, so concurrent runs
//! never share configuration state.
//!
//! The process defaults (`10` attempts, `8ms`..`512ms` full-jitter backoff) can be replaced once
//! at startup with [`set_defaults`]. Builders read them when `build` is called; runners that are
//! already built keep the configuration they were built with.
//!
//! ```rust
//! use std::time::Duration;
//! use tryloop::{config, Backoff, RetryConfig};
//!
//! config::set_defaults(RetryConfig {
//!     max_attempts: 5,
//!     backoff: Backoff::new(Duration::from_millis(50), Duration::from_secs(2)),
//! })
//! .unwrap();
//! assert_eq!(config::defaults().max_attempts, 5);
//! # config::reset_defaults();
//! ```

use crate::backoff::{Backoff, BackoffStrategy};
use crate::error::BuildError;
use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default lower backoff bound.
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_millis(8);

/// Default upper backoff bound.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_millis(512);

/// Complete configuration for one retry run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryConfig {
    /// Total attempts, including the first one. Must be > 0.
    pub max_attempts: u32,
    /// Delay policy between attempts.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::new(DEFAULT_MIN_BACKOFF, DEFAULT_MAX_BACKOFF),
        }
    }
}

impl RetryConfig {
    /// Check the invariants a runner relies on.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.max_attempts == 0 {
            return Err(BuildError::InvalidMaxAttempts(self.max_attempts));
        }
        if let BackoffStrategy::Multiplicative { multiplier, jitter } = self.backoff.strategy() {
            if !multiplier.is_finite() || multiplier <= 1.0 {
                return Err(BuildError::InvalidMultiplier(multiplier));
            }
            if !jitter.is_finite() || !(0.0..=1.0).contains(&jitter) {
                return Err(BuildError::InvalidJitter(jitter));
            }
        }
        Ok(())
    }
}

fn slot() -> &'static ArcSwap<RetryConfig> {
    static DEFAULTS: OnceLock<ArcSwap<RetryConfig>> = OnceLock::new();
    DEFAULTS.get_or_init(|| ArcSwap::from_pointee(RetryConfig::default()))
}

/// Current process-wide defaults.
pub fn defaults() -> RetryConfig {
    **slot().load()
}

/// Replace the process-wide defaults after validating them.
///
/// Intended for application startup, before any runner is built.
pub fn set_defaults(config: RetryConfig) -> Result<(), BuildError> {
    config.validate()?;
    tracing::debug!(
        max_attempts = config.max_attempts,
        min_backoff = ?config.backoff.min(),
        max_backoff = ?config.backoff.max(),
        "retry defaults replaced"
    );
    slot().store(Arc::new(config));
    Ok(())
}

/// Restore the built-in defaults.
pub fn reset_defaults() {
    slot().store(Arc::new(RetryConfig::default()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.backoff.min(), Some(Duration::from_millis(8)));
        assert_eq!(config.backoff.max(), Some(Duration::from_millis(512)));
        assert_eq!(config.backoff.strategy(), BackoffStrategy::FullJitter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = RetryConfig { max_attempts: 0, ..RetryConfig::default() };
        assert_eq!(config.validate(), Err(BuildError::InvalidMaxAttempts(0)));
    }

    #[test]
    fn multiplicative_parameters_validated() {
        let bounds = Backoff::new(DEFAULT_MIN_BACKOFF, DEFAULT_MAX_BACKOFF);
        let with = |multiplier, jitter| RetryConfig {
            max_attempts: 3,
            backoff: bounds.with_strategy(BackoffStrategy::Multiplicative { multiplier, jitter }),
        };

        assert!(with(1.6, 0.2).validate().is_ok());
        assert!(with(2.0, 0.0).validate().is_ok());
        assert!(with(2.0, 1.0).validate().is_ok());
        assert_eq!(with(1.0, 0.2).validate(), Err(BuildError::InvalidMultiplier(1.0)));
        assert!(matches!(
            with(f64::INFINITY, 0.2).validate(),
            Err(BuildError::InvalidMultiplier(_))
        ));
        assert_eq!(with(1.6, -0.1).validate(), Err(BuildError::InvalidJitter(-0.1)));
        assert_eq!(with(1.6, 1.5).validate(), Err(BuildError::InvalidJitter(1.5)));
        assert!(matches!(with(1.6, f64::NAN).validate(), Err(BuildError::InvalidJitter(_))));
    }

    #[test]
    fn disabled_backoff_is_valid() {
        let config = RetryConfig { max_attempts: 1, backoff: Backoff::disabled() };
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_round_trips_through_json() {
        let config = RetryConfig {
            max_attempts: 4,
            backoff: Backoff::new(Duration::from_millis(10), Duration::from_secs(1))
                .with_strategy(BackoffStrategy::multiplicative()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RetryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
