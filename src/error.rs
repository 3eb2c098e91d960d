//! Error types for the retry loop
//!
//! [`RetryError`] keeps the three ways a run can end unsuccessfully apart by variant, so callers
//! branch with `match` or the `is_*` predicates rather than by message text.
use crate::signal::CancelReason;

/// Why a retry run returned without a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError<E> {
    /// The operation's own error, returned unchanged when it asked not to be retried.
    #[error(transparent)]
    Failed(E),
    /// The attempt budget ran out. `last` is the error from the final attempt.
    #[error("exceeded retry limit after {attempts} attempts")]
    Exhausted { attempts: u32, last: E },
    /// The cancellation signal fired before an attempt or during a backoff wait.
    #[error("{0}")]
    Cancelled(CancelReason),
}

impl<E> RetryError<E> {
    /// Check if the operation itself gave up
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
    /// Check if this error is due to retry exhaustion
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
    /// Check if this error is due to cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
    /// Why the signal fired, if this is a cancellation.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }
    /// Attempts made before giving up, if the budget ran out.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
    /// Get the operation's error if this is a `Failed` variant
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
    /// Borrow the operation's error if this is a `Failed` variant
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
    /// The most recent operation error: the final one for `Failed`, the last retried one for
    /// `Exhausted`.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Failed(e) | Self::Exhausted { last: e, .. } => Some(e),
            Self::Cancelled(_) => None,
        }
    }
}

/// Errors produced while building a retry runner.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// `max_attempts` must be > 0.
    #[error("max_attempts must be > 0 (got {0})")]
    InvalidMaxAttempts(u32),
    /// Multiplicative backoff needs a finite multiplier greater than one.
    #[error("backoff multiplier must be finite and > 1 (got {0})")]
    InvalidMultiplier(f64),
    /// Multiplicative jitter must lie in `[0, 1]`.
    #[error("backoff jitter must be within [0, 1] (got {0})")]
    InvalidJitter(f64),
}
