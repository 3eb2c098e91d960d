//! Convenient re-exports for common tryloop types.
pub use crate::{
    backoff::{Backoff, BackoffStrategy, DEFAULT_JITTER, DEFAULT_MULTIPLIER},
    config::{RetryConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF, DEFAULT_MIN_BACKOFF},
    error::{BuildError, RetryError},
    retry::{retry, Outcome, Retry, RetryBuilder},
    signal::{CancelReason, CancelSignal},
};
