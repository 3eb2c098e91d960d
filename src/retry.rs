//! Retry loop implementation
//!
//! Runs a caller-supplied async operation until it finishes, gives up, exhausts the attempt
//! budget, or the cancellation signal fires.
//!
//! Semantics:
//! - `max_attempts` counts total attempts (initial try + retries); attempts are numbered from 1.
//! - The operation reports an [`Outcome`]: `Done(T)` and `Fail(E)` end the run, `Retry(E)` asks
//!   for another attempt.
//! - Before attempt `n` (n >= 2) the loop waits `backoff.delay(n)`.
//! - The signal is checked before every attempt and raced against every wait, so a pending
//!   wait is abandoned as soon as the signal fires.
//!
//! Invariants:
//! - The operation is never invoked more than `max_attempts` times.
//! - The operation's error is returned unchanged inside `RetryError::Failed`.
//! - No attempt starts after the signal has fired.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use tryloop::{CancelSignal, Outcome, Retry, RetryError};
//!
//! #[derive(Debug)]
//! struct Busy;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let runner = Retry::builder()
//!     .max_attempts(3)
//!     .min_backoff(Duration::from_millis(1))
//!     .max_backoff(Duration::from_millis(4))
//!     .build()
//!     .unwrap();
//!
//! let result: Result<u32, RetryError<Busy>> = runner
//!     .run(&CancelSignal::never(), |attempt| async move {
//!         if attempt < 3 { Outcome::Retry(Busy) } else { Outcome::Done(attempt) }
//!     })
//!     .await;
//! assert_eq!(result.unwrap(), 3);
//! # });
//! ```

use crate::backoff::{Backoff, BackoffStrategy};
use crate::config::{self, RetryConfig};
use crate::error::{BuildError, RetryError};
use crate::signal::CancelSignal;
use crate::sleeper::{Sleeper, TokioSleeper};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// What a single attempt reports back to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// Finished successfully; the loop returns the value.
    Done(T),
    /// Failed in a way worth retrying.
    Retry(E),
    /// Failed for good; the loop returns the error unchanged.
    Fail(E),
}

impl<T, E> Outcome<T, E> {
    /// Classify a `Result`, retrying only errors accepted by `retryable`.
    pub fn from_result<F>(result: Result<T, E>, retryable: F) -> Self
    where
        F: FnOnce(&E) -> bool,
    {
        match result {
            Ok(value) => Outcome::Done(value),
            Err(e) if retryable(&e) => Outcome::Retry(e),
            Err(e) => Outcome::Fail(e),
        }
    }
}

/// `(retry, error)` pairs: a missing error always ends the run successfully.
impl<E> From<(bool, Option<E>)> for Outcome<(), E> {
    fn from((retry, err): (bool, Option<E>)) -> Self {
        match (retry, err) {
            (_, None) => Outcome::Done(()),
            (true, Some(e)) => Outcome::Retry(e),
            (false, Some(e)) => Outcome::Fail(e),
        }
    }
}

/// Retry runner combining a configuration and a sleeper.
#[derive(Debug, Clone)]
pub struct Retry {
    config: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl Retry {
    /// Construct a new builder; unset fields come from [`config::defaults`].
    pub fn builder() -> RetryBuilder {
        RetryBuilder::new()
    }

    /// Runner for a complete configuration.
    pub fn new(config: RetryConfig) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self { config, sleeper: Arc::new(TokioSleeper) })
    }

    /// Runner for the current process defaults.
    pub fn with_defaults() -> Result<Self, BuildError> {
        Self::new(config::defaults())
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Invoke `operation` until it finishes, gives up, runs out of attempts, or `signal` fires.
    pub async fn run<T, E, Fut, Op>(
        &self,
        signal: &CancelSignal,
        mut operation: Op,
    ) -> Result<T, RetryError<E>>
    where
        Fut: Future<Output = Outcome<T, E>>,
        Op: FnMut(u32) -> Fut,
    {
        let RetryConfig { max_attempts, backoff } = self.config;
        let mut attempt: u32 = 1;

        loop {
            if let Some(reason) = signal.reason() {
                tracing::debug!(attempt, %reason, "retry cancelled before attempt");
                return Err(RetryError::Cancelled(reason));
            }

            tracing::trace!(attempt, max_attempts, "starting attempt");
            let last = match operation(attempt).await {
                Outcome::Done(value) => return Ok(value),
                Outcome::Fail(e) => return Err(RetryError::Failed(e)),
                Outcome::Retry(e) => e,
            };

            if attempt >= max_attempts {
                tracing::debug!(attempts = max_attempts, "retry budget exhausted");
                return Err(RetryError::Exhausted { attempts: max_attempts, last });
            }
            attempt += 1;

            let delay = backoff.delay(attempt);
            tracing::debug!(attempt, ?delay, "scheduling retry");
            if delay.is_zero() {
                continue;
            }

            tokio::select! {
                biased;
                reason = signal.fired() => {
                    tracing::debug!(attempt, %reason, "retry cancelled during backoff");
                    return Err(RetryError::Cancelled(reason));
                }
                _ = self.sleeper.sleep(delay) => {}
            }
        }
    }
}

/// Run `operation` with the process-wide defaults.
pub async fn retry<T, E, Fut, Op>(
    signal: &CancelSignal,
    operation: Op,
) -> Result<T, RetryError<E>>
where
    Fut: Future<Output = Outcome<T, E>>,
    Op: FnMut(u32) -> Fut,
{
    let runner = Retry { config: config::defaults(), sleeper: Arc::new(TokioSleeper) };
    runner.run(signal, operation).await
}

/// Builder for [`Retry`]. Fields left unset fall back to the process defaults at `build` time.
#[derive(Debug, Clone, Default)]
pub struct RetryBuilder {
    max_attempts: Option<u32>,
    min_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
    disabled: bool,
    strategy: Option<BackoffStrategy>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set total attempts (initial + retries). Must be > 0.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Lower backoff bound. Zero is honored and yields zero delays.
    pub fn min_backoff(mut self, min: Duration) -> Self {
        self.min_backoff = Some(min);
        self
    }

    /// Upper backoff bound.
    pub fn max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = Some(max);
        self
    }

    /// Never wait between attempts, whatever the bounds say.
    pub fn disable_backoff(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set the backoff strategy.
    pub fn strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Merge with the process defaults and validate.
    pub fn build(self) -> Result<Retry, BuildError> {
        let config = self.resolve(&config::defaults());
        config.validate()?;
        let sleeper: Arc<dyn Sleeper> = match self.sleeper {
            Some(sleeper) => sleeper,
            None => Arc::new(TokioSleeper),
        };
        Ok(Retry { config, sleeper })
    }

    fn resolve(&self, defaults: &RetryConfig) -> RetryConfig {
        let strategy = self.strategy.unwrap_or_else(|| defaults.backoff.strategy());
        let bounds = if self.disabled {
            Backoff::disabled()
        } else {
            match (defaults.backoff.min(), defaults.backoff.max()) {
                (Some(min), Some(max)) => {
                    Backoff::new(self.min_backoff.unwrap_or(min), self.max_backoff.unwrap_or(max))
                }
                // defaults disabled: only a fully specified pair turns backoff back on
                _ => match (self.min_backoff, self.max_backoff) {
                    (Some(min), Some(max)) => Backoff::new(min, max),
                    _ => Backoff::disabled(),
                },
            }
        };
        RetryConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            backoff: bounds.with_strategy(strategy),
        }
    }
}
