#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # tryloop
//!
//! Retry an async operation with jittered exponential backoff, an attempt budget, and
//! cooperative cancellation.
//!
//! ## Features
//!
//! - **Full-jitter backoff** (`min << attempt`, capped, uniform in `[0, interval)`) by default
//! - **Multiplicative backoff** with symmetric jitter as an opt-in strategy
//! - **Cancellation** via `tokio_util`'s `CancellationToken`, with optional deadlines; pending
//!   backoff waits are abandoned as soon as the signal fires
//! - **Distinguishable errors**: the operation's own error, budget exhaustion, and cancellation
//! - **Process-wide defaults** that can be replaced once at startup
//!
//! ## Quick Start
//!
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use tryloop::{retry, CancelSignal, Outcome, RetryError};
//!
//! #[derive(Debug)]
//! struct Unavailable;
//!
//! #[tokio::main]
//! async fn main() {
//!     let signal = CancelSignal::new(CancellationToken::new());
//!
//!     let result: Result<(), RetryError<Unavailable>> = retry(&signal, |attempt| async move {
//!         // retry twice, then succeed
//!         if attempt < 3 { Outcome::Retry(Unavailable) } else { Outcome::Done(()) }
//!     })
//!     .await;
//!     assert!(result.is_ok());
//! }
//! ```

pub mod backoff;
pub mod config;
pub mod error;
pub mod jitter;
pub mod prelude;
pub mod retry;
pub mod signal;
pub mod sleeper;

// Re-exports
pub use backoff::{backoff, multiplicative_backoff, Backoff, BackoffStrategy};
pub use config::RetryConfig;
pub use error::{BuildError, RetryError};
pub use jitter::Jitter;
pub use retry::{retry, Outcome, Retry, RetryBuilder};
pub use signal::{CancelReason, CancelSignal};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
