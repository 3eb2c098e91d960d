//! Caller-owned cancellation signal observed by the retry loop.
//!
//! A [`CancelSignal`] wraps a [`CancellationToken`] and an optional deadline. The loop only
//! reads it: once before every attempt (`reason`) and while suspended between attempts
//! (`fired`). Cancelling the token or passing the deadline stops the loop with the matching
//! [`CancelReason`].
//!
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use tryloop::{CancelReason, CancelSignal};
//!
//! let token = CancellationToken::new();
//! let signal = CancelSignal::new(token.clone()).with_timeout(Duration::from_secs(30));
//! assert_eq!(signal.reason(), None);
//!
//! token.cancel();
//! assert_eq!(signal.reason(), Some(CancelReason::Cancelled));
//! ```

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a cancellation signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The token was cancelled explicitly.
    Cancelled,
    /// The deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "operation cancelled"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Cancellation token with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelSignal {
    pub fn new(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// A signal with a fresh token and no deadline. It fires only if its token is cancelled.
    pub fn never() -> Self {
        Self::default()
    }

    /// Fire at `deadline`. An earlier deadline already set is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Fire `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now().checked_add(timeout);
        match deadline {
            Some(deadline) => self.with_deadline(deadline),
            // unreachable in practice; treat as "no deadline"
            None => self,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Current state without waiting. Token cancellation wins over an elapsed deadline.
    pub fn reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_fired(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolve once the signal fires.
    pub async fn fired(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => CancelReason::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CancelReason::Cancelled
            }
        }
    }
}

impl From<CancellationToken> for CancelSignal {
    fn from(token: CancellationToken) -> Self {
        Self::new(token)
    }
}
