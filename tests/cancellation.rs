use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tryloop::{
    BackoffStrategy, CancelReason, CancelSignal, InstantSleeper, Outcome, Retry, RetryError,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("something error")]
struct SomethingError;

/// Deterministic backoff: every wait is exactly `delay`.
fn fixed_backoff(delay: Duration, max_attempts: u32) -> Retry {
    Retry::builder()
        .max_attempts(max_attempts)
        .min_backoff(delay)
        .max_backoff(delay)
        .strategy(BackoffStrategy::Multiplicative { multiplier: 2.0, jitter: 0.0 })
        .build()
        .unwrap()
}

#[tokio::test]
async fn pre_cancelled_signal_never_invokes_operation() {
    let token = CancellationToken::new();
    token.cancel();
    let runner = Retry::builder().with_sleeper(InstantSleeper).build().unwrap();
    let calls = AtomicU32::new(0);

    let result: Result<(), RetryError<SomethingError>> = runner
        .run(&CancelSignal::new(token), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Outcome::Done(()) }
        })
        .await;

    assert_eq!(result, Err(RetryError::Cancelled(CancelReason::Cancelled)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_deadline_never_invokes_operation() {
    let signal = CancelSignal::never().with_deadline(tokio::time::Instant::now());
    let runner = Retry::builder().with_sleeper(InstantSleeper).build().unwrap();
    let calls = AtomicU32::new(0);

    let result: Result<(), RetryError<SomethingError>> = runner
        .run(&signal, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Outcome::Done(()) }
        })
        .await;

    assert_eq!(result.unwrap_err().cancel_reason(), Some(CancelReason::DeadlineExceeded));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_during_backoff_returns_promptly() {
    let token = CancellationToken::new();
    let signal = CancelSignal::new(token.clone());
    let runner = fixed_backoff(Duration::from_secs(5), 10);
    let calls = AtomicU32::new(0);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let start = Instant::now();
    let result: Result<(), _> = runner
        .run(&signal, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Outcome::Retry(SomethingError) }
        })
        .await;
    let elapsed = start.elapsed();
    canceller.await.unwrap();

    assert_eq!(result, Err(RetryError::Cancelled(CancelReason::Cancelled)));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second attempt must not start");
    assert!(elapsed < Duration::from_secs(1), "waited {:?} instead of preempting", elapsed);
}

#[tokio::test]
async fn deadline_during_backoff_reports_deadline_exceeded() {
    let signal = CancelSignal::never().with_timeout(Duration::from_millis(10));
    let runner = fixed_backoff(Duration::from_millis(20), 10);

    let start = Instant::now();
    let result: Result<(), _> = runner
        .run(&signal, |_| async { Outcome::Retry(SomethingError) })
        .await;

    assert_eq!(result, Err(RetryError::Cancelled(CancelReason::DeadlineExceeded)));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn cancel_from_inside_operation_stops_before_next_attempt() {
    let token = CancellationToken::new();
    let signal = CancelSignal::new(token.clone());
    let runner = Retry::builder().disable_backoff().build().unwrap();
    let calls = AtomicU32::new(0);

    let result: Result<(), _> = runner
        .run(&signal, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            if attempt == 3 {
                token.cancel();
            }
            async { Outcome::Retry(SomethingError) }
        })
        .await;

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn final_outcome_wins_over_cancellation_raised_during_attempt() {
    let token = CancellationToken::new();
    let signal = CancelSignal::new(token.clone());
    let runner = Retry::builder().with_sleeper(InstantSleeper).build().unwrap();

    let result: Result<u8, RetryError<SomethingError>> = runner
        .run(&signal, |_| {
            token.cancel();
            async { Outcome::Done(7) }
        })
        .await;

    assert_eq!(result, Ok(7));
}

#[tokio::test]
async fn parent_token_cancels_child_signal() {
    let parent = CancellationToken::new();
    let signal = CancelSignal::new(parent.child_token());
    let runner = fixed_backoff(Duration::from_secs(5), 3);

    let canceller = {
        let parent = parent.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            parent.cancel();
        })
    };

    let result: Result<(), _> = runner
        .run(&signal, |_| async { Outcome::Retry(SomethingError) })
        .await;
    canceller.await.unwrap();

    assert_eq!(result.unwrap_err().cancel_reason(), Some(CancelReason::Cancelled));
}
