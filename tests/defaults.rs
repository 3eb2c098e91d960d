//! Process-wide defaults are global; everything that mutates them lives in this one test so
//! the assertions cannot interleave.
use std::time::Duration;
use tryloop::{config, retry, Backoff, BuildError, CancelSignal, Outcome, Retry, RetryConfig};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("still failing")]
struct StillFailing;

#[tokio::test]
async fn replaced_defaults_flow_into_builders_and_retry() {
    assert_eq!(config::defaults(), RetryConfig::default());

    let invalid = RetryConfig { max_attempts: 0, ..RetryConfig::default() };
    assert_eq!(config::set_defaults(invalid), Err(BuildError::InvalidMaxAttempts(0)));
    assert_eq!(config::defaults(), RetryConfig::default());

    let built_before = Retry::builder().build().unwrap();

    config::set_defaults(RetryConfig { max_attempts: 3, backoff: Backoff::disabled() }).unwrap();

    // already-built runners keep their copy
    assert_eq!(built_before.config().max_attempts, 10);

    let runner = Retry::builder().build().unwrap();
    assert_eq!(runner.config().max_attempts, 3);
    assert!(runner.config().backoff.is_disabled());

    let overridden = Retry::builder()
        .max_attempts(5)
        .min_backoff(Duration::from_millis(1))
        .max_backoff(Duration::from_millis(2))
        .build()
        .unwrap();
    assert_eq!(overridden.config().max_attempts, 5);
    assert_eq!(overridden.config().backoff.max(), Some(Duration::from_millis(2)));

    let mut calls = 0;
    let result: Result<(), _> = retry(&CancelSignal::never(), |_| {
        calls += 1;
        async { Outcome::Retry(StillFailing) }
    })
    .await;
    assert_eq!(result.unwrap_err().attempts(), Some(3));
    assert_eq!(calls, 3);

    let with_defaults = Retry::with_defaults().unwrap();
    assert_eq!(with_defaults.config().max_attempts, 3);

    config::reset_defaults();
    assert_eq!(config::defaults(), RetryConfig::default());
}
