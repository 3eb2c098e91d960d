//! An operation that never recovers, bounded by a deadline and a Ctrl-C token.
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tryloop::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
struct Refused;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let signal = CancelSignal::new(token).with_timeout(Duration::from_secs(2));
    let runner = Retry::builder()
        .max_attempts(50)
        .min_backoff(Duration::from_millis(100))
        .max_backoff(Duration::from_millis(800))
        .strategy(BackoffStrategy::multiplicative())
        .build()
        .expect("valid retry configuration");

    let result: Result<(), _> =
        runner.run(&signal, |_| async { Outcome::Retry(Refused) }).await;

    match result {
        Err(RetryError::Cancelled(reason)) => println!("gave up: {}", reason),
        Err(RetryError::Exhausted { attempts, last }) => {
            println!("gave up after {} attempts: {}", attempts, last)
        }
        Err(RetryError::Failed(e)) => println!("failed: {}", e),
        Ok(()) => println!("connected"),
    }
}
