//! Minimal retry example: a flaky call that succeeds on the third attempt.
use std::time::Duration;
use tryloop::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("service unavailable")]
struct Unavailable;

#[tokio::main]
async fn main() -> Result<(), RetryError<Unavailable>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let runner = Retry::builder()
        .max_attempts(5)
        .min_backoff(Duration::from_millis(50))
        .max_backoff(Duration::from_secs(1))
        .build()
        .expect("valid retry configuration");

    let value = runner
        .run(&CancelSignal::never(), |attempt| async move {
            // Replace with your real fallible work
            if attempt < 3 {
                Outcome::Retry(Unavailable)
            } else {
                Outcome::Done(format!("hello after {} attempts", attempt))
            }
        })
        .await?;

    println!("{}", value);
    Ok(())
}
