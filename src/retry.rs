// src/retry.rs
// Fixed-count retry for remote calls

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default maximum attempts for a retried operation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay between attempts (fixed, no backoff growth)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Run `operation` until it succeeds, up to `max_attempts` times with a fixed
/// `delay` between failures.
///
/// The first `Ok` is returned immediately, whatever its payload carries; only
/// `Err` triggers another attempt. Every failure is logged, no sleep follows
/// the last attempt, and the final error is returned as a plain value rather
/// than propagated further. A `max_attempts` of zero is treated as one.
pub async fn retry_async<T, E, F, Fut>(
    label: &str,
    max_attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < max_attempts {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "{} failed, retrying in {:?}...",
                        label,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                } else {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "{} failed, giving up",
                        label
                    );
                    return Err(e);
                }
            }
        }
    }
}
