//! Bounded retry without backoff

use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Returned when every attempt failed
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `op` up to `max_attempts` times (at least once), returning the first
/// success. Each failed attempt is logged with its 1-based attempt number.
pub async fn retry_bounded<T, E, F, Fut>(
    max_attempts: u32,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = Cell::new(0);
        let result: Result<u32, RetryExhausted<String>> = retry_bounded(3, |attempt| {
            calls.set(calls.get() + 1);
            async move {
                if attempt < 3 {
                    Err(format!("attempt {} failed", attempt))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_reports_last_error() {
        let calls = Cell::new(0);
        let result: Result<(), RetryExhausted<String>> = retry_bounded(3, |attempt| {
            calls.set(calls.get() + 1);
            async move { Err(format!("failure #{}", attempt)) }
        })
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, "failure #3");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let result: Result<(), RetryExhausted<&str>> =
            retry_bounded(0, |_| async { Err("nope") }).await;
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
