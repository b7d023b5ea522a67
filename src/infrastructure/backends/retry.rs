#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time;

/// Retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Delay before the first retry. Doubles on every retry after that.
pub const DEFAULT_BASE_DELAY_MS: u64 = 800;

/// Anything a request attempt can hand back with an HTTP status attached.
pub trait StatusOutcome {
    fn status_code(&self) -> u16;
}

impl StatusOutcome for reqwest::Response {
    fn status_code(&self) -> u16 {
        return self.status().as_u16();
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    return status == 429 || status >= 500;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> RetryPolicy {
        return RetryPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        };
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> RetryPolicy {
        return RetryPolicy {
            max_retries,
            base_delay,
        };
    }

    /// Delay slept before retry number `retry` (zero based). No ceiling.
    pub fn delay_for(&self, retry: u32) -> Duration {
        return self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry));
    }

    /// Runs `attempt` until it produces a final outcome.
    ///
    /// Responses with a 429 or 5xx status and transport errors are retried
    /// with exponential backoff. Every other response is returned straight
    /// away, whatever its status. Once retries run out the last response is
    /// returned as is, while the last transport error is returned as `Err`.
    /// Status interpretation is left to the caller.
    pub async fn send<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, E>
    where
        T: StatusOutcome,
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0;

        loop {
            match attempt().await {
                Ok(res) => {
                    let status = res.status_code();
                    if !is_retryable_status(status) {
                        return Ok(res);
                    }
                    if retries >= self.max_retries {
                        tracing::error!(status = status, attempts = retries + 1, "Retries exhausted");
                        return Ok(res);
                    }
                    tracing::warn!(status = status, retry = retries + 1, "Retrying request");
                }
                Err(err) => {
                    if retries >= self.max_retries {
                        tracing::error!(error = %err, attempts = retries + 1, "Retries exhausted");
                        return Err(err);
                    }
                    tracing::warn!(error = %err, retry = retries + 1, "Retrying request");
                }
            }

            time::sleep(self.delay_for(retries)).await;
            retries += 1;
        }
    }
}
