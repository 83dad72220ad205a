//! Retry policy for page fetches
//!
//! A failed fetch is retried with exponential backoff: the delay before
//! retry `n` (counting from zero) is `base_delay * 2^n`. With the default
//! one-second base that is 1s, 2s, 4s, ...

use std::future::Future;
use std::time::Duration;

/// Errors that know whether trying again could help
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Maximum retries plus the backoff schedule between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; zero means a single attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default one-second base delay
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Replaces the base delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay to wait before retry number `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Runs `operation` until it succeeds or retrying stops making sense
    ///
    /// Stops on success, on an error that is not retryable, or once
    /// `max_retries` retries have failed. `on_retry` is called before each
    /// backoff sleep with the upcoming retry number (starting at 1), the
    /// error that caused it, and the delay.
    pub async fn run<T, E, Op, Fut, R>(&self, mut operation: Op, mut on_retry: R) -> Result<T, E>
    where
        E: Retryable,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnMut(u32, &E, Duration),
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    on_retry(attempt + 1, &error, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
