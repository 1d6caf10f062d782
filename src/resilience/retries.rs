//! Retry logic.
//!
//! # Responsibilities
//! - Run a fallible async operation up to `attempts` times
//! - Wait `base * 2^(n-1)` between attempts (optionally jittered)
//! - Stop immediately on errors the call site marked non-retryable
//!
//! # Design Decisions
//! - Retryability is decided where the error is produced and travels with it
//!   as [`AttemptError`]; the retrier never guesses
//! - The last error is returned unchanged, never wrapped
//! - An observer hook fires before each wait

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::{calculate_backoff, with_jitter};

/// An error from one attempt, tagged with whether trying again may help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError<E> {
    pub error: E,
    pub retryable: bool,
}

impl<E> AttemptError<E> {
    pub fn retryable(error: E) -> Self {
        Self { error, retryable: true }
    }

    pub fn permanent(error: E) -> Self {
        Self { error, retryable: false }
    }
}

/// Passed to the `on_retry` hook before each wait.
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// The attempt that just failed (1-indexed).
    pub attempt: u32,
    pub wait: Duration,
    pub error: &'a E,
}

/// Exponential backoff retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
            max_delay: Duration::MAX,
            jitter: false,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait before the attempt following `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis().min(u64::MAX as u128) as u64;
        let max_ms = self.max_delay.as_millis().min(u64::MAX as u128) as u64;
        let delay = calculate_backoff(attempt, base_ms, max_ms);
        if self.jitter {
            with_jitter(delay)
        } else {
            delay
        }
    }

    /// Upper bound on the time spent waiting between attempts, jitter included.
    pub fn max_total_backoff(&self) -> Duration {
        let base_ms = self.base_delay.as_millis().min(u64::MAX as u128) as u64;
        let max_ms = self.max_delay.as_millis().min(u64::MAX as u128) as u64;
        (1..self.attempts)
            .map(|attempt| {
                let delay = calculate_backoff(attempt, base_ms, max_ms);
                if self.jitter {
                    delay + delay / 10
                } else {
                    delay
                }
            })
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Run `operation` with retries and no observer.
    pub async fn retry<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError<E>>>,
    {
        self.retry_with(operation, |_| {}).await
    }

    /// Run `operation(attempt)` until it succeeds, fails permanently, or the
    /// attempts are used up. `on_retry` is called before every wait.
    pub async fn retry_with<T, E, F, Fut, H>(&self, mut operation: F, mut on_retry: H) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError<E>>>,
        H: FnMut(RetryEvent<'_, E>),
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(AttemptError { error, retryable }) => {
                    if !retryable || attempt >= self.attempts {
                        return Err(error);
                    }

                    let wait = self.delay_for(attempt);
                    on_retry(RetryEvent {
                        attempt,
                        wait,
                        error: &error,
                    });
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
