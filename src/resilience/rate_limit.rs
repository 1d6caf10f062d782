//! Token bucket admission control for outbound supplier calls.
//!
//! The bucket never sleeps. A caller that cannot get a token is told so
//! immediately and decides what to do (the pipeline falls back to stale cache
//! or surfaces `RateLimited`).

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Returned when the bucket does not hold enough tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested {requested} tokens, {available} available")]
pub struct RateLimitExceeded {
    pub requested: u32,
    pub available: u32,
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

/// A token bucket refilled by one token per whole interval.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill_interval: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// A full bucket.
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self::with_tokens(capacity, refill_interval, capacity, Instant::now())
    }

    /// A bucket holding `tokens` (clamped to `capacity`) as of `now`.
    pub fn with_tokens(capacity: u32, refill_interval: Duration, tokens: u32, now: Instant) -> Self {
        Self {
            capacity,
            refill_interval,
            state: Mutex::new(BucketState {
                tokens: tokens.min(capacity),
                last_refill: now,
            }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Debit `n` tokens, or fail without debiting anything.
    pub fn try_consume(&self, n: u32) -> Result<(), RateLimitExceeded> {
        self.try_consume_at(n, Instant::now())
    }

    pub fn try_consume_at(&self, n: u32, now: Instant) -> Result<(), RateLimitExceeded> {
        let mut state = self.lock();
        self.refill(&mut state, now);

        if state.tokens < n {
            return Err(RateLimitExceeded {
                requested: n,
                available: state.tokens,
            });
        }
        state.tokens -= n;
        Ok(())
    }

    /// Tokens currently available, after refilling.
    pub fn available(&self) -> u32 {
        self.available_at(Instant::now())
    }

    pub fn available_at(&self, now: Instant) -> u32 {
        let mut state = self.lock();
        self.refill(&mut state, now);
        state.tokens
    }

    // Advances by whole intervals only so fractional progress carries over.
    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill);
        let interval_ms = self.refill_interval.as_millis().max(1);
        let whole_intervals = elapsed.as_millis() / interval_ms;
        if whole_intervals == 0 {
            return;
        }

        let added = u32::try_from(whole_intervals).unwrap_or(u32::MAX);
        state.tokens = state.tokens.saturating_add(added).min(self.capacity);

        let advance_ms = u64::try_from(whole_intervals * interval_ms).unwrap_or(u64::MAX);
        state.last_refill += Duration::from_millis(advance_ms);
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
