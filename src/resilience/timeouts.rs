//! Timeout enforcement.
//!
//! Every supplier attempt runs under a hard deadline. An expired attempt is
//! reported as a retryable transient failure, so it counts as one attempt in
//! the retry loop.
//!
//! The whole retry loop runs under a second, overall deadline (the request
//! SLA). Running out of it ends the loop with `SupplierTimeout`.

use std::future::Future;
use std::time::Duration;

use crate::error::BffError;
use crate::resilience::retries::AttemptError;

/// Run one supplier attempt with a deadline.
pub async fn with_deadline<T, Fut>(deadline: Duration, attempt: Fut) -> Result<T, AttemptError<BffError>>
where
    Fut: Future<Output = Result<T, AttemptError<BffError>>>,
{
    match tokio::time::timeout(deadline, attempt).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::retryable(BffError::TransientRetry(format!(
            "supplier call timed out after {}ms",
            deadline.as_millis()
        )))),
    }
}

/// Run a complete retry loop with an overall deadline.
pub async fn with_overall_deadline<T, Fut>(deadline: Duration, retry_loop: Fut) -> Result<T, BffError>
where
    Fut: Future<Output = Result<T, BffError>>,
{
    match tokio::time::timeout(deadline, retry_loop).await {
        Ok(result) => result,
        Err(_) => Err(BffError::SupplierTimeout(format!(
            "no supplier answer within the {}ms request deadline",
            deadline.as_millis()
        ))),
    }
}
