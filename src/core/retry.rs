//! Retry for transient failures in async operations
//!
//! Used for issue submission, where the tracker may rate-limit (HTTP 429)
//! or refuse the connection before a request is sent.

use std::time::Duration;
use tokio::time::sleep;

/// Errors that can say whether another attempt might succeed
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Fixed-delay retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
///
/// # Examples
/// ```rust
/// use osprey::core::retry::{retry_async, RetryPolicy, Transient};
///
/// struct Busy;
/// impl Transient for Busy {
///     fn is_transient(&self) -> bool { true }
/// }
/// impl std::fmt::Display for Busy {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "busy") }
/// }
///
/// # async fn example() -> Result<u64, Busy> {
/// let ticket = retry_async("create issue", RetryPolicy::default(), || async {
///     Ok::<u64, Busy>(42)
/// })
/// .await?;
/// # Ok(ticket)
/// # }
/// ```
pub async fn retry_async<F, T, E, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if attempt < max_attempts && error.is_transient() => {
                log::debug!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name,
                    attempt,
                    max_attempts,
                    policy.delay,
                    error
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
