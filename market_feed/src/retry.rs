//! Retry policy for provider calls.
//!
//! The policy is a plain value (`{max_attempts, base_delay, backoff}`) and the
//! wrapper [`with_retry`] is scheduler-agnostic from the caller's point of
//! view: the contract is "at most `max_attempts` invocations, delay between
//! them per the backoff function", regardless of how the delay is implemented.
//! Only transient errors (as judged by the caller-supplied classifier) are
//! retried; anything else fails fast.

use std::time::Duration;

/// Shape of the delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// Delay doubles with each retry (`base * 2^n`).
    Exponential,
}

/// Bounded-retry policy for a fallible operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of invocations allowed (first try included). At least 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// How the delay grows across retries.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Fixed-delay policy.
    pub fn fixed(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Exponential-backoff policy.
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Delay to wait after the `attempt`-th failure (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => self.base_delay * 2u32.saturating_pow(attempt),
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts, 60 seconds apart.
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(60))
    }
}

/// Runs `op` under the given policy.
///
/// Retries while `is_transient` approves the error and attempts remain.
/// On exhaustion (or a non-transient error) returns the last error together
/// with the number of invocations performed.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, (E, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut made = 0u32;
    loop {
        made += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if made >= attempts || !is_transient(&e) {
                    return Err((e, made));
                }
                tokio::time::sleep(policy.delay_for(made - 1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn tiny(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::fixed(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn transient_errors_use_all_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&tiny(3), |_e: &&str| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("flaky") }
        })
        .await;
        let (err, made) = result.unwrap_err();
        assert_eq!(err, "flaky");
        assert_eq!(made, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_error_fails_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&tiny(5), |_e: &&str| false, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("bad request") }
        })
        .await;
        let (_, made) = result.unwrap_err();
        assert_eq!(made, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_after_retries_is_surfaced() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&tiny(3), |_e: &&str| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 { Err("flaky") } else { Ok(42) }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn exponential_delays_double() {
        let p = RetryPolicy::exponential(4, Duration::from_secs(1));
        assert_eq!(p.delay_for(0), Duration::from_secs(1));
        assert_eq!(p.delay_for(1), Duration::from_secs(2));
        assert_eq!(p.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn default_matches_pipeline_contract() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.base_delay, Duration::from_secs(60));
        assert_eq!(p.backoff, Backoff::Fixed);
    }
}
