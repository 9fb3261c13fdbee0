//! Retry combinator for transport failures
//!
//! The default policy retries forever with a fixed 10 second delay, so a
//! network outage stalls the crawl instead of aborting it. Bounded attempts
//! and exponential growth are opt-in.

use crate::config::RetryConfig;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry a failing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries forever
    pub max_attempts: Option<u32>,

    /// Delay after the first failure
    pub delay: Duration,

    /// Growth factor applied per failure; 1 keeps the delay fixed
    pub multiplier: u32,

    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(10))
    }
}

impl RetryPolicy {
    /// Unbounded retry with a constant delay
    pub fn fixed(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
            multiplier: 1,
            max_delay: delay,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_backoff(mut self, multiplier: u32, max_delay: Duration) -> Self {
        self.multiplier = multiplier.max(1);
        self.max_delay = max_delay.max(self.delay);
        self
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        let policy = Self::fixed(Duration::from_secs(config.delay_secs)).with_backoff(
            config.multiplier,
            Duration::from_secs(config.max_delay_secs),
        );

        match config.max_attempts {
            0 => policy,
            n => policy.with_max_attempts(n),
        }
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        self.delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Returned when a bounded policy runs out of attempts
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempt(s): {}", self.attempts, self.last)
    }
}

/// Runs `op` until it succeeds or the policy gives up
///
/// Every failure is logged with `label` so an operator watching the output
/// can see a stalled crawl.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if let Some(max) = policy.max_attempts {
                    if attempt >= max {
                        return Err(RetryExhausted { attempts: attempt, last: e });
                    }
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Issue requesting {} (attempt {}): {}; retrying in {:?}",
                    label,
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
