//! Retry utilities for provider requests.
//!
//! Every failure is retried (transport errors, non-2xx statuses, malformed
//! bodies) up to a fixed count. Attempts are sequential and, by default,
//! resubmitted immediately.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use pollcast_core::WeatherConfig;

/// Default number of additional attempts after the first failure
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first one
    pub max_retries: u32,
    /// Fixed pause before each retry
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }

    /// Total number of attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Run `operation` until it succeeds or the policy's retries are exhausted.
///
/// Returns the last error when every attempt failed.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "{} failed on attempt {} of {}: {}",
                    operation_name,
                    attempt,
                    policy.max_attempts(),
                    e
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(e) => {
                tracing::error!(
                    "{} failed, all {} attempts exhausted: {}",
                    operation_name,
                    policy.max_attempts(),
                    e
                );
                return Err(e);
            }
        }
    }
}
