//! Retry policy for scanner runs.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// How often, and how patiently, a failed scan is re-attempted.
///
/// The default makes two attempts with no delay between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    pub delay_ms: u64,

    /// Multiplier applied to the delay for each further retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay_ms: 0,
            backoff_multiplier: 1.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier.max(1.0);
        self
    }

    /// Delay to wait before the given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 || self.delay_ms == 0 {
            return Duration::ZERO;
        }
        let delay = self.delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(attempt as i32 - 1);
        Duration::from_millis(delay as u64)
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts.max(1)
    }
}

/// Runs `operation` until it succeeds or the policy is exhausted.
///
/// The closure receives the 0-indexed attempt number. The last error is
/// returned when every attempt fails.
pub fn retry<T, E, F>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if !config.should_retry(attempt) {
                    return Err(e);
                }
                warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    "scan failed, retrying"
                );
            }
        }
    }
}
