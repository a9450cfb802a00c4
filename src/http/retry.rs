//! Retry policy and response classification.

use std::time::Duration;

use crate::error::FetchError;

/// Default number of attempts for a fetch call.
pub const MAX_RETRIES: usize = 3;

/// Default delay before the second attempt, in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// How many attempts a fetch makes and how long it waits between them.
///
/// `max_retries` is the total number of attempts, not the number of retries
/// after the first one. The delay doubles after every failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, retry_delay: Duration) -> Result<Self, FetchError> {
        if max_retries == 0 {
            return Err(FetchError::invalid_parameter(
                "max_retries must be at least 1",
            ));
        }
        if retry_delay.is_zero() {
            return Err(FetchError::invalid_parameter(
                "retry_delay must be greater than 0",
            ));
        }
        Ok(Self {
            max_retries,
            retry_delay,
        })
    }

    /// Builds a policy from a delay in (possibly fractional) seconds.
    pub fn from_secs_f64(max_retries: usize, retry_delay: f64) -> Result<Self, FetchError> {
        if !retry_delay.is_finite() || retry_delay <= 0.0 {
            return Err(FetchError::invalid_parameter(
                "retry_delay must be greater than 0",
            ));
        }
        let retry_delay = Duration::try_from_secs_f64(retry_delay).map_err(|e| {
            FetchError::invalid_parameter(format!("retry_delay is out of range: {}", e))
        })?;
        Self::new(max_retries, retry_delay)
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Sleep after the zero-based `attempt` failed: `retry_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor)
    }
}

/// What a single response status means for the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// HTTP 200; the payload still has to be extracted.
    Success,
    /// HTTP 429.
    RateLimited,
    /// Any other status.
    Failed(u16),
}

pub fn classify_status(status: u16) -> Outcome {
    match status {
        200 => Outcome::Success,
        429 => Outcome::RateLimited,
        other => Outcome::Failed(other),
    }
}
