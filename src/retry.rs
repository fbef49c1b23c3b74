//! Retry controller: status classification and exponential backoff

use crate::{
    constants::{DEFAULT_MAX_RETRIES, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, NON_RETRYABLE_STATUSES},
    error::{ClientError, FailureKind},
};
use backoff::{backoff::Backoff, ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Outcome of a failed attempt
#[derive(Debug)]
pub enum AttemptError {
    /// Returned to the caller immediately
    Fatal(ClientError),
    /// Eligible for another attempt
    Retryable(FailureKind),
}

/// True for statuses that are answered once and never retried
pub fn is_non_retryable_status(status: u16) -> bool {
    NON_RETRYABLE_STATUSES.contains(&status)
}

/// How many times to retry and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Fresh backoff schedule for one call: doubling from the base delay,
    /// capped at the max delay, no jitter and no elapsed-time limit
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            max_interval: self.max_delay,
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let mut backoff = self.backoff();
        (0..retry.max(1))
            .filter_map(|_| backoff.next_backoff())
            .last()
            .unwrap_or(self.max_delay)
    }

    /// Runs `attempt` until it succeeds, fails fatally or runs out of retries
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, ClientError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts();
        let mut backoff = self.backoff();
        let mut attempt_no = 1;

        loop {
            match attempt(attempt_no).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(err)) => {
                    tracing::warn!(
                        operation = operation,
                        attempt = attempt_no,
                        error = %err,
                        "Non-retryable failure"
                    );
                    return Err(err);
                }
                Err(AttemptError::Retryable(kind)) => {
                    if attempt_no >= max_attempts {
                        tracing::warn!(
                            operation = operation,
                            attempt = attempt_no,
                            max_attempts = max_attempts,
                            error = %kind,
                            "Retries exhausted"
                        );
                        return Err(ClientError::ExecutionFailed {
                            attempts: attempt_no,
                            last: kind,
                        });
                    }

                    let delay = backoff.next_backoff().unwrap_or(self.max_delay);
                    tracing::warn!(
                        operation = operation,
                        attempt = attempt_no,
                        max_attempts = max_attempts,
                        error = %kind,
                        delay_ms = delay.as_millis() as u64,
                        "Attempt failed, retrying"
                    );
                    sleep(delay).await;
                    attempt_no += 1;
                }
            }
        }
    }
}
