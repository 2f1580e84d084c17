//! Retry engine: exponential backoff shared by the OCR and search calls.

use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Multiplier applied per failed attempt.
    pub backoff_factor: f64,
    /// Maximum delay cap in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            backoff_factor: 2.0,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `failed_attempt`-th failure (1-indexed):
    /// `base * factor^n`, so 2s, 4s, 8s, 16s with the defaults.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        if failed_attempt == 0 {
            return Duration::ZERO;
        }
        let delay_ms = self.base_delay_ms as f64 * self.backoff_factor.powi(failed_attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}

/// Source of backoff waits. Swapped out in tests so no real time passes.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap_or_else(|e| e.into_inner()).push(duration);
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RetryError<E> {
    #[error("failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: E },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

/// Run `op` until it succeeds, the policy is exhausted, or `cancel` fires.
///
/// `op` receives the 1-indexed attempt number. Every error counts as
/// transient. Cancellation drops the in-flight future and any pending wait.
pub async fn with_retry<T, E, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(RetryError::Cancelled { attempts: attempt - 1 });
            }
            outcome = op(attempt) => outcome,
        };

        let err = match outcome {
            Ok(value) => {
                if attempt > 1 {
                    debug!(call = label, attempt, "call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if attempt >= max_attempts {
            warn!(call = label, attempt, error = %err, "retry policy exhausted");
            return Err(RetryError::Exhausted { attempts: attempt, last_error: err });
        }

        let delay = policy.delay_for(attempt);
        warn!(
            call = label,
            attempt,
            max = max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "call failed, will retry"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            _ = sleeper.sleep(delay) => {}
        }
    }
}
