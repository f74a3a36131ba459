//! Request pacing and retry policy
//!
//! The pacer guarantees a minimum interval between outbound requests so the
//! listing sites are not hammered; the retry policy bounds how many times a
//! whole search-page cycle is attempted.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Enforces a minimum interval between consecutive outbound requests
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the interval since the previous request has elapsed, then
    /// record a new request.
    pub async fn wait(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                debug!("Pacing outbound request for {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `operation` until it succeeds or the attempt budget is spent,
    /// returning the last error in the latter case.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            warn!(
                "Error processing {} (attempt {}/{}): {}",
                label, attempt, max_attempts, error
            );
            if attempt >= max_attempts {
                return Err(error);
            }

            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}
