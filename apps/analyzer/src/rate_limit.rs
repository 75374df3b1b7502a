//! Pacing for the shared text-generation service: a minimum interval between
//! consecutive requests instead of unconditional sleeps, so tests run with a
//! zero interval.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum interval between consecutive requests. The first call
/// never waits; later calls sleep out the remainder of the interval.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// A limiter that never waits. Used by tests.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Blocks until the configured interval has elapsed since the previous
    /// call, then records the new request time.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}
