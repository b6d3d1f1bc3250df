//! Rate limiter for outgoing Telegram messages.
//!
//! Enforces a minimum interval between sends so a burst of command
//! replies does not trigger Telegram's flood wait errors.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Rate limiter that enforces minimum intervals between sends.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum duration between allowed sends.
    min_interval: Duration,

    /// Last time a message was sent.
    last_send: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_send: Mutex::new(None),
        }
    }

    /// Creates a rate limiter from seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Waits until a send is allowed, then records it.
    ///
    /// Returns the duration waited (0 if no wait was needed).
    pub async fn wait_and_acquire(&self) -> Duration {
        let mut last = self.last_send.lock().await;

        let wait_duration = match *last {
            Some(last_time) => {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    self.min_interval - elapsed
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };

        if !wait_duration.is_zero() {
            debug!("Rate limiter: waiting {:?} before next send", wait_duration);
            tokio::time::sleep(wait_duration).await;
        }

        *last = Some(Instant::now());
        wait_duration
    }

    /// Checks if a send is currently allowed without blocking.
    pub async fn is_allowed(&self) -> bool {
        let last = self.last_send.lock().await;
        match *last {
            Some(last_time) => last_time.elapsed() >= self.min_interval,
            None => true,
        }
    }

    /// Time remaining until the next send is allowed.
    pub async fn time_until_allowed(&self) -> Duration {
        let last = self.last_send.lock().await;
        match *last {
            Some(last_time) => {
                let elapsed = last_time.elapsed();
                if elapsed >= self.min_interval {
                    Duration::ZERO
                } else {
                    self.min_interval - elapsed
                }
            }
            None => Duration::ZERO,
        }
    }

    /// Honors a flood wait reported by Telegram before allowing the
    /// next send.
    pub async fn handle_flood_wait(&self, wait_seconds: u32) {
        warn!(
            "Received flood wait from Telegram: {} seconds",
            wait_seconds
        );
        tokio::time::sleep(Duration::from_secs(u64::from(wait_seconds))).await;

        let mut last = self.last_send.lock().await;
        *last = Some(Instant::now());
    }

    /// Resets the rate limiter, allowing an immediate send.
    pub async fn reset(&self) {
        let mut last = self.last_send.lock().await;
        *last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_send_is_free() {
        let limiter = RateLimiter::from_secs(1);
        assert!(limiter.is_allowed().await);

        let waited = limiter.wait_and_acquire().await;
        assert_eq!(waited, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_subsequent_send_is_throttled() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.wait_and_acquire().await;

        assert!(!limiter.is_allowed().await);
        let remaining = limiter.time_until_allowed().await;
        assert!(remaining > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_reset_allows_immediate_send() {
        let limiter = RateLimiter::new(Duration::from_secs(60));

        limiter.wait_and_acquire().await;
        assert!(!limiter.is_allowed().await);

        limiter.reset().await;
        assert!(limiter.is_allowed().await);
    }
}
