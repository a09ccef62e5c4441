//! Launch-rate limiter shared by every check of a run.
//!
//! A leaky bucket in its "theoretical arrival time" form: each permit pushes
//! the next conforming instant forward by one interval, and up to `burst`
//! permits may be taken back to back.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::error::ConfigError;

/// Spacing between successive check launches used when none is configured.
pub const DEFAULT_LAUNCH_INTERVAL: Duration = Duration::from_millis(10);

/// Burst capacity used when none is configured.
pub const DEFAULT_BURST: u32 = 1;

/// Throttles how often callers may proceed.
///
/// Waiters are served in FIFO order. Uses tokio's clock, so tests can drive
/// it with a paused runtime instead of real sleeps.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    burst: u32,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Allow one permit per `interval`, with up to `burst` taken at once.
    ///
    /// A zero interval disables throttling.
    pub fn new(interval: Duration, burst: u32) -> Result<Self, ConfigError> {
        if burst == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "burst must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            interval,
            burst,
            next_slot: Mutex::new(None),
        })
    }

    /// Allow `per_second` permits per second.
    pub fn per_second(per_second: u32, burst: u32) -> Result<Self, ConfigError> {
        if per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "rate must be at least 1 per second".to_string(),
            ));
        }
        Self::new(Duration::from_secs(1) / per_second, burst)
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self {
            interval: Duration::ZERO,
            burst: 1,
            next_slot: Mutex::new(None),
        }
    }

    /// Minimum spacing between permits.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Burst capacity.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Wait until a permit is available, then take it.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = next_slot.map_or(now, |slot| slot.max(now));
        let allowance = self.interval * (self.burst - 1);
        let ready_at = slot.checked_sub(allowance).unwrap_or(now);
        if ready_at > now {
            sleep_until(ready_at).await;
        }
        *next_slot = Some(slot + self.interval);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self {
            interval: DEFAULT_LAUNCH_INTERVAL,
            burst: DEFAULT_BURST,
            next_slot: Mutex::new(None),
        }
    }
}
