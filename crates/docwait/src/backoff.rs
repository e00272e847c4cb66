//! Delay policy between successive status queries.

use std::time::Duration;

/// Decides how long the poller sleeps before query number `attempt`
/// (the first query is attempt 0 and is never delayed by the poller).
pub trait Backoff: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

/// Constant delay between queries. The default policy, 5 seconds.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedInterval {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Backoff for FixedInterval {
    fn delay(&self, _attempt: u32) -> Duration {
        self.interval
    }
}

/// Delay doubled per attempt up to a cap.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        // Shift clamped so the multiplier cannot overflow.
        let delay = self.base * (1u32 << attempt.min(10));
        delay.min(self.cap)
    }
}
