//! Runtime clock for generation timestamps and derivative timing.
//!
//! Generation timestamps are taken from a monotonic [`tokio::time::Instant`]
//! anchored once to the ITS epoch, so they never jump with wall-clock
//! adjustments and follow paused time in tests.  Wall-clock seconds are only
//! used for reception stamps and latency accounting.

use chrono::Utc;
use tokio::time::Instant;

/// Unix time of the ITS epoch, 2004-01-01T00:00:00Z, in milliseconds.
pub const ITS_EPOCH_UNIX_MS: i64 = 1_072_915_200_000;

#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    origin: Instant,
    origin_its_ms: u64,
}

impl RuntimeClock {
    /// Anchor the clock to the current wall-clock time.
    pub fn new() -> Self {
        let its_ms = Utc::now().timestamp_millis() - ITS_EPOCH_UNIX_MS;
        Self::starting_at(its_ms.max(0) as u64)
    }

    /// Anchor the clock so that "now" reads `its_ms` milliseconds since the
    /// ITS epoch.
    pub fn starting_at(its_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            origin_its_ms: its_ms,
        }
    }

    /// Milliseconds since the ITS epoch.
    pub fn its_millis(&self) -> u64 {
        self.origin_its_ms + self.origin.elapsed().as_millis() as u64
    }

    /// The CAM generation delta time: ITS milliseconds modulo 65 536.
    pub fn generation_delta_time(&self) -> u16 {
        (self.its_millis() % 65_536) as u16
    }

    /// Monotonic seconds since the clock was created.
    pub fn monotonic_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    /// Wall-clock seconds since the Unix epoch, microsecond resolution.
    pub fn wall_secs(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn generation_delta_time_wraps() {
        let clock = RuntimeClock::starting_at(65_530);
        assert_eq!(clock.generation_delta_time(), 65_530);
        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(clock.its_millis(), 65_540);
        assert_eq!(clock.generation_delta_time(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn monotonic_follows_paused_time() {
        let clock = RuntimeClock::starting_at(0);
        assert_eq!(clock.monotonic_secs(), 0.0);
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!((clock.monotonic_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn wall_clock_is_after_its_epoch() {
        let clock = RuntimeClock::new();
        assert!(clock.wall_secs() * 1000.0 > ITS_EPOCH_UNIX_MS as f64);
    }
}
