//! Longitudinal acceleration and yaw-rate derivation from successive beacon
//! samples.
//!
//! The position provider only reports speed and heading, so the beacon
//! generator differentiates them itself.  Each channel keeps the last value
//! and the time of the last derivative; a new derivative is computed only
//! when the value changed or at least [`MIN_SAMPLE_INTERVAL_SECS`] have
//! passed, which keeps rapid identical calls from producing noise.
//!
//! # Example
//!
//! ```rust
//! use camlink_facility::kinematics::KinematicEngine;
//! use camlink_types::{LONGITUDINAL_ACCELERATION_UNAVAILABLE, HEADING_UNAVAILABLE};
//!
//! let mut engine = KinematicEngine::new();
//! let first = engine.update(100, HEADING_UNAVAILABLE, 0.0);
//! assert_eq!(first.acceleration, LONGITUDINAL_ACCELERATION_UNAVAILABLE);
//!
//! let second = engine.update(105, HEADING_UNAVAILABLE, 0.1);
//! assert_eq!(second.acceleration, 50);
//! ```

use camlink_types::{
    HEADING_UNAVAILABLE, LONGITUDINAL_ACCELERATION_UNAVAILABLE, SPEED_UNAVAILABLE,
    YAW_RATE_UNAVAILABLE,
};

/// Minimum spacing between derivatives of an unchanged value.
pub const MIN_SAMPLE_INTERVAL_SECS: f64 = 1.0;

/// Largest magnitude of a valid longitudinal acceleration (0.1 m/s²).
pub const ACCELERATION_LIMIT: i64 = 160;

/// Largest magnitude of a valid yaw rate (0.01 °/s).
pub const YAW_RATE_LIMIT: i64 = 32766;

/// Output of one [`KinematicEngine::update`] call, in raw CAM units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kinematics {
    pub acceleration: i32,
    pub yaw_rate: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Single channel
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct DerivativeChannel {
    gain: i64,
    limit: i64,
    input_unavailable: i32,
    output_unavailable: i32,
    last_value: Option<i32>,
    last_sample: Option<f64>,
}

impl DerivativeChannel {
    fn new(gain: i64, limit: i64, input_unavailable: i32, output_unavailable: i32) -> Self {
        Self {
            gain,
            limit,
            input_unavailable,
            output_unavailable,
            last_value: None,
            last_sample: None,
        }
    }

    fn update(&mut self, value: i32, now: f64) -> i32 {
        // An unavailable input cannot serve as a baseline either.
        if value == self.input_unavailable {
            self.last_value = None;
            return self.output_unavailable;
        }

        let Some(last) = self.last_value else {
            self.last_value = Some(value);
            self.last_sample = Some(now);
            return self.output_unavailable;
        };

        let elapsed = now - self.last_sample.unwrap_or(now);
        let mut output = self.output_unavailable;
        if value != last || elapsed >= MIN_SAMPLE_INTERVAL_SECS {
            let derived = (value as i64 - last as i64) * self.gain;
            if (-self.limit..=self.limit).contains(&derived) {
                output = derived as i32;
            }
            self.last_sample = Some(now);
        }
        self.last_value = Some(value);
        output
    }

    fn reset(&mut self) {
        self.last_value = None;
        self.last_sample = None;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KinematicEngine
// ────────────────────────────────────────────────────────────────────────────

/// Stateful acceleration / yaw-rate derivation shared across beacon cycles.
#[derive(Debug, Clone)]
pub struct KinematicEngine {
    speed: DerivativeChannel,
    heading: DerivativeChannel,
}

impl Default for KinematicEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KinematicEngine {
    /// Create an engine with no baseline on either channel.
    pub fn new() -> Self {
        Self {
            speed: DerivativeChannel::new(
                10,
                ACCELERATION_LIMIT,
                SPEED_UNAVAILABLE,
                LONGITUDINAL_ACCELERATION_UNAVAILABLE,
            ),
            heading: DerivativeChannel::new(
                100,
                YAW_RATE_LIMIT,
                HEADING_UNAVAILABLE,
                YAW_RATE_UNAVAILABLE,
            ),
        }
    }

    /// Feed the current raw speed (0.01 m/s) and heading (0.1°) sampled at
    /// `now_secs` (seconds on a monotonic clock) and return the derived values.
    ///
    /// Derivatives outside `[-limit, limit]` are reported as unavailable.
    pub fn update(&mut self, speed: i32, heading: i32, now_secs: f64) -> Kinematics {
        Kinematics {
            acceleration: self.speed.update(speed, now_secs),
            yaw_rate: self.heading.update(heading, now_secs),
        }
    }

    /// Forget both baselines.
    pub fn reset(&mut self) {
        self.speed.reset();
        self.heading.reset();
    }
}
