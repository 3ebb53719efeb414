//! Position-fix provider seam and raw-unit sanitisation.
//!
//! The beacon generator samples a [`PositionProvider`] once per cycle.  A
//! fix carries physical units (degrees, metres, m/s); [`PositionFix`]
//! converts them to raw CAM units, replacing anything missing or out of
//! range with the matching "unavailable" sentinel.

use std::sync::Mutex;

use camlink_types::{
    ALTITUDE_CONFIDENCE_UNAVAILABLE, Altitude, HEADING_UNAVAILABLE, PosConfidenceEllipse,
    ReferencePosition, SEMI_AXIS_LENGTH_UNAVAILABLE, SPEED_UNAVAILABLE,
};
use serde::{Deserialize, Serialize};

/// Largest encodable speed (0.01 m/s); 16383 is the sentinel.
pub const SPEED_MAX_RAW: i32 = 16382;

/// Largest encodable heading (0.1°); 3601 is the sentinel.
pub const HEADING_MAX_RAW: i32 = 3600;

/// Semi-axis value meaning "larger than representable" (cm).
pub const SEMI_AXIS_OUT_OF_RANGE: i32 = 4094;

const ALTITUDE_MIN_RAW: i64 = -100_000;
const ALTITUDE_MAX_RAW: i64 = 800_000;

/// Horizontal position confidence ellipse in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEllipse {
    pub semi_major_m: f64,
    pub semi_minor_m: f64,
    pub orientation_deg: f64,
}

/// One sample from a GNSS/INS source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: Option<f64>,
    pub confidence: Option<ConfidenceEllipse>,
    pub speed_mps: Option<f64>,
    pub course_deg: Option<f64>,
}

impl PositionFix {
    /// Speed in 0.01 m/s, or [`SPEED_UNAVAILABLE`] when missing or outside
    /// `[0, 163.82]` m/s.
    pub fn raw_speed(&self) -> i32 {
        self.speed_mps
            .and_then(|v| scaled_in_range(v, 100.0, 0, SPEED_MAX_RAW as i64))
            .map_or(SPEED_UNAVAILABLE, |v| v as i32)
    }

    /// Course over ground in 0.1°, or [`HEADING_UNAVAILABLE`] when missing
    /// or outside `[0, 360]`.
    pub fn raw_heading(&self) -> i32 {
        self.course_deg
            .and_then(|v| scaled_in_range(v, 10.0, 0, HEADING_MAX_RAW as i64))
            .map_or(HEADING_UNAVAILABLE, |v| v as i32)
    }

    /// The reference position of a CAM basic container.
    pub fn reference_position(&self) -> ReferencePosition {
        let mut pos = ReferencePosition::default();
        if let Some(lat) = scaled_in_range(self.latitude_deg, 1e7, -900_000_000, 900_000_000) {
            pos.latitude = lat as i32;
        }
        if let Some(lon) = scaled_in_range(self.longitude_deg, 1e7, -1_800_000_000, 1_800_000_000)
        {
            pos.longitude = lon as i32;
        }
        if let Some(ellipse) = self.confidence {
            pos.position_confidence_ellipse = raw_ellipse(&ellipse);
        }
        if let Some(alt) = self.altitude_m.filter(|v| v.is_finite()) {
            let raw = ((alt * 100.0).round() as i64).clamp(ALTITUDE_MIN_RAW, ALTITUDE_MAX_RAW);
            pos.altitude = Altitude {
                altitude_value: raw as i32,
                altitude_confidence: ALTITUDE_CONFIDENCE_UNAVAILABLE,
            };
        }
        pos
    }
}

fn scaled_in_range(value: f64, scale: f64, min: i64, max: i64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let raw = (value * scale).round() as i64;
    (min..=max).contains(&raw).then_some(raw)
}

fn raw_semi_axis(metres: f64) -> i32 {
    if !metres.is_finite() || metres < 0.0 {
        return SEMI_AXIS_LENGTH_UNAVAILABLE;
    }
    ((metres * 100.0).round() as i64).min(SEMI_AXIS_OUT_OF_RANGE as i64) as i32
}

fn raw_ellipse(ellipse: &ConfidenceEllipse) -> PosConfidenceEllipse {
    PosConfidenceEllipse {
        semi_major_confidence: raw_semi_axis(ellipse.semi_major_m),
        semi_minor_confidence: raw_semi_axis(ellipse.semi_minor_m),
        semi_major_orientation: scaled_in_range(
            ellipse.orientation_deg,
            10.0,
            0,
            HEADING_MAX_RAW as i64,
        )
        .map_or(HEADING_UNAVAILABLE, |v| v as i32),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider seam
// ────────────────────────────────────────────────────────────────────────────

/// Source of the local station's position, sampled once per beacon cycle.
pub trait PositionProvider: Send + Sync {
    fn position_fix(&self) -> PositionFix;
}

/// Provider returning a configured fix, replaceable at runtime.
///
/// # Example
///
/// ```
/// use camlink_facility::position::{PositionFix, PositionProvider, StaticPositionProvider};
///
/// let provider = StaticPositionProvider::new(PositionFix {
///     latitude_deg: 40.6,
///     longitude_deg: -8.65,
///     speed_mps: Some(13.9),
///     ..PositionFix::default()
/// });
/// assert_eq!(provider.position_fix().raw_speed(), 1390);
/// ```
#[derive(Debug, Default)]
pub struct StaticPositionProvider {
    fix: Mutex<PositionFix>,
}

impl StaticPositionProvider {
    pub fn new(fix: PositionFix) -> Self {
        Self {
            fix: Mutex::new(fix),
        }
    }

    /// Replace the fix returned by subsequent samples.
    pub fn set_fix(&self, fix: PositionFix) {
        let mut guard = self.fix.lock().unwrap_or_else(|e| e.into_inner());
        *guard = fix;
    }
}

impl PositionProvider for StaticPositionProvider {
    fn position_fix(&self) -> PositionFix {
        *self.fix.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camlink_types::{ALTITUDE_UNAVAILABLE, LATITUDE_UNAVAILABLE};

    #[test]
    fn speed_sanitisation() {
        let mut fix = PositionFix::default();
        assert_eq!(fix.raw_speed(), SPEED_UNAVAILABLE);
        fix.speed_mps = Some(13.89);
        assert_eq!(fix.raw_speed(), 1389);
        fix.speed_mps = Some(163.82);
        assert_eq!(fix.raw_speed(), 16382);
        fix.speed_mps = Some(200.0);
        assert_eq!(fix.raw_speed(), SPEED_UNAVAILABLE);
        fix.speed_mps = Some(-0.5);
        assert_eq!(fix.raw_speed(), SPEED_UNAVAILABLE);
        fix.speed_mps = Some(f64::NAN);
        assert_eq!(fix.raw_speed(), SPEED_UNAVAILABLE);
    }

    #[test]
    fn heading_sanitisation() {
        let mut fix = PositionFix::default();
        assert_eq!(fix.raw_heading(), HEADING_UNAVAILABLE);
        fix.course_deg = Some(90.0);
        assert_eq!(fix.raw_heading(), 900);
        fix.course_deg = Some(360.0);
        assert_eq!(fix.raw_heading(), 3600);
        fix.course_deg = Some(361.0);
        assert_eq!(fix.raw_heading(), HEADING_UNAVAILABLE);
    }

    #[test]
    fn reference_position_without_optional_parts() {
        let fix = PositionFix {
            latitude_deg: 40.6332,
            longitude_deg: -8.6601,
            ..PositionFix::default()
        };
        let pos = fix.reference_position();
        assert_eq!(pos.latitude, 406_332_000);
        assert_eq!(pos.longitude, -86_601_000);
        assert_eq!(pos.altitude.altitude_value, ALTITUDE_UNAVAILABLE);
        assert_eq!(
            pos.position_confidence_ellipse,
            PosConfidenceEllipse::default()
        );
    }

    #[test]
    fn reference_position_with_confidence_and_altitude() {
        let fix = PositionFix {
            latitude_deg: 1.0,
            longitude_deg: 2.0,
            altitude_m: Some(12.34),
            confidence: Some(ConfidenceEllipse {
                semi_major_m: 3.5,
                semi_minor_m: 100.0,
                orientation_deg: 45.0,
            }),
            ..PositionFix::default()
        };
        let pos = fix.reference_position();
        assert_eq!(pos.altitude.altitude_value, 1234);
        assert_eq!(pos.position_confidence_ellipse.semi_major_confidence, 350);
        assert_eq!(
            pos.position_confidence_ellipse.semi_minor_confidence,
            SEMI_AXIS_OUT_OF_RANGE
        );
        assert_eq!(pos.position_confidence_ellipse.semi_major_orientation, 450);
    }

    #[test]
    fn out_of_range_latitude_is_unavailable() {
        let fix = PositionFix {
            latitude_deg: 95.0,
            ..PositionFix::default()
        };
        assert_eq!(fix.reference_position().latitude, LATITUDE_UNAVAILABLE);
    }

    #[test]
    fn static_provider_can_be_updated() {
        let provider = StaticPositionProvider::default();
        assert_eq!(provider.position_fix().raw_speed(), SPEED_UNAVAILABLE);
        provider.set_fix(PositionFix {
            speed_mps: Some(1.0),
            ..PositionFix::default()
        });
        assert_eq!(provider.position_fix().raw_speed(), 100);
    }
}
