//! Scale-factor and sentinel mapping between raw CAM units and the
//! physical units used on the scaled JSON topics.
//!
//! Every scaled field is described by a [`FieldDescriptor`]: a decimal
//! divisor and up to two sentinel integers meaning "unavailable".  Sentinels
//! cross the boundary unscaled in both directions; everything else is
//! divided on the way out and multiplied (then rounded) on the way in.
//!
//! # Example
//!
//! ```rust
//! use camlink_facility::value_codec::{self, ExternalValue, SPEED};
//!
//! assert_eq!(value_codec::to_external(1234, &SPEED), ExternalValue::Real(12.34));
//! assert_eq!(value_codec::to_external(16383, &SPEED), ExternalValue::Integer(16383));
//! assert_eq!(value_codec::to_internal(12.34, &SPEED), 1234);
//! ```

use serde::{Deserialize, Serialize};

/// Scale and sentinel description of one scaled field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Key used on the scaled JSON shape.
    pub name: &'static str,
    /// Raw units per external unit (always a power of ten).
    pub scale: f64,
    /// Raw values that mean "unavailable" and bypass scaling.
    pub sentinels: &'static [i64],
}

impl FieldDescriptor {
    /// `true` when `raw` is one of this field's sentinels.
    pub fn is_sentinel(&self, raw: i64) -> bool {
        self.sentinels.contains(&raw)
    }
}

pub const LATITUDE: FieldDescriptor = FieldDescriptor {
    name: "latitude",
    scale: 1e7,
    sentinels: &[900_000_001],
};

pub const LONGITUDE: FieldDescriptor = FieldDescriptor {
    name: "longitude",
    scale: 1e7,
    sentinels: &[1_800_000_001],
};

pub const ALTITUDE: FieldDescriptor = FieldDescriptor {
    name: "altitude",
    scale: 1e2,
    sentinels: &[800_001],
};

pub const HEADING: FieldDescriptor = FieldDescriptor {
    name: "heading",
    scale: 1e1,
    sentinels: &[3601],
};

pub const HEADING_CONFIDENCE: FieldDescriptor = FieldDescriptor {
    name: "headingConf",
    scale: 1e1,
    sentinels: &[126, 127],
};

pub const SPEED: FieldDescriptor = FieldDescriptor {
    name: "speed",
    scale: 1e2,
    sentinels: &[16383],
};

pub const SPEED_CONFIDENCE: FieldDescriptor = FieldDescriptor {
    name: "speedConf",
    scale: 1e2,
    sentinels: &[126, 127],
};

pub const VEHICLE_LENGTH: FieldDescriptor = FieldDescriptor {
    name: "length",
    scale: 1e1,
    sentinels: &[1023],
};

/// 61 ("6.1 m or wider") and 62 (unavailable) both pass through verbatim.
pub const VEHICLE_WIDTH: FieldDescriptor = FieldDescriptor {
    name: "width",
    scale: 1e1,
    sentinels: &[61, 62],
};

pub const LONGITUDINAL_ACCELERATION: FieldDescriptor = FieldDescriptor {
    name: "acceleration",
    scale: 1e1,
    sentinels: &[161],
};

pub const YAW_RATE: FieldDescriptor = FieldDescriptor {
    name: "yawRate",
    scale: 1e2,
    sentinels: &[32767],
};

/// Curvature is carried unscaled on the scaled shape.
pub const CURVATURE: FieldDescriptor = FieldDescriptor {
    name: "curvature",
    scale: 1.0,
    sentinels: &[1023],
};

/// Every scaled field, in the order they appear on the scaled shape.
pub const SCALED_FIELDS: [FieldDescriptor; 12] = [
    LATITUDE,
    LONGITUDE,
    ALTITUDE,
    HEADING,
    HEADING_CONFIDENCE,
    SPEED,
    SPEED_CONFIDENCE,
    VEHICLE_LENGTH,
    VEHICLE_WIDTH,
    LONGITUDINAL_ACCELERATION,
    YAW_RATE,
    CURVATURE,
];

// ────────────────────────────────────────────────────────────────────────────
// External value
// ────────────────────────────────────────────────────────────────────────────

/// A value as it appears on the scaled JSON shape.
///
/// Sentinels are emitted as JSON integers so they compare equal to the raw
/// sentinel on the consumer side; scaled values are JSON floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalValue {
    Integer(i64),
    Real(f64),
}

impl ExternalValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ExternalValue::Integer(v) => v as f64,
            ExternalValue::Real(v) => v,
        }
    }
}

impl From<f64> for ExternalValue {
    fn from(v: f64) -> Self {
        ExternalValue::Real(v)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Conversions
// ────────────────────────────────────────────────────────────────────────────

/// Convert a raw encoded value to its external representation.
///
/// Sentinels and values of unscaled fields stay integers.
pub fn to_external(raw: i64, field: &FieldDescriptor) -> ExternalValue {
    if field.is_sentinel(raw) || field.scale == 1.0 {
        ExternalValue::Integer(raw)
    } else {
        ExternalValue::Real(raw as f64 / field.scale)
    }
}

/// Convert an external value back to raw encoded units.
///
/// Values equal to a sentinel pass through unscaled; all others are
/// multiplied by the scale and rounded to the nearest integer.  Non-finite
/// input maps to `0` and out-of-range input saturates at the `i64` bounds,
/// so the conversion never panics.
pub fn to_internal(external: f64, field: &FieldDescriptor) -> i64 {
    if let Some(sentinel) = field
        .sentinels
        .iter()
        .copied()
        .find(|s| *s as f64 == external)
    {
        return sentinel;
    }
    // `as` saturates on overflow and maps NaN to zero.
    (external * field.scale).round() as i64
}

/// [`to_internal`] narrowed to the `i32` used by the message model.
/// Out-of-range results saturate; the validator reports them.
pub fn to_internal_i32(external: f64, field: &FieldDescriptor) -> i32 {
    to_internal(external, field).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
