//! [`MessageValidator`] – CAM data-model constraint checks.
//!
//! Before an [`AwarenessMessage`] is handed to the transport layer it is
//! passed through [`MessageValidator::validate`].  Every registered
//! [`Constraint`] is evaluated in order; the first violation returns a
//! [`CamError::Encode`] naming the offending field.
//!
//! [`MessageValidator::cam_defaults`] registers the header check plus one
//! [`RangeConstraint`] per numeric field, using the value ranges of the CAM
//! common data dictionary.

use camlink_types::{AwarenessMessage, CamError, MESSAGE_ID_CAM};

// ────────────────────────────────────────────────────────────────────────────
// Constraint trait
// ────────────────────────────────────────────────────────────────────────────

/// A single structural invariant an outbound message must satisfy.
pub trait Constraint: Send + Sync {
    /// Human-readable name used in error messages.
    fn name(&self) -> &str;

    /// Return `Ok(())` when `message` satisfies the invariant.
    fn check(&self, message: &AwarenessMessage) -> Result<(), CamError>;
}

// ────────────────────────────────────────────────────────────────────────────
// MessageValidator
// ────────────────────────────────────────────────────────────────────────────

/// Rule engine validating an [`AwarenessMessage`] against all registered
/// [`Constraint`]s.
///
/// # Example
///
/// ```
/// use camlink_facility::validator::MessageValidator;
/// use camlink_types::{AwarenessMessage, CoopAwareness};
///
/// let validator = MessageValidator::cam_defaults();
/// let mut msg = AwarenessMessage::new(1, CoopAwareness::default());
/// assert!(validator.validate(&msg).is_ok());
///
/// msg.cam.cam_parameters.high_frequency_container.speed.speed_value = 20_000;
/// assert!(validator.validate(&msg).is_err());
/// ```
#[derive(Default)]
pub struct MessageValidator {
    constraints: Vec<Box<dyn Constraint>>,
}

impl MessageValidator {
    /// Create a validator with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator carrying the full CAM constraint set.
    pub fn cam_defaults() -> Self {
        let mut validator = Self::new();
        validator.add_constraint(Box::new(HeaderConstraint));
        for rule in cam_ranges() {
            validator.add_constraint(Box::new(rule));
        }
        validator
    }

    /// Register a new [`Constraint`].  Constraints run in insertion order.
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    /// Number of registered constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Validate `message`, returning the first violation.
    pub fn validate(&self, message: &AwarenessMessage) -> Result<(), CamError> {
        for constraint in &self.constraints {
            constraint.check(message)?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in constraints
// ────────────────────────────────────────────────────────────────────────────

/// Rejects messages whose header does not identify a CAM.
pub struct HeaderConstraint;

impl Constraint for HeaderConstraint {
    fn name(&self) -> &str {
        "messageID"
    }

    fn check(&self, message: &AwarenessMessage) -> Result<(), CamError> {
        if message.header.message_id != MESSAGE_ID_CAM {
            return Err(CamError::Encode {
                field: self.name().to_string(),
                details: format!(
                    "message id {} is not a CAM ({MESSAGE_ID_CAM})",
                    message.header.message_id
                ),
            });
        }
        Ok(())
    }
}

/// Rejects messages where one numeric field leaves `[min, max]`.
pub struct RangeConstraint {
    /// ASN.1 field name reported on violation.
    pub field: &'static str,
    /// Inclusive lower bound.
    pub min: i64,
    /// Inclusive upper bound.
    pub max: i64,
    /// Reads the field from a message.
    pub extract: fn(&AwarenessMessage) -> i64,
}

impl Constraint for RangeConstraint {
    fn name(&self) -> &str {
        self.field
    }

    fn check(&self, message: &AwarenessMessage) -> Result<(), CamError> {
        let value = (self.extract)(message);
        if value < self.min || value > self.max {
            return Err(CamError::Encode {
                field: self.field.to_string(),
                details: format!("{value} outside [{}, {}]", self.min, self.max),
            });
        }
        Ok(())
    }
}

fn range(
    field: &'static str,
    min: i64,
    max: i64,
    extract: fn(&AwarenessMessage) -> i64,
) -> RangeConstraint {
    RangeConstraint {
        field,
        min,
        max,
        extract,
    }
}

/// Value ranges of every bounded numeric CAM field.
fn cam_ranges() -> Vec<RangeConstraint> {
    vec![
        range("stationType", 0, 255, |m| {
            m.cam.cam_parameters.basic_container.station_type as i64
        }),
        range("latitude", -900_000_000, 900_000_001, |m| {
            m.position().latitude as i64
        }),
        range("longitude", -1_800_000_000, 1_800_000_001, |m| {
            m.position().longitude as i64
        }),
        range("semiMajorConfidence", 0, 4095, |m| {
            m.position().position_confidence_ellipse.semi_major_confidence as i64
        }),
        range("semiMinorConfidence", 0, 4095, |m| {
            m.position().position_confidence_ellipse.semi_minor_confidence as i64
        }),
        range("semiMajorOrientation", 0, 3601, |m| {
            m.position().position_confidence_ellipse.semi_major_orientation as i64
        }),
        range("altitudeValue", -100_000, 800_001, |m| {
            m.position().altitude.altitude_value as i64
        }),
        range("altitudeConfidence", 0, 15, |m| {
            m.position().altitude.altitude_confidence as i64
        }),
        range("headingValue", 0, 3601, |m| {
            m.vehicle().heading.heading_value as i64
        }),
        range("headingConfidence", 1, 127, |m| {
            m.vehicle().heading.heading_confidence as i64
        }),
        range("speedValue", 0, 16383, |m| m.vehicle().speed.speed_value as i64),
        range("speedConfidence", 1, 127, |m| {
            m.vehicle().speed.speed_confidence as i64
        }),
        range("vehicleLengthValue", 1, 1023, |m| {
            m.vehicle().vehicle_length.vehicle_length_value as i64
        }),
        range("vehicleWidth", 1, 62, |m| m.vehicle().vehicle_width as i64),
        range("longitudinalAccelerationValue", -160, 161, |m| {
            m.vehicle()
                .longitudinal_acceleration
                .longitudinal_acceleration_value as i64
        }),
        range("longitudinalAccelerationConfidence", 0, 102, |m| {
            m.vehicle()
                .longitudinal_acceleration
                .longitudinal_acceleration_confidence as i64
        }),
        range("curvatureValue", -1023, 1023, |m| {
            m.vehicle().curvature.curvature_value as i64
        }),
        range("curvatureConfidence", 0, 7, |m| {
            m.vehicle().curvature.curvature_confidence as i64
        }),
        range("yawRateValue", -32766, 32767, |m| {
            m.vehicle().yaw_rate.yaw_rate_value as i64
        }),
        range("yawRateConfidence", 0, 8, |m| {
            m.vehicle().yaw_rate.yaw_rate_confidence as i64
        }),
    ]
}
