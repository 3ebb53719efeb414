//! Cooperative Awareness Message data model.
//!
//! Field names serialise to the camelCase identifiers of the CAM ASN.1
//! module, so the JSON form of these structs is the "full-fidelity" shape
//! exchanged on the full CAM topics.  All raw values are kept in their
//! encoded units (e.g. latitude in 0.1 micro-degrees, speed in 0.01 m/s);
//! range checking is left to the facility-layer validator.

use serde::{Deserialize, Serialize};

/// ITS PDU protocol version emitted by this facility.
pub const PROTOCOL_VERSION: u8 = 2;

/// ITS PDU message identifier of a CAM.
pub const MESSAGE_ID_CAM: u8 = 2;

// ────────────────────────────────────────────────────────────────────────────
// "Unavailable" sentinels
// ────────────────────────────────────────────────────────────────────────────

pub const LATITUDE_UNAVAILABLE: i32 = 900_000_001;
pub const LONGITUDE_UNAVAILABLE: i32 = 1_800_000_001;
pub const ALTITUDE_UNAVAILABLE: i32 = 800_001;
pub const ALTITUDE_CONFIDENCE_UNAVAILABLE: i32 = 15;
pub const SEMI_AXIS_LENGTH_UNAVAILABLE: i32 = 4095;
pub const HEADING_UNAVAILABLE: i32 = 3601;
pub const HEADING_CONFIDENCE_UNAVAILABLE: i32 = 127;
pub const SPEED_UNAVAILABLE: i32 = 16383;
pub const SPEED_CONFIDENCE_UNAVAILABLE: i32 = 127;
pub const VEHICLE_LENGTH_UNAVAILABLE: i32 = 1023;
pub const VEHICLE_WIDTH_UNAVAILABLE: i32 = 62;
pub const LONGITUDINAL_ACCELERATION_UNAVAILABLE: i32 = 161;
pub const ACCELERATION_CONFIDENCE_UNAVAILABLE: i32 = 102;
pub const CURVATURE_UNAVAILABLE: i32 = 1023;
pub const CURVATURE_CONFIDENCE_UNAVAILABLE: i32 = 7;
pub const YAW_RATE_UNAVAILABLE: i32 = 32767;
pub const YAW_RATE_CONFIDENCE_UNAVAILABLE: i32 = 8;

/// Station type "passenger car".
pub const STATION_TYPE_PASSENGER_CAR: i32 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Message
// ────────────────────────────────────────────────────────────────────────────

/// A complete CAM: ITS PDU header plus the cooperative-awareness body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwarenessMessage {
    pub header: ItsPduHeader,
    pub cam: CoopAwareness,
}

impl AwarenessMessage {
    /// Wrap `cam` in a header for `station_id` using the current protocol
    /// version and the CAM message identifier.
    pub fn new(station_id: u32, cam: CoopAwareness) -> Self {
        Self {
            header: ItsPduHeader {
                protocol_version: PROTOCOL_VERSION,
                message_id: MESSAGE_ID_CAM,
                station_id,
            },
            cam,
        }
    }

    /// Originating station identifier.
    pub fn station_id(&self) -> u32 {
        self.header.station_id
    }

    /// Shortcut to the basic vehicle high-frequency container.
    pub fn vehicle(&self) -> &BasicVehicleContainerHighFrequency {
        &self.cam.cam_parameters.high_frequency_container
    }

    /// Shortcut to the reference position.
    pub fn position(&self) -> &ReferencePosition {
        &self.cam.cam_parameters.basic_container.reference_position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItsPduHeader {
    pub protocol_version: u8,
    #[serde(rename = "messageID")]
    pub message_id: u8,
    #[serde(rename = "stationID")]
    pub station_id: u32,
}

/// The cooperative-awareness body of a CAM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoopAwareness {
    /// Milliseconds of the runtime clock modulo 65 536.
    pub generation_delta_time: u16,
    pub cam_parameters: CamParameters,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CamParameters {
    pub basic_container: BasicContainer,
    pub high_frequency_container: BasicVehicleContainerHighFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_vehicle_container: Option<SpecialVehicleContainer>,
}

// ────────────────────────────────────────────────────────────────────────────
// Basic container
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicContainer {
    pub station_type: i32,
    pub reference_position: ReferencePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePosition {
    /// 0.1 micro-degrees; [`LATITUDE_UNAVAILABLE`] when unknown.
    pub latitude: i32,
    /// 0.1 micro-degrees; [`LONGITUDE_UNAVAILABLE`] when unknown.
    pub longitude: i32,
    pub position_confidence_ellipse: PosConfidenceEllipse,
    pub altitude: Altitude,
}

impl Default for ReferencePosition {
    fn default() -> Self {
        Self {
            latitude: LATITUDE_UNAVAILABLE,
            longitude: LONGITUDE_UNAVAILABLE,
            position_confidence_ellipse: PosConfidenceEllipse::default(),
            altitude: Altitude::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfidenceEllipse {
    /// Centimetres.
    pub semi_major_confidence: i32,
    /// Centimetres.
    pub semi_minor_confidence: i32,
    /// 0.1 degrees from north.
    pub semi_major_orientation: i32,
}

impl Default for PosConfidenceEllipse {
    fn default() -> Self {
        Self {
            semi_major_confidence: SEMI_AXIS_LENGTH_UNAVAILABLE,
            semi_minor_confidence: SEMI_AXIS_LENGTH_UNAVAILABLE,
            semi_major_orientation: HEADING_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Altitude {
    /// Centimetres.
    pub altitude_value: i32,
    pub altitude_confidence: i32,
}

impl Default for Altitude {
    fn default() -> Self {
        Self {
            altitude_value: ALTITUDE_UNAVAILABLE,
            altitude_confidence: ALTITUDE_CONFIDENCE_UNAVAILABLE,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// High-frequency container
// ────────────────────────────────────────────────────────────────────────────

/// Basic vehicle high-frequency container.  `Default` yields a container
/// where every value and confidence is "unavailable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicVehicleContainerHighFrequency {
    pub heading: Heading,
    pub speed: Speed,
    pub drive_direction: DriveDirection,
    pub vehicle_length: VehicleLength,
    /// Decimetres; 61 means "6.1 m or wider", 62 unavailable.
    pub vehicle_width: i32,
    pub longitudinal_acceleration: LongitudinalAcceleration,
    pub curvature: Curvature,
    pub curvature_calculation_mode: CurvatureCalculationMode,
    pub yaw_rate: YawRate,
    #[serde(default)]
    pub acceleration_control: AccelerationControl,
}

impl Default for BasicVehicleContainerHighFrequency {
    fn default() -> Self {
        Self {
            heading: Heading {
                heading_value: HEADING_UNAVAILABLE,
                heading_confidence: HEADING_CONFIDENCE_UNAVAILABLE,
            },
            speed: Speed {
                speed_value: SPEED_UNAVAILABLE,
                speed_confidence: SPEED_CONFIDENCE_UNAVAILABLE,
            },
            drive_direction: DriveDirection::Unavailable,
            vehicle_length: VehicleLength {
                vehicle_length_value: VEHICLE_LENGTH_UNAVAILABLE,
                vehicle_length_confidence_indication:
                    VehicleLengthConfidenceIndication::Unavailable,
            },
            vehicle_width: VEHICLE_WIDTH_UNAVAILABLE,
            longitudinal_acceleration: LongitudinalAcceleration {
                longitudinal_acceleration_value: LONGITUDINAL_ACCELERATION_UNAVAILABLE,
                longitudinal_acceleration_confidence: ACCELERATION_CONFIDENCE_UNAVAILABLE,
            },
            curvature: Curvature {
                curvature_value: CURVATURE_UNAVAILABLE,
                curvature_confidence: CURVATURE_CONFIDENCE_UNAVAILABLE,
            },
            curvature_calculation_mode: CurvatureCalculationMode::Unavailable,
            yaw_rate: YawRate {
                yaw_rate_value: YAW_RATE_UNAVAILABLE,
                yaw_rate_confidence: YAW_RATE_CONFIDENCE_UNAVAILABLE,
            },
            acceleration_control: AccelerationControl::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// 0.1 degrees from north.
    pub heading_value: i32,
    pub heading_confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speed {
    /// 0.01 m/s.
    pub speed_value: i32,
    pub speed_confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLength {
    /// Decimetres.
    pub vehicle_length_value: i32,
    pub vehicle_length_confidence_indication: VehicleLengthConfidenceIndication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongitudinalAcceleration {
    /// 0.1 m/s².
    pub longitudinal_acceleration_value: i32,
    pub longitudinal_acceleration_confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curvature {
    pub curvature_value: i32,
    pub curvature_confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YawRate {
    /// 0.01 degrees per second.
    pub yaw_rate_value: i32,
    pub yaw_rate_confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveDirection {
    Forward,
    Backward,
    #[default]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurvatureCalculationMode {
    YawRateUsed,
    YawRateNotUsed,
    #[default]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleLengthConfidenceIndication {
    NoTrailerPresent,
    TrailerPresentWithKnownLength,
    TrailerPresentWithUnknownLength,
    TrailerPresenceIsUnknown,
    #[default]
    Unavailable,
}

// ────────────────────────────────────────────────────────────────────────────
// Acceleration control bit string
// ────────────────────────────────────────────────────────────────────────────

/// The 7-bit `AccelerationControl` bit string packed MSB-first into one
/// byte.  Bit 0 is padding and is always cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccelerationControl(u8);

impl AccelerationControl {
    pub const BRAKE_PEDAL_ENGAGED: u8 = 1 << 7;
    pub const GAS_PEDAL_ENGAGED: u8 = 1 << 6;
    pub const EMERGENCY_BRAKE_ENGAGED: u8 = 1 << 5;
    pub const COLLISION_WARNING_ENGAGED: u8 = 1 << 4;
    pub const ACC_ENGAGED: u8 = 1 << 3;
    pub const CRUISE_CONTROL_ENGAGED: u8 = 1 << 2;
    pub const SPEED_LIMITER_ENGAGED: u8 = 1 << 1;

    /// Number of meaningful bits.
    pub const SIZE_BITS: u32 = 7;

    /// Build from a raw byte, dropping the padding bit.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & !1)
    }

    /// The packed byte.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Return a copy with `flag` set or cleared.
    pub fn with(self, flag: u8, engaged: bool) -> Self {
        if engaged {
            Self::from_bits(self.0 | flag)
        } else {
            Self(self.0 & !flag)
        }
    }

    /// `true` when every bit of `flag` is set.
    pub fn is_set(self, flag: u8) -> bool {
        self.0 & flag == flag
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Special vehicle container
// ────────────────────────────────────────────────────────────────────────────

/// Role-specific container for special vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialVehicleContainer {
    PublicTransportContainer(PublicTransportContainer),
    SpecialTransportContainer(SpecialTransportContainer),
    EmergencyContainer(EmergencyContainer),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTransportContainer {
    pub embarkation_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pt_activation: Option<PtActivation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtActivation {
    pub pt_activation_type: i32,
    pub pt_activation_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialTransportContainer {
    pub special_transport_type: u8,
    pub light_bar_siren_in_use: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContainer {
    pub light_bar_siren_in_use: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_priority: Option<u8>,
}
