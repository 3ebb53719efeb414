//! Message assembler – conversion between [`AwarenessMessage`] and the JSON
//! shapes exchanged on the pub/sub topics, plus outbound beacon assembly.
//!
//! Two external shapes exist:
//!
//! - **Scaled** ([`ScaledCam`]): a flat object with human-readable physical
//!   units, produced and consumed through [`crate::value_codec`].
//! - **Full** : the cooperative-awareness structure field-for-field, i.e.
//!   the serde form of [`CoopAwareness`] / [`AwarenessMessage`].
//!
//! Every fallible conversion returns [`CamError`]; a malformed payload
//! aborts only that one conversion.

use camlink_types::{
    AccelerationControl, AwarenessMessage, BasicContainer, BasicVehicleContainerHighFrequency,
    CURVATURE_CONFIDENCE_UNAVAILABLE, CURVATURE_UNAVAILABLE, CamError, CamParameters,
    CoopAwareness, Curvature, CurvatureCalculationMode, DriveDirection, Heading,
    LongitudinalAcceleration, ReferencePosition, SpecialVehicleContainer, Speed,
    VehicleLength, VehicleLengthConfidenceIndication, YawRate,
    ACCELERATION_CONFIDENCE_UNAVAILABLE, HEADING_CONFIDENCE_UNAVAILABLE,
    SPEED_CONFIDENCE_UNAVAILABLE, YAW_RATE_CONFIDENCE_UNAVAILABLE,
};
use serde::{Deserialize, Serialize};

use crate::kinematics::Kinematics;
use crate::value_codec::{self as codec, ExternalValue, FieldDescriptor};

// ────────────────────────────────────────────────────────────────────────────
// Control flags
// ────────────────────────────────────────────────────────────────────────────

/// The seven acceleration-control booleans in their unpacked form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFlags {
    pub brake_pedal: bool,
    pub gas_pedal: bool,
    pub emergency_brake: bool,
    pub collision_warning: bool,
    pub acc_engaged: bool,
    pub cruise_control: bool,
    pub speed_limiter: bool,
}

/// Pack `flags` MSB-first into the control byte (bit 0 stays clear).
///
/// ```
/// use camlink_facility::assembler::{pack_control_flags, ControlFlags};
///
/// let flags = ControlFlags { brake_pedal: true, emergency_brake: true, ..Default::default() };
/// assert_eq!(pack_control_flags(&flags).bits(), 0b1010_0000);
/// ```
pub fn pack_control_flags(flags: &ControlFlags) -> AccelerationControl {
    AccelerationControl::default()
        .with(AccelerationControl::BRAKE_PEDAL_ENGAGED, flags.brake_pedal)
        .with(AccelerationControl::GAS_PEDAL_ENGAGED, flags.gas_pedal)
        .with(AccelerationControl::EMERGENCY_BRAKE_ENGAGED, flags.emergency_brake)
        .with(AccelerationControl::COLLISION_WARNING_ENGAGED, flags.collision_warning)
        .with(AccelerationControl::ACC_ENGAGED, flags.acc_engaged)
        .with(AccelerationControl::CRUISE_CONTROL_ENGAGED, flags.cruise_control)
        .with(AccelerationControl::SPEED_LIMITER_ENGAGED, flags.speed_limiter)
}

impl From<AccelerationControl> for ControlFlags {
    fn from(ctl: AccelerationControl) -> Self {
        Self {
            brake_pedal: ctl.is_set(AccelerationControl::BRAKE_PEDAL_ENGAGED),
            gas_pedal: ctl.is_set(AccelerationControl::GAS_PEDAL_ENGAGED),
            emergency_brake: ctl.is_set(AccelerationControl::EMERGENCY_BRAKE_ENGAGED),
            collision_warning: ctl.is_set(AccelerationControl::COLLISION_WARNING_ENGAGED),
            acc_engaged: ctl.is_set(AccelerationControl::ACC_ENGAGED),
            cruise_control: ctl.is_set(AccelerationControl::CRUISE_CONTROL_ENGAGED),
            speed_limiter: ctl.is_set(AccelerationControl::SPEED_LIMITER_ENGAGED),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scaled shape
// ────────────────────────────────────────────────────────────────────────────

/// Flat, physical-unit representation of a CAM.
///
/// `headingConf` and `speedConf` must be present on input, but their values
/// are ignored: confidences are always forced to "unavailable" when
/// encoding.  `driveDirection` may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledCam {
    #[serde(rename = "stationID")]
    pub station_id: u32,
    pub station_type: i32,
    pub latitude: ExternalValue,
    pub longitude: ExternalValue,
    pub semi_major_conf: i32,
    pub semi_minor_conf: i32,
    pub semi_major_orient: i32,
    pub altitude: ExternalValue,
    pub altitude_conf: i32,
    pub heading: ExternalValue,
    pub heading_conf: ExternalValue,
    pub speed: ExternalValue,
    pub speed_conf: ExternalValue,
    #[serde(default)]
    pub drive_direction: Option<String>,
    pub length: ExternalValue,
    pub width: ExternalValue,
    pub acceleration: ExternalValue,
    pub curvature: ExternalValue,
    pub yaw_rate: ExternalValue,
    pub brake_pedal: bool,
    pub gas_pedal: bool,
    pub emergency_brake: bool,
    pub collision_warning: bool,
    pub acc_engaged: bool,
    pub cruise_control: bool,
    pub speed_limiter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_vehicle: Option<SpecialVehicleContainer>,
}

impl ScaledCam {
    pub fn controls(&self) -> ControlFlags {
        ControlFlags {
            brake_pedal: self.brake_pedal,
            gas_pedal: self.gas_pedal,
            emergency_brake: self.emergency_brake,
            collision_warning: self.collision_warning,
            acc_engaged: self.acc_engaged,
            cruise_control: self.cruise_control,
            speed_limiter: self.speed_limiter,
        }
    }
}

fn drive_direction_name(direction: DriveDirection) -> &'static str {
    match direction {
        DriveDirection::Forward => "FORWARD",
        DriveDirection::Backward => "BACKWARD",
        DriveDirection::Unavailable => "UNAVAILABLE",
    }
}

fn parse_drive_direction(name: Option<&str>) -> DriveDirection {
    match name {
        Some("FORWARD") => DriveDirection::Forward,
        Some("BACKWARD") => DriveDirection::Backward,
        _ => DriveDirection::Unavailable,
    }
}

/// Convert a message to the scaled shape.
pub fn to_scaled(message: &AwarenessMessage) -> ScaledCam {
    let params = &message.cam.cam_parameters;
    let pos = message.position();
    let hf = message.vehicle();
    let controls = ControlFlags::from(hf.acceleration_control);
    let ext = |raw: i32, field: &FieldDescriptor| codec::to_external(raw as i64, field);

    ScaledCam {
        station_id: message.station_id(),
        station_type: params.basic_container.station_type,
        latitude: ext(pos.latitude, &codec::LATITUDE),
        longitude: ext(pos.longitude, &codec::LONGITUDE),
        semi_major_conf: pos.position_confidence_ellipse.semi_major_confidence,
        semi_minor_conf: pos.position_confidence_ellipse.semi_minor_confidence,
        semi_major_orient: pos.position_confidence_ellipse.semi_major_orientation,
        altitude: ext(pos.altitude.altitude_value, &codec::ALTITUDE),
        altitude_conf: pos.altitude.altitude_confidence,
        heading: ext(hf.heading.heading_value, &codec::HEADING),
        heading_conf: ext(hf.heading.heading_confidence, &codec::HEADING_CONFIDENCE),
        speed: ext(hf.speed.speed_value, &codec::SPEED),
        speed_conf: ext(hf.speed.speed_confidence, &codec::SPEED_CONFIDENCE),
        drive_direction: Some(drive_direction_name(hf.drive_direction).to_string()),
        length: ext(hf.vehicle_length.vehicle_length_value, &codec::VEHICLE_LENGTH),
        width: ext(hf.vehicle_width, &codec::VEHICLE_WIDTH),
        acceleration: ext(
            hf.longitudinal_acceleration.longitudinal_acceleration_value,
            &codec::LONGITUDINAL_ACCELERATION,
        ),
        curvature: ext(hf.curvature.curvature_value, &codec::CURVATURE),
        yaw_rate: ext(hf.yaw_rate.yaw_rate_value, &codec::YAW_RATE),
        brake_pedal: controls.brake_pedal,
        gas_pedal: controls.gas_pedal,
        emergency_brake: controls.emergency_brake,
        collision_warning: controls.collision_warning,
        acc_engaged: controls.acc_engaged,
        cruise_control: controls.cruise_control,
        speed_limiter: controls.speed_limiter,
        special_vehicle: params.special_vehicle_container.clone(),
    }
}

/// Build a message from an already-parsed scaled payload.
pub fn from_scaled(scaled: &ScaledCam, generation_delta_time: u16) -> AwarenessMessage {
    let int = |value: ExternalValue, field: &FieldDescriptor| {
        codec::to_internal_i32(value.as_f64(), field)
    };

    let reference_position = ReferencePosition {
        latitude: int(scaled.latitude, &codec::LATITUDE),
        longitude: int(scaled.longitude, &codec::LONGITUDE),
        position_confidence_ellipse: camlink_types::PosConfidenceEllipse {
            semi_major_confidence: scaled.semi_major_conf,
            semi_minor_confidence: scaled.semi_minor_conf,
            semi_major_orientation: scaled.semi_major_orient,
        },
        altitude: camlink_types::Altitude {
            altitude_value: int(scaled.altitude, &codec::ALTITUDE),
            altitude_confidence: scaled.altitude_conf,
        },
    };

    let high_frequency_container = BasicVehicleContainerHighFrequency {
        heading: Heading {
            heading_value: int(scaled.heading, &codec::HEADING),
            heading_confidence: HEADING_CONFIDENCE_UNAVAILABLE,
        },
        speed: Speed {
            speed_value: int(scaled.speed, &codec::SPEED),
            speed_confidence: SPEED_CONFIDENCE_UNAVAILABLE,
        },
        drive_direction: parse_drive_direction(scaled.drive_direction.as_deref()),
        vehicle_length: VehicleLength {
            vehicle_length_value: int(scaled.length, &codec::VEHICLE_LENGTH),
            vehicle_length_confidence_indication: VehicleLengthConfidenceIndication::NoTrailerPresent,
        },
        vehicle_width: int(scaled.width, &codec::VEHICLE_WIDTH),
        longitudinal_acceleration: LongitudinalAcceleration {
            longitudinal_acceleration_value: int(
                scaled.acceleration,
                &codec::LONGITUDINAL_ACCELERATION,
            ),
            longitudinal_acceleration_confidence: ACCELERATION_CONFIDENCE_UNAVAILABLE,
        },
        curvature: Curvature {
            curvature_value: int(scaled.curvature, &codec::CURVATURE),
            curvature_confidence: CURVATURE_CONFIDENCE_UNAVAILABLE,
        },
        curvature_calculation_mode: CurvatureCalculationMode::YawRateUsed,
        yaw_rate: YawRate {
            yaw_rate_value: int(scaled.yaw_rate, &codec::YAW_RATE),
            yaw_rate_confidence: YAW_RATE_CONFIDENCE_UNAVAILABLE,
        },
        acceleration_control: pack_control_flags(&scaled.controls()),
    };

    AwarenessMessage::new(
        scaled.station_id,
        CoopAwareness {
            generation_delta_time,
            cam_parameters: CamParameters {
                basic_container: BasicContainer {
                    station_type: scaled.station_type,
                    reference_position,
                },
                high_frequency_container,
                special_vehicle_container: scaled.special_vehicle.clone(),
            },
        },
    )
}

/// Parse a scaled-shape JSON payload into a message.
///
/// The station identifier comes from the payload; the generation time is
/// supplied by the caller from the runtime clock.
pub fn encode_scaled(payload: &str, generation_delta_time: u16) -> Result<AwarenessMessage, CamError> {
    let scaled: ScaledCam = serde_json::from_str(payload)?;
    Ok(from_scaled(&scaled, generation_delta_time))
}

/// Parse a full-shape JSON payload (a cooperative-awareness body) and wrap
/// it in a header for the local `station_id`.
pub fn encode_full(payload: &str, station_id: u32) -> Result<AwarenessMessage, CamError> {
    let cam: CoopAwareness = serde_json::from_str(payload)?;
    Ok(AwarenessMessage::new(station_id, cam))
}

// ────────────────────────────────────────────────────────────────────────────
// Inbound reports
// ────────────────────────────────────────────────────────────────────────────

/// Reception metadata appended to the scaled shape of a received message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionMeta {
    /// Reception time in seconds.
    pub timestamp: f64,
    pub new_info: bool,
    pub rssi: i32,
    #[serde(rename = "receiverID")]
    pub receiver_id: u32,
    pub receiver_type: i32,
}

/// Scaled shape plus [`ReceptionMeta`], flattened into one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledReport {
    #[serde(flatten)]
    pub cam: ScaledCam,
    #[serde(flatten)]
    pub meta: ReceptionMeta,
}

/// Unscaled report of a received message published on the full topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullCamReport {
    pub timestamp: f64,
    pub rssi: i32,
    pub decoded: bool,
    pub new_info: bool,
    pub fields: AwarenessMessage,
}

/// Serialise any outbound shape.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, CamError> {
    serde_json::to_string(value).map_err(|e| CamError::Encode {
        field: "json".to_string(),
        details: e.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Beacon assembly
// ────────────────────────────────────────────────────────────────────────────

/// Static description of the local station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationProfile {
    pub station_id: u32,
    pub station_type: i32,
    pub length_m: f64,
    pub width_m: f64,
}

/// Live vehicle state sampled for one beacon cycle, in raw CAM units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub reference_position: ReferencePosition,
    pub speed: i32,
    pub heading: i32,
    pub kinematics: Kinematics,
    pub controls: AccelerationControl,
}

/// Assemble the local station's beacon.
pub fn build_beacon(
    profile: &StationProfile,
    state: &VehicleState,
    generation_delta_time: u16,
) -> AwarenessMessage {
    let hf = BasicVehicleContainerHighFrequency {
        heading: Heading {
            heading_value: state.heading,
            heading_confidence: HEADING_CONFIDENCE_UNAVAILABLE,
        },
        speed: Speed {
            speed_value: state.speed,
            speed_confidence: SPEED_CONFIDENCE_UNAVAILABLE,
        },
        drive_direction: DriveDirection::Forward,
        vehicle_length: VehicleLength {
            vehicle_length_value: codec::to_internal_i32(profile.length_m, &codec::VEHICLE_LENGTH),
            vehicle_length_confidence_indication: VehicleLengthConfidenceIndication::NoTrailerPresent,
        },
        vehicle_width: codec::to_internal_i32(profile.width_m, &codec::VEHICLE_WIDTH),
        longitudinal_acceleration: LongitudinalAcceleration {
            longitudinal_acceleration_value: state.kinematics.acceleration,
            longitudinal_acceleration_confidence: ACCELERATION_CONFIDENCE_UNAVAILABLE,
        },
        curvature: Curvature {
            curvature_value: CURVATURE_UNAVAILABLE,
            curvature_confidence: CURVATURE_CONFIDENCE_UNAVAILABLE,
        },
        curvature_calculation_mode: CurvatureCalculationMode::YawRateUsed,
        yaw_rate: YawRate {
            yaw_rate_value: state.kinematics.yaw_rate,
            yaw_rate_confidence: YAW_RATE_CONFIDENCE_UNAVAILABLE,
        },
        acceleration_control: state.controls,
    };

    AwarenessMessage::new(
        profile.station_id,
        CoopAwareness {
            generation_delta_time,
            cam_parameters: CamParameters {
                basic_container: BasicContainer {
                    station_type: profile.station_type,
                    reference_position: state.reference_position,
                },
                high_frequency_container: hf,
                special_vehicle_container: None,
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::MessageValidator;
    use camlink_types::{
        LONGITUDINAL_ACCELERATION_UNAVAILABLE, PublicTransportContainer, SPEED_UNAVAILABLE,
        YAW_RATE_UNAVAILABLE,
    };
    use serde_json::{Value, json};

    fn scaled_payload() -> Value {
        json!({
            "stationID": 77,
            "stationType": 5,
            "latitude": 40.6332,
            "longitude": -8.6601,
            "semiMajorConf": 4095,
            "semiMinorConf": 4095,
            "semiMajorOrient": 3601,
            "altitude": 800001,
            "altitudeConf": 15,
            "heading": 90.5,
            "headingConf": 127,
            "speed": 13.89,
            "speedConf": 127,
            "driveDirection": "BACKWARD",
            "length": 4.5,
            "width": 1.8,
            "acceleration": 161,
            "curvature": 1023,
            "yawRate": -1.25,
            "brakePedal": true,
            "gasPedal": false,
            "emergencyBrake": true,
            "collisionWarning": false,
            "accEngaged": false,
            "cruiseControl": false,
            "speedLimiter": false
        })
    }

    #[test]
    fn scaled_payload_encodes_to_raw_units() {
        let msg = encode_scaled(&scaled_payload().to_string(), 1234).unwrap();
        assert_eq!(msg.station_id(), 77);
        assert_eq!(msg.cam.generation_delta_time, 1234);
        let pos = msg.position();
        assert_eq!(pos.latitude, 406_332_000);
        assert_eq!(pos.longitude, -86_601_000);
        assert_eq!(pos.altitude.altitude_value, 800_001);
        let hf = msg.vehicle();
        assert_eq!(hf.heading.heading_value, 905);
        assert_eq!(hf.speed.speed_value, 1389);
        assert_eq!(hf.drive_direction, DriveDirection::Backward);
        assert_eq!(hf.vehicle_length.vehicle_length_value, 45);
        assert_eq!(hf.vehicle_width, 18);
        assert_eq!(hf.yaw_rate.yaw_rate_value, -125);
        assert_eq!(hf.acceleration_control.bits(), 0b1010_0000);
        assert_eq!(hf.curvature_calculation_mode, CurvatureCalculationMode::YawRateUsed);
        assert!(msg.cam.cam_parameters.special_vehicle_container.is_none());
        assert!(MessageValidator::cam_defaults().validate(&msg).is_ok());
    }

    #[test]
    fn confidences_are_forced_unavailable() {
        let mut payload = scaled_payload();
        payload["headingConf"] = json!(1.0);
        payload["speedConf"] = json!(0.5);
        let msg = encode_scaled(&payload.to_string(), 0).unwrap();
        let hf = msg.vehicle();
        assert_eq!(hf.heading.heading_confidence, HEADING_CONFIDENCE_UNAVAILABLE);
        assert_eq!(hf.speed.speed_confidence, SPEED_CONFIDENCE_UNAVAILABLE);
        assert_eq!(
            hf.longitudinal_acceleration.longitudinal_acceleration_confidence,
            ACCELERATION_CONFIDENCE_UNAVAILABLE
        );
        assert_eq!(hf.yaw_rate.yaw_rate_confidence, YAW_RATE_CONFIDENCE_UNAVAILABLE);
        assert_eq!(hf.curvature.curvature_confidence, CURVATURE_CONFIDENCE_UNAVAILABLE);
    }

    #[test]
    fn missing_station_id_is_a_decode_error() {
        let mut payload = scaled_payload();
        payload.as_object_mut().unwrap().remove("stationID");
        match encode_scaled(&payload.to_string(), 0) {
            Err(CamError::Decode(msg)) => assert!(msg.contains("stationID")),
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn missing_confidence_keys_are_decode_errors() {
        for key in ["headingConf", "speedConf"] {
            let mut payload = scaled_payload();
            payload.as_object_mut().unwrap().remove(key);
            match encode_scaled(&payload.to_string(), 0) {
                Err(CamError::Decode(msg)) => assert!(msg.contains(key), "{msg}"),
                other => panic!("expected Decode error for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn wrong_type_is_a_decode_error() {
        let mut payload = scaled_payload();
        payload["brakePedal"] = json!("yes");
        assert!(matches!(
            encode_scaled(&payload.to_string(), 0),
            Err(CamError::Decode(_))
        ));
        assert!(matches!(encode_scaled("not json", 0), Err(CamError::Decode(_))));
    }

    #[test]
    fn unknown_drive_direction_is_unavailable() {
        let mut payload = scaled_payload();
        payload["driveDirection"] = json!("SIDEWAYS");
        let msg = encode_scaled(&payload.to_string(), 0).unwrap();
        assert_eq!(msg.vehicle().drive_direction, DriveDirection::Unavailable);
        payload.as_object_mut().unwrap().remove("driveDirection");
        let msg = encode_scaled(&payload.to_string(), 0).unwrap();
        assert_eq!(msg.vehicle().drive_direction, DriveDirection::Unavailable);
    }

    #[test]
    fn special_vehicle_is_taken_verbatim() {
        let mut payload = scaled_payload();
        payload["specialVehicle"] = json!({
            "publicTransportContainer": { "embarkationStatus": true }
        });
        let msg = encode_scaled(&payload.to_string(), 0).unwrap();
        assert_eq!(
            msg.cam.cam_parameters.special_vehicle_container,
            Some(SpecialVehicleContainer::PublicTransportContainer(
                PublicTransportContainer {
                    embarkation_status: true,
                    pt_activation: None,
                }
            ))
        );
    }

    #[test]
    fn to_scaled_emits_sentinels_as_integers() {
        let msg = AwarenessMessage::new(9, CoopAwareness::default());
        let json = serde_json::to_value(to_scaled(&msg)).unwrap();
        assert_eq!(json["stationID"], 9);
        assert_eq!(json["latitude"], json!(900_000_001));
        assert_eq!(json["speed"], json!(16383));
        assert_eq!(json["width"], json!(62));
        assert_eq!(json["driveDirection"], "UNAVAILABLE");
        assert_eq!(json["brakePedal"], false);
        assert!(json.get("specialVehicle").is_none());
    }

    #[test]
    fn scaled_round_trip_preserves_values() {
        let msg = encode_scaled(&scaled_payload().to_string(), 10).unwrap();
        let scaled = to_scaled(&msg);
        assert_eq!(scaled.speed, ExternalValue::Real(13.89));
        assert_eq!(scaled.heading, ExternalValue::Real(90.5));
        assert_eq!(scaled.drive_direction.as_deref(), Some("BACKWARD"));
        let again = from_scaled(&scaled, 10);
        assert_eq!(again, msg);
    }

    #[test]
    fn full_payload_gets_local_station_id() {
        let body = serde_json::to_string(&CoopAwareness {
            generation_delta_time: 500,
            ..CoopAwareness::default()
        })
        .unwrap();
        let msg = encode_full(&body, 1001).unwrap();
        assert_eq!(msg.station_id(), 1001);
        assert_eq!(msg.cam.generation_delta_time, 500);
        assert!(matches!(encode_full("{}", 1), Err(CamError::Decode(_))));
    }

    #[test]
    fn scaled_report_flattens_metadata() {
        let msg = AwarenessMessage::new(3, CoopAwareness::default());
        let report = ScaledReport {
            cam: to_scaled(&msg),
            meta: ReceptionMeta {
                timestamp: 12.5,
                new_info: true,
                rssi: -70,
                receiver_id: 1,
                receiver_type: 5,
            },
        };
        let json: Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert_eq!(json["stationID"], 3);
        assert_eq!(json["newInfo"], true);
        assert_eq!(json["receiverID"], 1);
        assert_eq!(json["receiverType"], 5);
        assert_eq!(json["rssi"], -70);
    }

    #[test]
    fn beacon_defaults() {
        let profile = StationProfile {
            station_id: 42,
            station_type: 5,
            length_m: 4.5,
            width_m: 1.8,
        };
        let state = VehicleState {
            reference_position: ReferencePosition::default(),
            speed: SPEED_UNAVAILABLE,
            heading: 900,
            kinematics: Kinematics {
                acceleration: LONGITUDINAL_ACCELERATION_UNAVAILABLE,
                yaw_rate: YAW_RATE_UNAVAILABLE,
            },
            controls: AccelerationControl::default(),
        };
        let msg = build_beacon(&profile, &state, 77);
        let hf = msg.vehicle();
        assert_eq!(msg.station_id(), 42);
        assert_eq!(msg.cam.generation_delta_time, 77);
        assert_eq!(hf.drive_direction, DriveDirection::Forward);
        assert_eq!(hf.vehicle_length.vehicle_length_value, 45);
        assert_eq!(hf.vehicle_width, 18);
        assert_eq!(hf.curvature.curvature_value, CURVATURE_UNAVAILABLE);
        assert_eq!(
            hf.vehicle_length.vehicle_length_confidence_indication,
            VehicleLengthConfidenceIndication::NoTrailerPresent
        );
        assert_eq!(hf.heading.heading_value, 900);
        assert!(MessageValidator::cam_defaults().validate(&msg).is_ok());
    }
}
