//! `camlink-types` – shared CAM data model and error type.
//!
//! - [`message`] – the in-memory Cooperative Awareness Message and its
//!   "unavailable" sentinels.
//! - [`event`] – [`BusMessage`], the envelope carried by pub/sub transports.
//! - [`CamError`] – the error taxonomy shared by every camlink crate.

pub mod event;
pub mod message;

pub use event::BusMessage;
pub use message::*;

use thiserror::Error;

/// Error type spanning payload conversion, message validation, transport
/// dispatch and best-effort transmission.
///
/// None of these are fatal to the process; callers report them and move on
/// to the next message or beacon cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CamError {
    /// An external payload does not have the expected shape or types.
    #[error("CAM Decode Error: {0}")]
    Decode(String),

    /// An assembled message violates a data-model constraint.
    #[error("CAM Encode Error on {field}: {details}")]
    Encode { field: String, details: String },

    /// The transport layer declined the outbound message.
    #[error("Dispatch Rejected: {0}")]
    DispatchRejected(String),

    /// A best-effort side channel (e.g. the datagram mirror) failed.
    #[error("Transmit Error: {0}")]
    Transmit(String),

    /// An internal channel or bus is closed or unusable.
    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    /// A metric could not be created or registered.
    #[error("Metrics Error: {0}")]
    Metrics(String),
}

impl From<serde_json::Error> for CamError {
    fn from(e: serde_json::Error) -> Self {
        CamError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vehicle_container_is_unavailable() {
        let hf = BasicVehicleContainerHighFrequency::default();
        assert_eq!(hf.speed.speed_value, SPEED_UNAVAILABLE);
        assert_eq!(hf.heading.heading_value, HEADING_UNAVAILABLE);
        assert_eq!(hf.vehicle_width, VEHICLE_WIDTH_UNAVAILABLE);
        assert_eq!(hf.drive_direction, DriveDirection::Unavailable);
        assert_eq!(hf.acceleration_control.bits(), 0);
    }

    #[test]
    fn acceleration_control_keeps_padding_clear() {
        let ctl = AccelerationControl::from_bits(0xFF);
        assert_eq!(ctl.bits(), 0b1111_1110);
        let ctl = AccelerationControl::default()
            .with(AccelerationControl::BRAKE_PEDAL_ENGAGED, true)
            .with(AccelerationControl::EMERGENCY_BRAKE_ENGAGED, true);
        assert_eq!(ctl.bits(), 0b1010_0000);
        assert!(ctl.is_set(AccelerationControl::BRAKE_PEDAL_ENGAGED));
        assert!(!ctl.is_set(AccelerationControl::GAS_PEDAL_ENGAGED));
        let ctl = ctl.with(AccelerationControl::BRAKE_PEDAL_ENGAGED, false);
        assert_eq!(ctl.bits(), 0b0010_0000);
    }

    #[test]
    fn header_uses_asn1_field_names() {
        let msg = AwarenessMessage::new(42, CoopAwareness::default());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["header"]["stationID"], 42);
        assert_eq!(json["header"]["messageID"], MESSAGE_ID_CAM);
        assert_eq!(json["header"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(json["cam"]["camParameters"]["basicContainer"]["referencePosition"].is_object());
        assert!(json["cam"]["camParameters"].get("specialVehicleContainer").is_none());
    }

    #[test]
    fn special_vehicle_container_uses_choice_name() {
        let svc = SpecialVehicleContainer::PublicTransportContainer(PublicTransportContainer {
            embarkation_status: true,
            pt_activation: None,
        });
        let json = serde_json::to_string(&svc).unwrap();
        assert_eq!(json, r#"{"publicTransportContainer":{"embarkationStatus":true}}"#);
        let back: SpecialVehicleContainer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, svc);
    }

    #[test]
    fn bus_message_gets_unique_id() {
        let a = BusMessage::new("vanetza/in/cam", "{}");
        let b = BusMessage::new("vanetza/in/cam", "{}");
        assert_ne!(a.id, b.id);
        assert_eq!(a.topic, "vanetza/in/cam");
    }

    #[test]
    fn cam_error_display() {
        let err = CamError::Encode {
            field: "speedValue".to_string(),
            details: "20000 outside [0, 16383]".to_string(),
        };
        assert!(err.to_string().contains("speedValue"));

        let err: CamError = serde_json::from_str::<ItsPduHeader>("{").unwrap_err().into();
        assert!(matches!(err, CamError::Decode(_)));
    }
}
