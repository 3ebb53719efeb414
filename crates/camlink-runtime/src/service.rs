//! [`CamService`] – the CAM facility's serial event loop.
//!
//! One service instance owns all long-lived state (station cache, kinematic
//! engine, beacon scheduler) and handles three kinds of events, one at a
//! time:
//!
//! 1. **Indications** from the transport layer: a received message is
//!    reported on the outbound topics ([`CamService::indicate`]).
//! 2. **Pub/sub payloads** on the inbound topics: converted to a message and
//!    dispatched to the transport ([`CamService::on_message`]).
//! 3. **Beacon timer** firings: the local station's CAM is assembled from
//!    the position provider and dispatched
//!    ([`CamService::generate_beacon`]).
//!
//! Errors in any handler are logged and the loop carries on.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use camlink_facility::StaticPositionProvider;
//! use camlink_middleware::{CamMetrics, ChannelTransport, EventBus};
//! use camlink_runtime::{CamService, CamServiceConfig};
//! use tokio::sync::{mpsc, watch};
//!
//! # async fn demo() -> Result<(), camlink_types::CamError> {
//! let (transport, _outbound) = ChannelTransport::new(64);
//! let service = CamService::new(
//!     CamServiceConfig::default(),
//!     Arc::new(transport),
//!     Arc::new(StaticPositionProvider::default()),
//!     CamMetrics::unregistered()?,
//! )
//! .with_pubsub(Arc::new(EventBus::default()));
//!
//! let (_indication_tx, indications) = mpsc::channel(64);
//! let (_stop, shutdown) = watch::channel(false);
//! service.run(indications, shutdown).await
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use camlink_facility::assembler::{
    self, FullCamReport, ReceptionMeta, ScaledReport, StationProfile, VehicleState,
};
use camlink_facility::{KinematicEngine, MessageValidator, PositionProvider, StationCache};
use camlink_middleware::{
    CamMetrics, DataRequest, Indication, PubSubTransport, Transport, UdpMirror,
};
use camlink_types::{
    AccelerationControl, AwarenessMessage, BusMessage, CamError, STATION_TYPE_PASSENGER_CAR,
};
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::clock::RuntimeClock;
use crate::scheduler::{self, BeaconScheduler};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`CamService`].
#[derive(Debug, Clone, PartialEq)]
pub struct CamServiceConfig {
    pub station_id: u32,
    pub station_type: i32,
    /// Vehicle length in metres.
    pub length_m: f64,
    /// Vehicle width in metres.
    pub width_m: f64,
    /// Beacon period; zero disables beaconing.
    pub interval: Duration,
    /// Scaled-shape payloads to transmit.
    pub topic_in: String,
    /// Scaled-shape reports of received messages.
    pub topic_out: String,
    /// Full-shape payloads to transmit.
    pub full_topic_in: Option<String>,
    /// Full reports of received messages.
    pub full_topic_out: Option<String>,
    /// Scaled shape of the local beacon.
    pub own_topic_out: Option<String>,
    /// Full shape of the local beacon.
    pub own_full_topic_out: Option<String>,
    /// Maximum number of stations tracked for change detection; 0 = no limit.
    pub station_cache_capacity: usize,
}

impl Default for CamServiceConfig {
    fn default() -> Self {
        Self {
            station_id: 1,
            station_type: STATION_TYPE_PASSENGER_CAR,
            length_m: 4.5,
            width_m: 1.8,
            interval: Duration::from_millis(1000),
            topic_in: "vanetza/in/cam".to_string(),
            topic_out: "vanetza/out/cam".to_string(),
            full_topic_in: Some("vanetza/in/cam_full".to_string()),
            full_topic_out: Some("vanetza/out/cam_full".to_string()),
            own_topic_out: Some("vanetza/own/cam".to_string()),
            own_full_topic_out: Some("vanetza/own/cam_full".to_string()),
            station_cache_capacity: 0,
        }
    }
}

impl CamServiceConfig {
    fn profile(&self) -> StationProfile {
        StationProfile {
            station_id: self.station_id,
            station_type: self.station_type,
            length_m: self.length_m,
            width_m: self.width_m,
        }
    }

    /// Inbound topics the service subscribes to.
    pub fn inbound_topics(&self) -> Vec<String> {
        let mut topics = vec![self.topic_in.clone()];
        if let Some(full) = &self.full_topic_in {
            topics.push(full.clone());
        }
        topics
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Control commands applied by the event loop between events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceCommand {
    SetInterval(Duration),
    SetAccelerationControl(AccelerationControl),
}

/// Cloneable handle for adjusting a running service.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    sender: mpsc::UnboundedSender<ServiceCommand>,
}

impl ServiceHandle {
    /// Replace the beacon interval; zero stops beaconing.
    pub fn set_interval(&self, interval: Duration) -> Result<(), CamError> {
        self.send(ServiceCommand::SetInterval(interval))
    }

    /// Replace the acceleration-control flags carried by future beacons.
    pub fn set_acceleration_control(&self, flags: AccelerationControl) -> Result<(), CamError> {
        self.send(ServiceCommand::SetAccelerationControl(flags))
    }

    fn send(&self, command: ServiceCommand) -> Result<(), CamError> {
        self.sender
            .send(command)
            .map_err(|_| CamError::Channel("CAM service has stopped".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CamService
// ─────────────────────────────────────────────────────────────────────────────

pub struct CamService {
    config: CamServiceConfig,
    profile: StationProfile,
    transport: Arc<dyn Transport>,
    position: Arc<dyn PositionProvider>,
    pubsub: Vec<Arc<dyn PubSubTransport>>,
    mirror: Option<UdpMirror>,
    metrics: CamMetrics,
    validator: MessageValidator,
    cache: StationCache,
    kinematics: KinematicEngine,
    scheduler: BeaconScheduler,
    clock: RuntimeClock,
    controls: AccelerationControl,
    command_tx: mpsc::UnboundedSender<ServiceCommand>,
    command_rx: Option<mpsc::UnboundedReceiver<ServiceCommand>>,
}

impl CamService {
    pub fn new(
        config: CamServiceConfig,
        transport: Arc<dyn Transport>,
        position: Arc<dyn PositionProvider>,
        metrics: CamMetrics,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            profile: config.profile(),
            cache: StationCache::with_capacity(config.station_cache_capacity),
            config,
            transport,
            position,
            pubsub: Vec::new(),
            mirror: None,
            metrics,
            validator: MessageValidator::cam_defaults(),
            kinematics: KinematicEngine::new(),
            scheduler: BeaconScheduler::new(),
            clock: RuntimeClock::new(),
            controls: AccelerationControl::default(),
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    /// Register a pub/sub transport.  Outbound payloads go to every
    /// registered transport; inbound streams are merged.
    pub fn with_pubsub(mut self, transport: Arc<dyn PubSubTransport>) -> Self {
        self.pubsub.push(transport);
        self
    }

    /// Mirror full reports of received messages over UDP.
    pub fn with_mirror(mut self, mirror: UdpMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_clock(mut self, clock: RuntimeClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_validator(mut self, validator: MessageValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &CamServiceConfig {
        &self.config
    }

    pub fn metrics(&self) -> &CamMetrics {
        &self.metrics
    }

    pub fn scheduler(&self) -> &BeaconScheduler {
        &self.scheduler
    }

    pub fn station_cache(&self) -> &StationCache {
        &self.cache
    }

    /// A handle that adjusts the beacon interval and acceleration-control
    /// flags of the running loop.
    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle {
            sender: self.command_tx.clone(),
        }
    }

    /// Replace the beacon interval immediately.
    pub fn set_interval(&mut self, interval: Duration) {
        self.scheduler.set_interval(interval);
        info!(
            interval_ms = interval.as_millis() as u64,
            armed = self.scheduler.is_armed(),
            "beacon interval set"
        );
    }

    pub fn set_acceleration_control(&mut self, flags: AccelerationControl) {
        self.controls = flags;
    }

    // -------------------------------------------------------------------------
    // Inbound: transport indications
    // -------------------------------------------------------------------------

    /// Report a message received from the transport layer.
    ///
    /// Publishes the scaled shape with reception metadata on `topic_out`,
    /// and, when configured, the full report on `full_topic_out` plus its UDP
    /// mirror.
    pub async fn indicate(&mut self, indication: Indication) -> Result<(), CamError> {
        let Some(message) = indication.message else {
            return Err(CamError::Decode(
                "indication carried an undecodable CAM".to_string(),
            ));
        };

        let pos = message.position();
        let new_info = self.cache.observe(
            message.station_id(),
            pos.latitude,
            pos.longitude,
            indication.reception_time,
        );

        let report = ScaledReport {
            cam: assembler::to_scaled(&message),
            meta: ReceptionMeta {
                timestamp: indication.reception_time,
                new_info,
                rssi: indication.rssi,
                receiver_id: self.config.station_id,
                receiver_type: self.config.station_type,
            },
        };
        self.publish_all(&self.config.topic_out, &assembler::to_json(&report)?)
            .await;
        self.metrics
            .record_rx(self.clock.wall_secs() - indication.reception_time);
        debug!(station_id = message.station_id(), new_info, "CAM received");

        if let Some(full_topic) = &self.config.full_topic_out {
            let full = FullCamReport {
                timestamp: indication.reception_time,
                rssi: indication.rssi,
                decoded: true,
                new_info,
                fields: message,
            };
            let json = assembler::to_json(&full)?;
            self.publish_all(full_topic, &json).await;
            if let Some(mirror) = &self.mirror
                && let Err(e) = mirror.send(&json)
            {
                debug!(error = %e, "UDP mirror send failed");
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Inbound: pub/sub payloads
    // -------------------------------------------------------------------------

    /// Convert a pub/sub payload into a message and dispatch it.
    pub async fn on_message(&mut self, topic: &str, payload: &str) -> Result<(), CamError> {
        let reception_time = self.clock.wall_secs();

        let message = if self.config.full_topic_in.as_deref() == Some(topic) {
            assembler::encode_full(payload, self.config.station_id)?
        } else if topic == self.config.topic_in {
            assembler::encode_scaled(payload, self.clock.generation_delta_time())?
        } else {
            return Err(CamError::Decode(format!("no CAM handler for topic {topic}")));
        };

        self.validator.validate(&message)?;
        self.dispatch(&message)?;
        self.metrics
            .record_tx(Some(self.clock.wall_secs() - reception_time));
        debug!(topic, station_id = message.station_id(), "CAM dispatched from pub/sub");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Outbound: beacon
    // -------------------------------------------------------------------------

    /// Assemble, validate, publish and dispatch the local beacon.
    pub async fn generate_beacon(&mut self) -> Result<AwarenessMessage, CamError> {
        let fix = self.position.position_fix();
        let speed = fix.raw_speed();
        let heading = fix.raw_heading();
        let kinematics = self
            .kinematics
            .update(speed, heading, self.clock.monotonic_secs());

        let state = VehicleState {
            reference_position: fix.reference_position(),
            speed,
            heading,
            kinematics,
            controls: self.controls,
        };
        let message = assembler::build_beacon(
            &self.profile,
            &state,
            self.clock.generation_delta_time(),
        );

        self.validator.validate(&message)?;

        if let Some(topic) = &self.config.own_topic_out {
            let json = assembler::to_json(&assembler::to_scaled(&message))?;
            self.publish_all(topic, &json).await;
        }
        if let Some(topic) = &self.config.own_full_topic_out {
            let json = assembler::to_json(&message.cam)?;
            self.publish_all(topic, &json).await;
        }

        self.dispatch(&message)?;
        self.metrics.record_tx(None);
        Ok(message)
    }

    async fn on_timer(&mut self) {
        if !self.scheduler.fire() {
            return;
        }
        match self.generate_beacon().await {
            Ok(message) => debug!(
                generation_delta_time = message.cam.generation_delta_time,
                "beacon sent"
            ),
            Err(e) => warn!(error = %e, "beacon cycle failed"),
        }
    }

    // -------------------------------------------------------------------------
    // Event loop
    // -------------------------------------------------------------------------

    /// Drive the service until `shutdown` turns `true` or its sender drops.
    ///
    /// Arms the beacon scheduler with the configured interval, subscribes to
    /// the inbound topics on every pub/sub transport and then handles events
    /// serially.
    pub async fn run(
        mut self,
        mut indications: mpsc::Receiver<Indication>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), CamError> {
        let mut commands = self
            .command_rx
            .take()
            .ok_or_else(|| CamError::Channel("command receiver already taken".to_string()))?;
        let mut inbound = self.subscribe_inbound().await;
        let mut inbound_open = !self.pubsub.is_empty();
        let mut indications_open = true;

        self.set_interval(self.config.interval);
        info!(
            station_id = self.config.station_id,
            transports = self.pubsub.len(),
            "CAM service started"
        );

        loop {
            let deadline = self.scheduler.deadline();
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = scheduler::wait_until(deadline) => {
                    self.on_timer().await;
                }
                Some(command) = commands.recv() => {
                    self.apply(command);
                }
                next = inbound.next(), if inbound_open => match next {
                    Some(message) => {
                        if let Err(e) = self.on_message(&message.topic, &message.payload).await {
                            warn!(topic = %message.topic, error = %e, "dropping pub/sub CAM");
                        }
                    }
                    None => {
                        warn!("all pub/sub inbound streams closed");
                        inbound_open = false;
                    }
                },
                next = indications.recv(), if indications_open => match next {
                    Some(indication) => {
                        if let Err(e) = self.indicate(indication).await {
                            warn!(error = %e, "dropping received CAM");
                        }
                    }
                    None => indications_open = false,
                },
            }
        }

        self.scheduler.cancel();
        info!("CAM service stopped");
        Ok(())
    }

    fn apply(&mut self, command: ServiceCommand) {
        match command {
            ServiceCommand::SetInterval(interval) => self.set_interval(interval),
            ServiceCommand::SetAccelerationControl(flags) => self.set_acceleration_control(flags),
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn dispatch(&self, message: &AwarenessMessage) -> Result<(), CamError> {
        let confirm = self.transport.request(&DataRequest::cam(), message);
        if confirm.accepted {
            Ok(())
        } else {
            Err(CamError::DispatchRejected(format!(
                "transport declined CAM from station {}",
                message.station_id()
            )))
        }
    }

    async fn publish_all(&self, topic: &str, payload: &str) {
        for transport in &self.pubsub {
            if let Err(e) = transport.publish(topic, payload).await {
                warn!(transport = transport.name(), topic, error = %e, "publish failed");
            }
        }
    }

    async fn subscribe_inbound(&self) -> BoxStream<'static, BusMessage> {
        let topics = self.config.inbound_topics();
        let mut streams = Vec::with_capacity(self.pubsub.len());
        for transport in &self.pubsub {
            streams.push(transport.subscribe(&topics).await);
        }
        stream::select_all(streams).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camlink_facility::{PositionFix, StaticPositionProvider};
    use camlink_middleware::{ChannelTransport, EventBus, OutboundPacket};
    use camlink_types::CoopAwareness;
    use serde_json::{Value, json};

    struct Harness {
        service: CamService,
        bus: EventBus,
        outbound: mpsc::Receiver<OutboundPacket>,
        position: Arc<StaticPositionProvider>,
    }

    fn harness_with(config: CamServiceConfig, queue: usize) -> Harness {
        let (transport, outbound) = ChannelTransport::new(queue);
        let position = Arc::new(StaticPositionProvider::new(PositionFix {
            latitude_deg: 40.6332,
            longitude_deg: -8.6601,
            speed_mps: Some(10.0),
            course_deg: Some(90.0),
            ..PositionFix::default()
        }));
        let bus = EventBus::default();
        let service = CamService::new(
            config,
            Arc::new(transport),
            position.clone(),
            CamMetrics::unregistered().expect("metrics"),
        )
        .with_pubsub(Arc::new(bus.clone()));
        Harness {
            service,
            bus,
            outbound,
            position,
        }
    }

    fn harness() -> Harness {
        harness_with(CamServiceConfig::default(), 16)
    }

    fn scaled_payload(station_id: Option<u32>) -> String {
        let mut payload = json!({
            "stationType": 5,
            "latitude": 40.1, "longitude": -8.2,
            "semiMajorConf": 4095, "semiMinorConf": 4095, "semiMajorOrient": 3601,
            "altitude": 800001, "altitudeConf": 15,
            "heading": 180.0, "headingConf": 127, "speed": 5.5, "speedConf": 127,
            "driveDirection": "FORWARD",
            "length": 4.5, "width": 1.8, "acceleration": 161,
            "curvature": 1023, "yawRate": 32767,
            "brakePedal": false, "gasPedal": true, "emergencyBrake": false,
            "collisionWarning": false, "accEngaged": false,
            "cruiseControl": false, "speedLimiter": false
        });
        if let Some(id) = station_id {
            payload["stationID"] = json!(id);
        }
        payload.to_string()
    }

    fn remote_message(station_id: u32, latitude: i32) -> AwarenessMessage {
        let mut msg = AwarenessMessage::new(station_id, CoopAwareness::default());
        msg.cam.cam_parameters.basic_container.reference_position.latitude = latitude;
        msg.cam.cam_parameters.basic_container.reference_position.longitude = 10;
        msg
    }

    #[tokio::test]
    async fn beacon_is_dispatched_and_published() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        let mut own = h.bus.subscribe_topic("vanetza/own/cam");
        let mut own_full = h.bus.subscribe_topic("vanetza/own/cam_full");

        let msg = h.service.generate_beacon().await?;
        assert_eq!(msg.station_id(), 1);
        assert_eq!(msg.vehicle().speed.speed_value, 1000);
        assert_eq!(msg.vehicle().heading.heading_value, 900);

        let packet = h.outbound.try_recv()?;
        assert_eq!(packet.message, msg);
        assert_eq!(packet.request, DataRequest::cam());
        assert_eq!(h.service.metrics().tx_count(), 1);

        let scaled: Value = serde_json::from_str(&own.recv().await.ok_or("no own")?.payload)?;
        assert_eq!(scaled["stationID"], 1);
        assert_eq!(scaled["speed"], json!(10.0));
        assert!(scaled.get("newInfo").is_none());

        let full: Value = serde_json::from_str(&own_full.recv().await.ok_or("no full")?.payload)?;
        assert!(full["camParameters"]["basicContainer"].is_object());
        Ok(())
    }

    #[tokio::test]
    async fn beacon_kinematics_follow_speed_changes() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        let first = h.service.generate_beacon().await?;
        assert_eq!(
            first.vehicle().longitudinal_acceleration.longitudinal_acceleration_value,
            camlink_types::LONGITUDINAL_ACCELERATION_UNAVAILABLE
        );
        h.position.set_fix(PositionFix {
            latitude_deg: 40.6332,
            longitude_deg: -8.6601,
            speed_mps: Some(10.05),
            course_deg: Some(90.0),
            ..PositionFix::default()
        });
        let second = h.service.generate_beacon().await?;
        assert_eq!(
            second.vehicle().longitudinal_acceleration.longitudinal_acceleration_value,
            50
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_beacon_is_reported_not_sent() {
        let config = CamServiceConfig {
            width_m: 0.0,
            ..CamServiceConfig::default()
        };
        let mut h = harness_with(config, 16);
        let mut own = h.bus.subscribe_topic("vanetza/own/cam");

        let result = h.service.generate_beacon().await;
        assert!(matches!(result, Err(CamError::Encode { ref field, .. }) if field == "vehicleWidth"));
        assert!(h.outbound.try_recv().is_err());
        assert_eq!(h.service.metrics().tx_count(), 0);
        let published =
            tokio::time::timeout(Duration::from_millis(20), own.recv()).await;
        assert!(published.is_err(), "invalid beacon must not be published");
    }

    #[tokio::test]
    async fn rejected_dispatch_is_not_counted() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness_with(CamServiceConfig::default(), 1);
        h.service.generate_beacon().await?;
        let second = h.service.generate_beacon().await;
        assert!(matches!(second, Err(CamError::DispatchRejected(_))));
        assert_eq!(h.service.metrics().tx_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn scaled_payload_is_dispatched() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        h.service
            .on_message("vanetza/in/cam", &scaled_payload(Some(77)))
            .await?;
        let packet = h.outbound.try_recv()?;
        assert_eq!(packet.message.station_id(), 77);
        assert_eq!(packet.message.vehicle().speed.speed_value, 550);
        assert_eq!(
            packet.message.vehicle().acceleration_control.bits(),
            AccelerationControl::GAS_PEDAL_ENGAGED
        );
        assert_eq!(h.service.metrics().tx_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_station_id_is_dropped_and_later_messages_flow()
    -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        let result = h
            .service
            .on_message("vanetza/in/cam", &scaled_payload(None))
            .await;
        assert!(matches!(result, Err(CamError::Decode(_))));
        assert!(h.outbound.try_recv().is_err());
        assert_eq!(h.service.metrics().tx_count(), 0);
        assert_eq!(h.service.metrics().rx_count(), 0);

        h.service
            .on_message("vanetza/in/cam", &scaled_payload(Some(5)))
            .await?;
        assert_eq!(h.outbound.try_recv()?.message.station_id(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn full_payload_uses_local_station_id() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        let body = serde_json::to_string(&CoopAwareness::default())?;
        h.service.on_message("vanetza/in/cam_full", &body).await?;
        assert_eq!(h.outbound.try_recv()?.message.station_id(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_topic_is_rejected() {
        let mut h = harness();
        let result = h.service.on_message("somewhere/else", "{}").await;
        assert!(matches!(result, Err(CamError::Decode(_))));
    }

    #[tokio::test]
    async fn indication_publishes_reports() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        let mut scaled = h.bus.subscribe_topic("vanetza/out/cam");
        let mut full = h.bus.subscribe_topic("vanetza/out/cam_full");

        h.service
            .indicate(Indication {
                message: Some(remote_message(9, 100)),
                reception_time: 1000.0,
                rssi: -60,
            })
            .await?;

        let report: Value = serde_json::from_str(&scaled.recv().await.ok_or("no scaled")?.payload)?;
        assert_eq!(report["stationID"], 9);
        assert_eq!(report["newInfo"], true);
        assert_eq!(report["rssi"], -60);
        assert_eq!(report["receiverID"], 1);
        assert_eq!(report["timestamp"], json!(1000.0));

        let full_report: FullCamReport =
            serde_json::from_str(&full.recv().await.ok_or("no full")?.payload)?;
        assert!(full_report.decoded);
        assert!(full_report.new_info);
        assert_eq!(full_report.fields.station_id(), 9);

        assert_eq!(h.service.metrics().rx_count(), 1);
        assert_eq!(h.service.station_cache().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_position_is_not_new_info() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness();
        let mut scaled = h.bus.subscribe_topic("vanetza/out/cam");
        for (time, lat) in [(0.0, 100), (0.5, 100), (0.6, 101)] {
            h.service
                .indicate(Indication {
                    message: Some(remote_message(9, lat)),
                    reception_time: time,
                    rssi: 0,
                })
                .await?;
        }
        let mut flags = Vec::new();
        for _ in 0..3 {
            let report: Value =
                serde_json::from_str(&scaled.recv().await.ok_or("missing")?.payload)?;
            flags.push(report["newInfo"].as_bool().ok_or("flag")?);
        }
        assert_eq!(flags, vec![true, false, true]);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_indication_is_dropped() {
        let mut h = harness();
        let result = h
            .service
            .indicate(Indication {
                message: None,
                reception_time: 0.0,
                rssi: 0,
            })
            .await;
        assert!(matches!(result, Err(CamError::Decode(_))));
        assert_eq!(h.service.metrics().rx_count(), 0);
    }

    #[tokio::test]
    async fn indication_without_full_topic_skips_full_report() -> Result<(), Box<dyn std::error::Error>> {
        let config = CamServiceConfig {
            full_topic_out: None,
            ..CamServiceConfig::default()
        };
        let mut h = harness_with(config, 16);
        let mut all = h.bus.subscribe();
        h.service
            .indicate(Indication {
                message: Some(remote_message(2, 0)),
                reception_time: 0.0,
                rssi: 0,
            })
            .await?;
        assert_eq!(all.recv().await?.topic, "vanetza/out/cam");
        assert!(all.try_recv().is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_beacons_until_interval_cleared() -> Result<(), Box<dyn std::error::Error>> {
        let config = CamServiceConfig {
            interval: Duration::from_millis(100),
            ..CamServiceConfig::default()
        };
        let Harness {
            service,
            mut outbound,
            ..
        } = harness_with(config, 64);
        let handle = service.handle();
        let (_indication_tx, indications) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(service.run(indications, shutdown));

        tokio::time::sleep(Duration::from_millis(350)).await;
        let mut sent = 0;
        while outbound.try_recv().is_ok() {
            sent += 1;
        }
        assert_eq!(sent, 3);

        handle.set_interval(Duration::ZERO)?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(outbound.try_recv().is_err(), "idle scheduler must not beacon");

        stop.send(true)?;
        task.await??;
        assert!(handle.set_interval(Duration::from_secs(1)).is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_keeps_beaconing_after_rejected_cycles() -> Result<(), Box<dyn std::error::Error>> {
        let config = CamServiceConfig {
            interval: Duration::from_millis(100),
            ..CamServiceConfig::default()
        };
        let Harness {
            service,
            mut outbound,
            ..
        } = harness_with(config, 1);
        let metrics = service.metrics().clone();
        let (_indication_tx, indications) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(service.run(indications, shutdown));

        // The queue holds one packet: the second and third cycles are rejected.
        tokio::time::sleep(Duration::from_millis(350)).await;
        let mut sent = 0;
        while outbound.try_recv().is_ok() {
            sent += 1;
        }
        assert_eq!(sent, 1);
        assert_eq!(metrics.tx_count(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(outbound.try_recv().is_ok(), "cadence must survive rejected cycles");
        assert_eq!(metrics.tx_count(), 2);

        stop.send(true)?;
        task.await??;
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn handle_sets_acceleration_control_on_later_beacons() -> Result<(), Box<dyn std::error::Error>> {
        let config = CamServiceConfig {
            interval: Duration::from_millis(100),
            ..CamServiceConfig::default()
        };
        let Harness {
            service,
            mut outbound,
            ..
        } = harness_with(config, 64);
        let handle = service.handle();
        let (_indication_tx, indications) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(service.run(indications, shutdown));

        tokio::time::sleep(Duration::from_millis(150)).await;
        let first = outbound.try_recv()?;
        assert_eq!(first.message.vehicle().acceleration_control.bits(), 0);

        let braking =
            AccelerationControl::default().with(AccelerationControl::BRAKE_PEDAL_ENGAGED, true);
        handle.set_acceleration_control(braking)?;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = outbound.try_recv()?;
        assert_eq!(
            second.message.vehicle().acceleration_control.bits(),
            AccelerationControl::BRAKE_PEDAL_ENGAGED
        );

        stop.send(true)?;
        task.await??;
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_handles_pubsub_and_indications() -> Result<(), Box<dyn std::error::Error>> {
        let config = CamServiceConfig {
            interval: Duration::ZERO,
            ..CamServiceConfig::default()
        };
        let Harness {
            service,
            bus,
            mut outbound,
            ..
        } = harness_with(config, 64);
        let mut reports = bus.subscribe_topic("vanetza/out/cam");
        let (indication_tx, indications) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(service.run(indications, shutdown));

        // Let the loop subscribe before publishing.
        tokio::time::sleep(Duration::from_millis(10)).await;
        bus.publish("vanetza/in/cam", scaled_payload(None))?;
        bus.publish("vanetza/in/cam", scaled_payload(Some(31)))?;
        indication_tx
            .send(Indication {
                message: Some(remote_message(44, 7)),
                reception_time: 0.0,
                rssi: -80,
            })
            .await?;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(outbound.recv().await.ok_or("no packet")?.message.station_id(), 31);
        let report: Value = serde_json::from_str(&reports.recv().await.ok_or("no report")?.payload)?;
        assert_eq!(report["stationID"], 44);

        drop(stop);
        task.await??;
        Ok(())
    }
}
