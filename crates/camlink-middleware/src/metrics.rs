//! Prometheus counters for CAM traffic.
//!
//! Two metric families are registered, both labelled by `message` (always
//! `"cam"` here) and `direction` (`"rx"` / `"tx"`):
//!
//! | Metric | Type | Meaning |
//! |---|---|---|
//! | `camlink_packets_total` | counter | messages received / transmitted |
//! | `camlink_latency_seconds_total` | counter | cumulative reception-to-processing latency |

use std::sync::Arc;

use camlink_types::CamError;
use prometheus::{CounterVec, IntCounterVec, Opts, Registry};

const MESSAGE_CAM: &str = "cam";
const DIRECTION_RX: &str = "rx";
const DIRECTION_TX: &str = "tx";

/// CAM packet and latency counters.
#[derive(Clone)]
pub struct CamMetrics {
    packets: IntCounterVec,
    latency: CounterVec,
    registry: Arc<Registry>,
}

impl CamMetrics {
    /// Register all CAM metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> Result<Self, CamError> {
        let packets = IntCounterVec::new(
            Opts::new("camlink_packets_total", "Total CAM packets by direction"),
            &["message", "direction"],
        )
        .map_err(metrics_error)?;
        registry
            .register(Box::new(packets.clone()))
            .map_err(metrics_error)?;

        let latency = CounterVec::new(
            Opts::new(
                "camlink_latency_seconds_total",
                "Cumulative CAM processing latency in seconds by direction",
            ),
            &["message", "direction"],
        )
        .map_err(metrics_error)?;
        registry
            .register(Box::new(latency.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            packets,
            latency,
            registry,
        })
    }

    /// Metrics registered on a private registry.
    pub fn unregistered() -> Result<Self, CamError> {
        Self::new(Arc::new(Registry::new()))
    }

    /// Count one received message and add its latency.
    pub fn record_rx(&self, latency_secs: f64) {
        self.packets
            .with_label_values(&[MESSAGE_CAM, DIRECTION_RX])
            .inc();
        self.add_latency(DIRECTION_RX, latency_secs);
    }

    /// Count one transmitted message; `latency_secs` is present when the
    /// message originated from an inbound payload.
    pub fn record_tx(&self, latency_secs: Option<f64>) {
        self.packets
            .with_label_values(&[MESSAGE_CAM, DIRECTION_TX])
            .inc();
        if let Some(secs) = latency_secs {
            self.add_latency(DIRECTION_TX, secs);
        }
    }

    pub fn rx_count(&self) -> u64 {
        self.packets
            .with_label_values(&[MESSAGE_CAM, DIRECTION_RX])
            .get()
    }

    pub fn tx_count(&self) -> u64 {
        self.packets
            .with_label_values(&[MESSAGE_CAM, DIRECTION_TX])
            .get()
    }

    pub fn rx_latency(&self) -> f64 {
        self.latency
            .with_label_values(&[MESSAGE_CAM, DIRECTION_RX])
            .get()
    }

    pub fn tx_latency(&self) -> f64 {
        self.latency
            .with_label_values(&[MESSAGE_CAM, DIRECTION_TX])
            .get()
    }

    /// The registry the counters were registered on.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // Counters reject negative increments.
    fn add_latency(&self, direction: &str, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.latency
                .with_label_values(&[MESSAGE_CAM, direction])
                .inc_by(secs);
        }
    }
}

impl std::fmt::Debug for CamMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CamMetrics").finish_non_exhaustive()
    }
}

fn metrics_error(e: prometheus::Error) -> CamError {
    CamError::Metrics(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() -> Result<(), Box<dyn std::error::Error>> {
        let metrics = CamMetrics::unregistered()?;
        assert_eq!(metrics.rx_count(), 0);
        assert_eq!(metrics.tx_count(), 0);
        assert_eq!(metrics.rx_latency(), 0.0);
        Ok(())
    }

    #[test]
    fn rx_and_tx_are_separate() -> Result<(), Box<dyn std::error::Error>> {
        let metrics = CamMetrics::unregistered()?;
        metrics.record_rx(0.25);
        metrics.record_rx(0.25);
        metrics.record_tx(None);
        metrics.record_tx(Some(0.5));
        assert_eq!(metrics.rx_count(), 2);
        assert_eq!(metrics.tx_count(), 2);
        assert!((metrics.rx_latency() - 0.5).abs() < 1e-9);
        assert!((metrics.tx_latency() - 0.5).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn negative_latency_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
        let metrics = CamMetrics::unregistered()?;
        metrics.record_rx(-3.0);
        metrics.record_rx(f64::NAN);
        assert_eq!(metrics.rx_count(), 2);
        assert_eq!(metrics.rx_latency(), 0.0);
        Ok(())
    }

    #[test]
    fn double_registration_fails() -> Result<(), Box<dyn std::error::Error>> {
        let registry = Arc::new(Registry::new());
        let _first = CamMetrics::new(registry.clone())?;
        assert!(matches!(CamMetrics::new(registry), Err(CamError::Metrics(_))));
        Ok(())
    }

    #[test]
    fn metrics_are_gathered_from_registry() -> Result<(), Box<dyn std::error::Error>> {
        let metrics = CamMetrics::unregistered()?;
        metrics.record_tx(None);
        let names: Vec<String> = metrics
            .registry()
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"camlink_packets_total".to_string()));
        Ok(())
    }
}
