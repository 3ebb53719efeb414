//! `camlinkd` – the CAM facility daemon.
//!
//! 1. Initialises tracing (and OTLP export when configured).
//! 2. Loads `~/.camlink/config.toml` (or `$CAMLINK_CONFIG`) with `CAMLINK_*`
//!    overrides.
//! 3. Wires the in-process event bus, the queueing transport, Prometheus
//!    metrics, the optional UDP mirror and a static position provider into a
//!    [`CamService`].
//! 4. Runs the service until Ctrl-C.
//!
//! `camlinkd --init` writes the default config file and exits.

mod config;

use std::sync::Arc;

use camlink_facility::StaticPositionProvider;
use camlink_middleware::{CamMetrics, ChannelTransport, EventBus, OutboundPacket, UdpMirror};
use camlink_runtime::{CamService, telemetry};
use camlink_types::CamError;
use prometheus::Registry;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Depth of the queue between the service and the networking layer.
const TRANSPORT_QUEUE: usize = 256;

fn main() {
    let _telemetry = telemetry::init_tracing("camlinkd");

    if std::env::args().skip(1).any(|arg| arg == "--init") {
        init_config();
        return;
    }

    let cfg = match config::load() {
        Ok(cfg) => {
            info!(path = %config::config_path().display(), "config loaded");
            cfg
        }
        Err(e) => {
            warn!(error = %e, "using default configuration");
            config::Config::default()
        }
    };

    // ── Shutdown signal ───────────────────────────────────────────────────
    let (stop, shutdown) = watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Ctrl-C received, shutting down");
        let _ = stop.send(true);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown unavailable");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start Tokio runtime");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cfg, shutdown)) {
        error!(error = %e, "camlinkd stopped with an error");
        std::process::exit(1);
    }
}

async fn run(cfg: config::Config, shutdown: watch::Receiver<bool>) -> Result<(), CamError> {
    let metrics = CamMetrics::new(Arc::new(Registry::new()))?;

    let (transport, outbound) = ChannelTransport::new(TRANSPORT_QUEUE);
    let drain = tokio::spawn(drain_outbound(outbound));

    let bus = EventBus::default();
    let provider = Arc::new(StaticPositionProvider::new(cfg.position_fix()));

    let mut service = CamService::new(
        cfg.service_config(),
        Arc::new(transport),
        provider,
        metrics.clone(),
    )
    .with_pubsub(Arc::new(bus));

    match cfg.udp_target() {
        Ok(Some(target)) => match UdpMirror::bind(target).await {
            Ok(mirror) => {
                info!(%target, "UDP mirror enabled");
                service = service.with_mirror(mirror);
            }
            Err(e) => warn!(error = %e, "UDP mirror disabled"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "UDP mirror disabled"),
    }

    // No radio is attached; the sender stays open so the loop keeps polling.
    let (_indication_tx, indications) = mpsc::channel(TRANSPORT_QUEUE);

    info!(
        station_id = cfg.station_id,
        beacon = cfg.cam.enabled,
        interval_ms = cfg.cam.interval_ms,
        "camlinkd running"
    );
    let result = service.run(indications, shutdown).await;
    drain.abort();

    info!(
        rx = metrics.rx_count(),
        tx = metrics.tx_count(),
        rx_latency_s = metrics.rx_latency(),
        tx_latency_s = metrics.tx_latency(),
        "final CAM counters"
    );
    result
}

fn init_config() {
    let path = config::config_path();
    if path.exists() {
        info!(path = %path.display(), "config already present");
        return;
    }
    match config::save_to(&config::Config::default(), &path) {
        Ok(()) => info!(path = %path.display(), "default config written"),
        Err(e) => {
            error!(error = %e, "failed to write config");
            std::process::exit(1);
        }
    }
}

/// Stand-in for the networking layer: logs every accepted outbound CAM.
async fn drain_outbound(mut outbound: mpsc::Receiver<OutboundPacket>) {
    while let Some(packet) = outbound.recv().await {
        debug!(
            station_id = packet.message.station_id(),
            its_aid = packet.request.its_aid,
            generation_delta_time = packet.message.cam.generation_delta_time,
            "CAM handed to transport"
        );
    }
}
