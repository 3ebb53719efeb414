//! `camlink-runtime` – the CAM service loop and its process-level plumbing.
//!
//! # Modules
//!
//! - [`service`] – [`CamService`][service::CamService]: owns the station
//!   cache, kinematic engine and beacon scheduler, and handles transport
//!   indications, pub/sub payloads and beacon timer firings one at a time.
//! - [`scheduler`] – [`BeaconScheduler`][scheduler::BeaconScheduler]: the
//!   beacon cadence as an explicit `Idle` / `Armed` state machine.
//! - [`clock`] – [`RuntimeClock`][clock::RuntimeClock]: monotonic time
//!   anchored to the ITS epoch, used for generation delta time, kinematics
//!   and latency.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.
//!   Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable export.

pub mod clock;
pub mod scheduler;
pub mod service;
pub mod telemetry;

pub use clock::RuntimeClock;
pub use scheduler::{BeaconScheduler, SchedulerState};
pub use service::{CamService, CamServiceConfig, ServiceCommand, ServiceHandle};
pub use telemetry::{TracerProviderGuard, init_tracing};
