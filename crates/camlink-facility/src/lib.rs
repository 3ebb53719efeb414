//! `camlink-facility` – CAM facility-layer logic.
//!
//! Pure, synchronous building blocks used by the runtime:
//!
//! - [`value_codec`] – scale factors and "unavailable" sentinels between raw
//!   CAM units and physical units.
//! - [`kinematics`] – [`KinematicEngine`][kinematics::KinematicEngine]:
//!   acceleration and yaw rate derived from successive speed/heading samples.
//! - [`station_cache`] – [`StationCache`][station_cache::StationCache]:
//!   per-station change detection producing the `newInfo` flag.
//! - [`assembler`] – conversion between messages and the scaled / full JSON
//!   shapes, and assembly of the local beacon.
//! - [`validator`] – [`MessageValidator`][validator::MessageValidator]:
//!   data-model range checks run before every dispatch.
//! - [`position`] – the [`PositionProvider`][position::PositionProvider]
//!   seam and raw-unit sanitisation of position fixes.

pub mod assembler;
pub mod kinematics;
pub mod position;
pub mod station_cache;
pub mod validator;
pub mod value_codec;

pub use assembler::{ScaledCam, StationProfile, VehicleState};
pub use kinematics::{KinematicEngine, Kinematics};
pub use position::{PositionFix, PositionProvider, StaticPositionProvider};
pub use station_cache::StationCache;
pub use validator::{Constraint, MessageValidator, RangeConstraint};
