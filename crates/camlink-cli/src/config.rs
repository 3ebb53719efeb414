//! Configuration vault – reads/writes `~/.camlink/config.toml`.
//!
//! A missing file yields the defaults.  `CAMLINK_*` environment variables
//! override individual fields after the file is parsed.

use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use camlink_facility::PositionFix;
use camlink_runtime::CamServiceConfig;
use camlink_types::{CamError, STATION_TYPE_PASSENGER_CAR};
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CAMLINK_CONFIG";

/// Persisted daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_station_id")]
    pub station_id: u32,

    #[serde(default = "default_station_type")]
    pub station_type: i32,

    /// Vehicle length in metres.
    #[serde(default = "default_length")]
    pub length_m: f64,

    /// Vehicle width in metres.
    #[serde(default = "default_width")]
    pub width_m: f64,

    #[serde(default)]
    pub cam: CamSection,

    #[serde(default)]
    pub position: PositionSection,
}

/// The `[cam]` table.  Empty topic strings disable the optional topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CamSection {
    /// Periodic beaconing on/off.
    pub enabled: bool,
    pub interval_ms: u64,
    pub topic_in: String,
    pub topic_out: String,
    pub full_topic_in: String,
    pub full_topic_out: String,
    pub own_topic_out: String,
    pub own_full_topic_out: String,
    /// Host of the UDP mirror; empty disables it, as does a zero port.
    pub udp_out_addr: String,
    pub udp_out_port: u16,
    /// 0 = unbounded.
    pub station_cache_capacity: usize,
}

/// The `[position]` table feeding the static position provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSection {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: Option<f64>,
    pub speed_mps: Option<f64>,
    pub heading_deg: Option<f64>,
}

fn default_station_id() -> u32 {
    1
}
fn default_station_type() -> i32 {
    STATION_TYPE_PASSENGER_CAR
}
fn default_length() -> f64 {
    4.5
}
fn default_width() -> f64 {
    1.8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station_id: default_station_id(),
            station_type: default_station_type(),
            length_m: default_length(),
            width_m: default_width(),
            cam: CamSection::default(),
            position: PositionSection::default(),
        }
    }
}

impl Default for CamSection {
    fn default() -> Self {
        let service = CamServiceConfig::default();
        Self {
            enabled: true,
            interval_ms: service.interval.as_millis() as u64,
            topic_in: service.topic_in,
            topic_out: service.topic_out,
            full_topic_in: service.full_topic_in.unwrap_or_default(),
            full_topic_out: service.full_topic_out.unwrap_or_default(),
            own_topic_out: service.own_topic_out.unwrap_or_default(),
            own_full_topic_out: service.own_full_topic_out.unwrap_or_default(),
            udp_out_addr: String::new(),
            udp_out_port: 0,
            station_cache_capacity: service.station_cache_capacity,
        }
    }
}

fn optional(topic: &str) -> Option<String> {
    (!topic.is_empty()).then(|| topic.to_string())
}

impl Config {
    /// The library-level service configuration.  A disabled `[cam]` section
    /// maps to a zero interval, leaving the beacon scheduler idle.
    pub fn service_config(&self) -> CamServiceConfig {
        let interval = if self.cam.enabled {
            Duration::from_millis(self.cam.interval_ms)
        } else {
            Duration::ZERO
        };
        CamServiceConfig {
            station_id: self.station_id,
            station_type: self.station_type,
            length_m: self.length_m,
            width_m: self.width_m,
            interval,
            topic_in: self.cam.topic_in.clone(),
            topic_out: self.cam.topic_out.clone(),
            full_topic_in: optional(&self.cam.full_topic_in),
            full_topic_out: optional(&self.cam.full_topic_out),
            own_topic_out: optional(&self.cam.own_topic_out),
            own_full_topic_out: optional(&self.cam.own_full_topic_out),
            station_cache_capacity: self.cam.station_cache_capacity,
        }
    }

    /// The fix served by the static position provider.
    pub fn position_fix(&self) -> PositionFix {
        PositionFix {
            latitude_deg: self.position.latitude,
            longitude_deg: self.position.longitude,
            altitude_m: self.position.altitude_m,
            confidence: None,
            speed_mps: self.position.speed_mps,
            course_deg: self.position.heading_deg,
        }
    }

    /// Resolve the UDP mirror target.  `Ok(None)` when no address or no
    /// port is set.
    pub fn udp_target(&self) -> Result<Option<SocketAddr>, CamError> {
        if self.cam.udp_out_addr.is_empty() || self.cam.udp_out_port == 0 {
            return Ok(None);
        }
        let host = self.cam.udp_out_addr.as_str();
        (host, self.cam.udp_out_port)
            .to_socket_addrs()
            .map_err(|e| CamError::Config(format!("invalid UDP target {host}: {e}")))?
            .next()
            .map(Some)
            .ok_or_else(|| CamError::Config(format!("UDP target {host} did not resolve")))
    }
}

/// Return the config path: `$CAMLINK_CONFIG`, else `~/.camlink/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".camlink").join("config.toml")
}

/// Load the config with environment overrides applied.
pub fn load() -> Result<Config, CamError> {
    let mut cfg = load_from(&config_path())?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

/// Load the config from `path`, falling back to defaults when it is absent.
pub(crate) fn load_from(path: &Path) -> Result<Config, CamError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        CamError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    toml::from_str(&raw).map_err(|e| CamError::Config(format!("failed to parse config: {e}")))
}

/// Apply `CAMLINK_*` overrides read through `lookup`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CAMLINK_STATION_ID` | `station_id` |
/// | `CAMLINK_CAM_INTERVAL_MS` | `cam.interval_ms` |
/// | `CAMLINK_UDP_OUT_ADDR` | `cam.udp_out_addr` |
/// | `CAMLINK_UDP_OUT_PORT` | `cam.udp_out_port` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CAMLINK_STATION_ID")
        && let Ok(id) = v.parse::<u32>()
    {
        cfg.station_id = id;
    }
    if let Some(v) = lookup("CAMLINK_CAM_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.cam.interval_ms = ms;
    }
    if let Some(v) = lookup("CAMLINK_UDP_OUT_ADDR") {
        cfg.cam.udp_out_addr = v;
    }
    if let Some(v) = lookup("CAMLINK_UDP_OUT_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.cam.udp_out_port = port;
    }
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), CamError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CamError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| CamError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        CamError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}
