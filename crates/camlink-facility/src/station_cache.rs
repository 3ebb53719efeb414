//! [`StationCache`] – per-station change detection.
//!
//! Each decoded CAM is run through [`StationCache::observe`], which reports
//! whether the message carries *new information*: the station is unknown,
//! its reference position moved, or at least [`REFRESH_INTERVAL_SECS`] have
//! passed since the last recorded update.  The flag is advisory and is only
//! attached to the published JSON as `newInfo`.
//!
//! Records are never removed unless a capacity is set with
//! [`StationCache::with_capacity`], in which case the least recently updated
//! station is evicted to make room.

use std::collections::HashMap;

use tracing::debug;

/// Elapsed reception time after which an unchanged position counts as new.
pub const REFRESH_INTERVAL_SECS: f64 = 1.0;

/// Last recorded state of one originating station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationRecord {
    /// Raw latitude (0.1 micro-degrees).
    pub latitude: i32,
    /// Raw longitude (0.1 micro-degrees).
    pub longitude: i32,
    /// Reception time of the recorded message, in seconds.
    pub reception_time: f64,
}

/// Change-detection cache keyed by station identifier.
///
/// # Example
///
/// ```
/// use camlink_facility::station_cache::StationCache;
///
/// let mut cache = StationCache::new();
/// assert!(cache.observe(1, 10, 20, 0.0));
/// assert!(!cache.observe(1, 10, 20, 0.5));
/// assert!(cache.observe(1, 10, 20, 1.5));
/// ```
#[derive(Debug, Default)]
pub struct StationCache {
    records: HashMap<u32, StationRecord>,
    capacity: Option<usize>,
}

impl StationCache {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `capacity` stations.  A capacity of
    /// zero means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            capacity: (capacity > 0).then_some(capacity),
        }
    }

    /// Record a message from `station_id` and report whether it carries new
    /// information.
    ///
    /// The stored record is overwritten only when the answer is `true`.
    pub fn observe(
        &mut self,
        station_id: u32,
        latitude: i32,
        longitude: i32,
        reception_time: f64,
    ) -> bool {
        let new_info = match self.records.get(&station_id) {
            None => true,
            Some(rec) => {
                rec.latitude != latitude
                    || rec.longitude != longitude
                    || reception_time - rec.reception_time >= REFRESH_INTERVAL_SECS
            }
        };

        if new_info {
            if !self.records.contains_key(&station_id) {
                self.make_room();
            }
            self.records.insert(
                station_id,
                StationRecord {
                    latitude,
                    longitude,
                    reception_time,
                },
            );
        }
        new_info
    }

    /// Return the record for `station_id`, if any.
    pub fn get(&self, station_id: u32) -> Option<&StationRecord> {
        self.records.get(&station_id)
    }

    /// Number of stations currently tracked.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn make_room(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.records.len() >= capacity {
            let oldest = self
                .records
                .iter()
                .min_by(|a, b| a.1.reception_time.total_cmp(&b.1.reception_time))
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.records.remove(&id);
                    debug!(station_id = id, capacity, "evicted station record");
                }
                None => break,
            }
        }
    }
}
