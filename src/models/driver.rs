use chrono::{DateTime, Utc};
use serde::Serialize;

/// Last known position of a driver currently sharing GPS.
///
/// Unique per `driver_id` in the live set. Drivers are never removed;
/// a driver going offline flips `status`, nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct DriverLocation {
    pub driver_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A normalized location update, ready to merge into the live set.
///
/// Coordinates and identity are mandatory (an update without them is
/// rejected at the normalization boundary); `status` stays optional so
/// that a merge can tell "not reported" apart from an explicit value.
#[derive(Debug, Clone)]
pub struct DriverUpdate {
    pub driver_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DriverLocation {
    pub fn from_update(update: DriverUpdate) -> Self {
        Self {
            driver_id: update.driver_id,
            lat: update.lat,
            lng: update.lng,
            status: update.status,
            updated_at: update.updated_at,
        }
    }

    /// Merge an update for the same driver. Position and timestamp always
    /// follow the update; `status` is retained when the update omits it.
    pub fn apply(&mut self, update: DriverUpdate) {
        debug_assert_eq!(self.driver_id, update.driver_id);
        self.lat = update.lat;
        self.lng = update.lng;
        self.updated_at = update.updated_at;
        if update.status.is_some() {
            self.status = update.status;
        }
    }
}
