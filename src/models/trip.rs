use serde::Serialize;

pub const DEFAULT_TRIP_STATUS: &str = "requested";
pub const DEFAULT_RIDE_MODE: &str = "ride_now";
pub const UNKNOWN_PICKUP: &str = "Unknown pickup";
pub const UNKNOWN_DROPOFF: &str = "Unknown dropoff";

/// A trip awaiting (or undergoing) assignment, as shown on the live map.
///
/// Unique by `id`; the live list is most-recent-first and capped.
#[derive(Debug, Clone, Serialize)]
pub struct PendingTrip {
    pub id: i64,
    pub status: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub ride_mode: String,
    /// Informational reference only; not validated against the driver set.
    pub assigned_to_driver: Option<i64>,
}

/// A normalized trip update. Only the identity is mandatory; every other
/// field is optional so that a partial update merges instead of clobbering.
#[derive(Debug, Clone)]
pub struct TripUpdate {
    pub id: i64,
    pub status: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub ride_mode: Option<String>,
    pub assigned_to_driver: Option<i64>,
}

impl PendingTrip {
    /// Build a fresh record, filling unreported fields with placeholders.
    pub fn from_update(update: TripUpdate) -> Self {
        Self {
            id: update.id,
            status: update.status.unwrap_or_else(|| DEFAULT_TRIP_STATUS.to_string()),
            pickup_location: update
                .pickup_location
                .unwrap_or_else(|| UNKNOWN_PICKUP.to_string()),
            dropoff_location: update
                .dropoff_location
                .unwrap_or_else(|| UNKNOWN_DROPOFF.to_string()),
            ride_mode: update.ride_mode.unwrap_or_else(|| DEFAULT_RIDE_MODE.to_string()),
            assigned_to_driver: update.assigned_to_driver,
        }
    }

    /// Merge an update for the same trip; fields the update omits keep
    /// their prior values.
    pub fn apply(&mut self, update: TripUpdate) {
        debug_assert_eq!(self.id, update.id);
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(pickup) = update.pickup_location {
            self.pickup_location = pickup;
        }
        if let Some(dropoff) = update.dropoff_location {
            self.dropoff_location = dropoff;
        }
        if let Some(mode) = update.ride_mode {
            self.ride_mode = mode;
        }
        if update.assigned_to_driver.is_some() {
            self.assigned_to_driver = update.assigned_to_driver;
        }
    }
}
