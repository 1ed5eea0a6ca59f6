use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::driver::DriverUpdate;
use crate::models::trip::TripUpdate;

/// Pull a numeric value out of a field that backends send as either a
/// JSON number or a numeric string. Non-finite values are rejected.
pub fn finite_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
        _ => None,
    }
}

/// Like [`finite_f64`] but for integer identities (driver and trip IDs).
/// A whole-valued float is accepted; anything fractional is not an ID.
pub fn int_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
        }
        _ => None,
    }
}

/// First present, non-null field among `names`, in priority order.
fn field<'a>(payload: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| payload.get(name).filter(|v| !v.is_null()))
}

fn opt_string(payload: &Value, names: &[&str]) -> Option<String> {
    field(payload, names)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalize a driver-location payload into a canonical update.
///
/// Identity comes from `driverId` (legacy: `id`), coordinates from
/// `lat`/`latitude` and `lng`/`longitude`. Returns `None` when identity
/// or either coordinate is missing or fails to parse as a finite number;
/// such payloads are unusable and must not touch the model.
pub fn normalize_driver(payload: &Value) -> Option<DriverUpdate> {
    let driver_id = field(payload, &["driverId", "id"]).and_then(int_id)?;
    let lat = field(payload, &["lat", "latitude"]).and_then(finite_f64)?;
    let lng = field(payload, &["lng", "longitude"]).and_then(finite_f64)?;

    // Explicit status wins; otherwise derive it from the availability flag.
    let status = opt_string(payload, &["status"]).or_else(|| {
        payload
            .get("isAvailable")
            .and_then(Value::as_bool)
            .map(|available| if available { "online" } else { "offline" }.to_string())
    });

    let updated_at = payload
        .get("updatedAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(DriverUpdate {
        driver_id,
        lat,
        lng,
        status,
        updated_at,
    })
}

/// Normalize a trip payload into a canonical update.
///
/// Identity comes from `id` (legacy: `tripId`); everything else is
/// optional so that partial updates merge rather than clobber.
pub fn normalize_trip(payload: &Value) -> Option<TripUpdate> {
    let id = field(payload, &["id", "tripId"]).and_then(int_id)?;

    Some(TripUpdate {
        id,
        status: opt_string(payload, &["status"]),
        pickup_location: opt_string(payload, &["pickupLocation", "pickup"]),
        dropoff_location: opt_string(payload, &["dropoffLocation", "dropoff"]),
        ride_mode: opt_string(payload, &["rideMode", "mode"]),
        assigned_to_driver: field(payload, &["assignedToDriver"]).and_then(int_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn driver_with_string_coordinates() {
        let payload = json!({
            "driverId": "17",
            "lat": "+20.652494",
            "lng": "-100.391404",
            "status": "online"
        });
        let update = normalize_driver(&payload).unwrap();
        assert_eq!(update.driver_id, 17);
        assert_eq!(update.lat, 20.652494);
        assert_eq!(update.lng, -100.391404);
        assert_eq!(update.status.as_deref(), Some("online"));
    }

    #[test]
    fn driver_accepts_legacy_field_names() {
        let payload = json!({ "id": 4, "latitude": 19.4, "longitude": -99.1 });
        let update = normalize_driver(&payload).unwrap();
        assert_eq!(update.driver_id, 4);
        assert_eq!(update.lat, 19.4);
        assert_eq!(update.lng, -99.1);
        assert!(update.status.is_none());
    }

    #[test]
    fn driver_with_unparseable_latitude_is_rejected() {
        let payload = json!({ "driverId": 9, "lat": "not-a-number", "lng": -100.0 });
        assert!(normalize_driver(&payload).is_none());
    }

    #[test]
    fn driver_missing_coordinate_is_rejected() {
        let payload = json!({ "driverId": 9, "lat": 20.0 });
        assert!(normalize_driver(&payload).is_none());
    }

    #[test]
    fn driver_with_null_primary_id_falls_back() {
        let payload = json!({ "driverId": null, "id": 12, "lat": 1.0, "lng": 2.0 });
        assert_eq!(normalize_driver(&payload).unwrap().driver_id, 12);
    }

    #[test]
    fn status_derived_from_availability_flag() {
        let payload = json!({ "driverId": 3, "lat": 1.0, "lng": 2.0, "isAvailable": false });
        let update = normalize_driver(&payload).unwrap();
        assert_eq!(update.status.as_deref(), Some("offline"));

        let payload = json!({ "driverId": 3, "lat": 1.0, "lng": 2.0, "isAvailable": true });
        let update = normalize_driver(&payload).unwrap();
        assert_eq!(update.status.as_deref(), Some("online"));
    }

    #[test]
    fn explicit_status_wins_over_availability_flag() {
        let payload = json!({
            "driverId": 3, "lat": 1.0, "lng": 2.0,
            "status": "break", "isAvailable": true
        });
        let update = normalize_driver(&payload).unwrap();
        assert_eq!(update.status.as_deref(), Some("break"));
    }

    #[test]
    fn driver_updated_at_parses_rfc3339() {
        let payload = json!({
            "driverId": 3, "lat": 1.0, "lng": 2.0,
            "updatedAt": "2026-08-30T12:00:00Z"
        });
        let update = normalize_driver(&payload).unwrap();
        assert_eq!(update.updated_at.to_rfc3339(), "2026-08-30T12:00:00+00:00");
    }

    #[test]
    fn trip_id_and_trip_id_alias_normalize_the_same() {
        let a = normalize_trip(&json!({ "tripId": 7 })).unwrap();
        let b = normalize_trip(&json!({ "id": 7 })).unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn trip_without_identity_is_rejected() {
        assert!(normalize_trip(&json!({ "status": "requested" })).is_none());
        assert!(normalize_trip(&json!({ "id": "n/a" })).is_none());
    }

    #[test]
    fn trip_optional_fields_pass_through() {
        let payload = json!({
            "id": 42,
            "status": "assigned",
            "pickup": "Centro",
            "dropoffLocation": "Airport T2",
            "mode": "scheduled",
            "assignedToDriver": 17
        });
        let update = normalize_trip(&payload).unwrap();
        assert_eq!(update.status.as_deref(), Some("assigned"));
        assert_eq!(update.pickup_location.as_deref(), Some("Centro"));
        assert_eq!(update.dropoff_location.as_deref(), Some("Airport T2"));
        assert_eq!(update.ride_mode.as_deref(), Some("scheduled"));
        assert_eq!(update.assigned_to_driver, Some(17));
    }

    #[test]
    fn whole_valued_float_ids_are_accepted() {
        assert_eq!(int_id(&json!(7.0)), Some(7));
        assert_eq!(int_id(&json!(7.5)), None);
        assert_eq!(int_id(&json!("7")), Some(7));
    }
}
