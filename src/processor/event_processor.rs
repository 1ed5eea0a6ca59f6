use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::event::EventKind;
use crate::processor::normalize::{normalize_driver, normalize_trip};
use crate::state::LiveModel;

/// Wire envelope for push-channel frames: `{"event": <name>, "payload": {...}}`.
#[derive(Debug, Deserialize)]
struct SocketFrame {
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Process one inbound text frame against the live model.
///
/// The backend emits the same semantic events under a legacy flat name
/// and a namespaced `live_map:` name; both land in the same handler.
/// Malformed frames are dropped silently: a bad message must never tear
/// down the connection or corrupt the model.
pub fn process_frame(model: &mut LiveModel, text: &str) {
    let frame: SocketFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "Dropping unparseable frame");
            return;
        }
    };

    match frame.event.as_str() {
        "updateDriverLocation" | "live_map:driver_location" => {
            // Invalid identity or coordinates: drop without logging an entry.
            if let Some(update) = normalize_driver(&frame.payload) {
                model.upsert_driver(update);
                model.push_event(EventKind::Location, frame.payload);
            } else {
                debug!("Dropping location event with unusable identity or coordinates");
            }
        }
        "trip_request" | "live_map:trip" => {
            if let Some(update) = normalize_trip(&frame.payload) {
                model.upsert_trip(update);
                model.push_event(EventKind::Trip, frame.payload);
            } else {
                debug!("Dropping trip event with no parseable identity");
            }
        }
        // Advisory signals: logged for the console feed, never merged.
        "driver_status" | "live_map:driver_status" => {
            model.push_event(EventKind::DriverStatus, frame.payload);
        }
        "session_event" | "live_map:session" => {
            model.push_event(EventKind::Session, frame.payload);
        }
        other => {
            debug!(event = other, "Ignoring unknown event");
        }
    }
}
