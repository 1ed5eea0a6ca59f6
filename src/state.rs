use std::collections::VecDeque;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::driver::{DriverLocation, DriverUpdate};
use crate::models::event::{EventKind, EventLogEntry};
use crate::models::trip::{PendingTrip, TripUpdate};

/// Health of the push-channel connection. Owned and mutated exclusively
/// by the stream client; read-only everywhere else.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionState {
    pub connected: bool,
    pub connection_error: Option<String>,
}

/// The live in-memory projection behind the map and side panels:
/// driver positions, pending trips, a rolling diagnostic event log,
/// and connection health.
///
/// Every mutation is synchronous; one inbound message is fully merged
/// and logged before the next is handled.
#[derive(Debug)]
pub struct LiveModel {
    drivers: Vec<DriverLocation>,
    trips: Vec<PendingTrip>,
    events: VecDeque<EventLogEntry>,
    connection: ConnectionState,
    trip_cap: usize,
    event_cap: usize,
}

impl LiveModel {
    pub fn new(trip_cap: usize, event_cap: usize) -> Self {
        Self {
            drivers: Vec::new(),
            trips: Vec::new(),
            events: VecDeque::with_capacity(event_cap),
            connection: ConnectionState::default(),
            trip_cap,
            event_cap,
        }
    }

    /// Merge a location update by driver identity. Existing drivers are
    /// updated in place (insertion order preserved); unknown drivers are
    /// appended. Drivers are never removed from the set.
    pub fn upsert_driver(&mut self, update: DriverUpdate) {
        match self.drivers.iter_mut().find(|d| d.driver_id == update.driver_id) {
            Some(existing) => existing.apply(update),
            None => self.drivers.push(DriverLocation::from_update(update)),
        }
    }

    /// Merge a trip update by identity. New trips are prepended so the
    /// list stays most-recent-first, and the tail past the cap is evicted.
    pub fn upsert_trip(&mut self, update: TripUpdate) {
        match self.trips.iter_mut().find(|t| t.id == update.id) {
            Some(existing) => existing.apply(update),
            None => {
                self.trips.insert(0, PendingTrip::from_update(update));
                self.trips.truncate(self.trip_cap);
            }
        }
    }

    /// Append an entry to the rolling event log, evicting the oldest
    /// entry once the cap is exceeded. Entries are never mutated.
    pub fn push_event(&mut self, kind: EventKind, payload: Value) {
        self.events.push_front(EventLogEntry::new(kind, payload));
        self.events.truncate(self.event_cap);
    }

    /// Replace the driver set in full from a snapshot seed. Distinct from
    /// incremental upserts: the previous set is discarded.
    pub fn seed_drivers(&mut self, updates: Vec<DriverUpdate>) {
        self.drivers.clear();
        for update in updates {
            self.upsert_driver(update);
        }
        debug!(count = self.drivers.len(), "Driver seed replaced");
    }

    /// Replace the trip list in full from a snapshot seed, truncated to
    /// the cap at seed time (seed order is preserved).
    pub fn seed_trips(&mut self, updates: Vec<TripUpdate>) {
        self.trips.clear();
        for update in updates {
            match self.trips.iter_mut().find(|t| t.id == update.id) {
                Some(existing) => existing.apply(update),
                None => self.trips.push(PendingTrip::from_update(update)),
            }
        }
        self.trips.truncate(self.trip_cap);
        debug!(count = self.trips.len(), "Trip seed replaced");
    }

    /// Record a successful (re)connection: clears any prior error.
    pub fn mark_connected(&mut self) {
        self.connection.connected = true;
        self.connection.connection_error = None;
        self.push_event(EventKind::Socket, json!({ "message": "Connected" }));
    }

    /// Record a mid-session drop. The drop reason goes to the event log;
    /// driver and trip records are left untouched.
    pub fn mark_disconnected(&mut self, reason: &str) {
        self.connection.connected = false;
        self.push_event(
            EventKind::Socket,
            json!({ "message": "Disconnected", "reason": reason }),
        );
    }

    /// Record a connection failure with a human-readable message.
    pub fn mark_connection_error(&mut self, message: &str) {
        self.connection.connected = false;
        self.connection.connection_error = Some(message.to_string());
        self.push_event(
            EventKind::Socket,
            json!({ "message": "Connection error", "error": message }),
        );
    }

    pub fn drivers(&self) -> &[DriverLocation] {
        &self.drivers
    }

    pub fn trips(&self) -> &[PendingTrip] {
        &self.trips
    }

    /// Most-recent-first diagnostic log.
    pub fn events(&self) -> &VecDeque<EventLogEntry> {
        &self.events
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }
}
