use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Category tag for entries in the diagnostic event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Location,
    Trip,
    DriverStatus,
    Session,
    Socket,
}

/// One entry in the rolling diagnostic log.
///
/// Entries are observational only: the payload is the raw event body,
/// passed through untouched, and an entry is never mutated after insertion.
#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    pub id: Uuid,
    pub kind: EventKind,
    pub payload: Value,
    pub ts: DateTime<Utc>,
}

impl EventLogEntry {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            ts: Utc::now(),
        }
    }
}
