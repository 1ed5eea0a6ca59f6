use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::driver::DriverUpdate;
use crate::models::trip::TripUpdate;
use crate::processor::normalize::{normalize_driver, normalize_trip};

/// Raw snapshot body as served by the backend.
#[derive(Debug, Default, Deserialize)]
struct SnapshotBody {
    #[serde(default)]
    drivers: Vec<Value>,
    #[serde(default)]
    trips: Vec<Value>,
}

/// Normalized snapshot, ready to seed the live model.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub drivers: Vec<DriverUpdate>,
    pub trips: Vec<TripUpdate>,
}

/// Fetch the current drivers/trips snapshot, once per session.
///
/// Fails open: any transport or decode failure logs a warning and yields
/// an empty seed. The live map then starts blank and fills from the
/// stream instead of crashing the service.
pub async fn fetch_snapshot(url: &str, token: Option<&str>) -> Snapshot {
    match try_fetch(url, token).await {
        Ok(snapshot) => {
            info!(
                drivers = snapshot.drivers.len(),
                trips = snapshot.trips.len(),
                "Loaded snapshot seed"
            );
            snapshot
        }
        Err(e) => {
            warn!("Snapshot fetch failed: {e:#}; starting with an empty seed");
            Snapshot::default()
        }
    }
}

async fn try_fetch(url: &str, token: Option<&str>) -> Result<Snapshot> {
    let client = reqwest::Client::new();
    let mut request = client.get(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let body: SnapshotBody = request
        .send()
        .await
        .context("snapshot request failed")?
        .error_for_status()
        .context("snapshot request rejected")?
        .json()
        .await
        .context("snapshot body was not valid JSON")?;

    // Unusable entries are skipped, same as on the stream path.
    Ok(Snapshot {
        drivers: body.drivers.iter().filter_map(normalize_driver).collect(),
        trips: body.trips.iter().filter_map(normalize_trip).collect(),
    })
}
