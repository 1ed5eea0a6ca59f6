use std::collections::VecDeque;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::models::driver::{DriverLocation, DriverUpdate};
use crate::models::event::EventLogEntry;
use crate::models::trip::{PendingTrip, TripUpdate};
use crate::processor::event_processor::process_frame;
use crate::state::{ConnectionState, LiveModel};

/// Shared handle to the live model. The stream client is the only writer
/// on the message path; readers take point-in-time clones.
pub type SharedModel = Arc<Mutex<LiveModel>>;

/// Supervises a single push-channel connection and keeps the live model
/// current from inbound events.
///
/// The connection is gated: without both an endpoint and a token no
/// attempt is made, and the model serves seed data only. There is no
/// in-band retry; a dropped connection surfaces through
/// [`ConnectionState`] and the caller starts a fresh client (typically
/// after a token refresh). At most one live connection exists per
/// instance: [`shutdown`](Self::shutdown) severs it and is idempotent.
pub struct StreamClient {
    model: SharedModel,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    /// Start supervising a connection to `url` authenticated by `token`.
    ///
    /// Missing endpoint or token is a precondition, not an error: the
    /// client reports `connected = false` with no connection error and
    /// makes zero transport calls.
    pub fn start(url: Option<&str>, token: Option<&str>, model: SharedModel) -> Self {
        let cancel = CancellationToken::new();

        let task = match (url, token) {
            (Some(url), Some(token)) => {
                let url = url.to_string();
                let token = token.to_string();
                let model = Arc::clone(&model);
                let cancel = cancel.clone();
                Some(tokio::spawn(async move {
                    run_connection(&url, &token, &model, &cancel).await;
                }))
            }
            _ => {
                debug!("Socket endpoint or token missing; staying in seeded-only mode");
                None
            }
        };

        Self {
            model,
            cancel,
            task,
        }
    }

    /// Replace the seeded driver and trip lists in full, e.g. after the
    /// caller reloads the snapshot. Distinct from event-driven upserts.
    pub async fn reseed(&self, drivers: Vec<DriverUpdate>, trips: Vec<TripUpdate>) {
        let mut model = self.model.lock().await;
        model.seed_drivers(drivers);
        model.seed_trips(trips);
    }

    /// Sever the connection and wait for the supervision task to exit.
    /// Safe to call repeatedly, and when no connection was ever attempted.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Connection task ended abnormally");
            }
        }
    }

    pub async fn drivers(&self) -> Vec<DriverLocation> {
        self.model.lock().await.drivers().to_vec()
    }

    pub async fn trips(&self) -> Vec<PendingTrip> {
        self.model.lock().await.trips().to_vec()
    }

    pub async fn events(&self) -> VecDeque<EventLogEntry> {
        self.model.lock().await.events().clone()
    }

    pub async fn connection(&self) -> ConnectionState {
        self.model.lock().await.connection().clone()
    }
}

/// Connect, then process frames until close, error, or cancellation.
///
/// One frame is fully parsed, merged, and logged before the next is
/// read. All failures are absorbed into the model's connection state;
/// nothing here propagates an error to the caller.
async fn run_connection(url: &str, token: &str, model: &SharedModel, cancel: &CancellationToken) {
    let ws_url = format!("{}/ws?token={}", url.trim_end_matches('/'), token);

    let connect = tokio::select! {
        _ = cancel.cancelled() => return,
        result = connect_async(&ws_url) => result,
    };

    let mut ws_stream = match connect {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let message = format!("Socket connection failed: {e}");
            warn!("{message}");
            model.lock().await.mark_connection_error(&message);
            return;
        }
    };

    info!(url, "Connected to live feed");
    model.lock().await.mark_connected();

    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = ws_stream.close(None).await;
                debug!("Connection closed on shutdown");
                return;
            }
            message = ws_stream.next() => message,
        };

        match message {
            Some(Ok(Message::Text(text))) => {
                process_frame(&mut *model.lock().await, &text);
            }
            Some(Ok(Message::Binary(_))) => {
                trace!("Ignoring binary frame");
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                // Handled by tungstenite.
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "transport close".to_string());
                info!(reason, "Live feed disconnected");
                model.lock().await.mark_disconnected(&reason);
                return;
            }
            Some(Ok(Message::Frame(_))) => {}
            Some(Err(e)) => {
                let message = format!("Socket receive error: {e}");
                warn!("{message}");
                model.lock().await.mark_connection_error(&message);
                return;
            }
            None => {
                info!("Live feed stream ended");
                model.lock().await.mark_disconnected("stream ended");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn shared_model() -> SharedModel {
        Arc::new(Mutex::new(LiveModel::new(20, 25)))
    }

    #[tokio::test]
    async fn missing_token_gates_the_connection() {
        let mut client = StreamClient::start(Some("ws://localhost:3001"), None, shared_model());

        // No task was spawned, so no transport call can have been made.
        assert!(client.task.is_none());
        let connection = client.connection().await;
        assert!(!connection.connected);
        assert!(connection.connection_error.is_none());
        assert!(client.events().await.is_empty());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn missing_endpoint_gates_the_connection() {
        let client = StreamClient::start(None, Some("token"), shared_model());
        assert!(client.task.is_none());
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_without_a_connection() {
        let mut client = StreamClient::start(None, None, shared_model());
        client.shutdown().await;
        client.shutdown().await;
    }

    #[tokio::test]
    async fn reseed_replaces_prior_seed_in_full() {
        let client = StreamClient::start(None, None, shared_model());
        client
            .reseed(
                vec![DriverUpdate {
                    driver_id: 1,
                    lat: 1.0,
                    lng: 2.0,
                    status: None,
                    updated_at: Utc::now(),
                }],
                vec![],
            )
            .await;
        assert_eq!(client.drivers().await.len(), 1);

        client
            .reseed(
                vec![DriverUpdate {
                    driver_id: 2,
                    lat: 3.0,
                    lng: 4.0,
                    status: None,
                    updated_at: Utc::now(),
                }],
                vec![],
            )
            .await;

        let drivers = client.drivers().await;
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].driver_id, 2);
    }

    #[tokio::test]
    async fn connection_refused_surfaces_as_connection_error() {
        let model = shared_model();
        // Nothing listens on this port; the connect attempt must fail
        // and be absorbed into connection state rather than panic.
        let mut client =
            StreamClient::start(Some("ws://127.0.0.1:1"), Some("token"), Arc::clone(&model));
        if let Some(task) = client.task.take() {
            let _ = task.await;
        }

        let connection = client.connection().await;
        assert!(!connection.connected);
        assert!(connection.connection_error.is_some());
        let events = client.events().await;
        assert_eq!(events.len(), 1);
        client.shutdown().await;
    }
}
