mod config;
mod models;
mod processor;
mod snapshot;
mod socket;
mod state;

use std::sync::Arc;
use std::time::Duration;

use config::AppConfig;
use socket::StreamClient;
use state::LiveModel;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Mutex;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting fleet-live feed service...");

    // Seed the model from the snapshot endpoint (fails open to empty).
    let mut model = LiveModel::new(config.trip_list_cap, config.event_log_cap);
    if let Some(snapshot_url) = &config.snapshot_url {
        let seed = snapshot::fetch_snapshot(snapshot_url, config.socket_token.as_deref()).await;
        model.seed_drivers(seed.drivers);
        model.seed_trips(seed.trips);
    }
    let model = Arc::new(Mutex::new(model));

    // Hand the model to the stream client. Without an endpoint and token
    // this stays in seeded-only mode.
    let mut client = StreamClient::start(
        config.socket_url.as_deref(),
        config.socket_token.as_deref(),
        Arc::clone(&model),
    );

    let mut reload = signal(SignalKind::hangup())?;
    let mut status = tokio::time::interval(Duration::from_secs(config.status_interval_secs));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = reload.recv() => {
                // SIGHUP replaces the seed in full; live upserts resume on top.
                if let Some(snapshot_url) = &config.snapshot_url {
                    info!("Reloading snapshot seed");
                    let seed = snapshot::fetch_snapshot(snapshot_url, config.socket_token.as_deref()).await;
                    client.reseed(seed.drivers, seed.trips).await;
                }
            }
            _ = status.tick() => {
                let connection = client.connection().await;
                info!(
                    drivers = client.drivers().await.len(),
                    trips = client.trips().await.len(),
                    events = client.events().await.len(),
                    connected = connection.connected,
                    error = connection.connection_error.as_deref().unwrap_or("-"),
                    "Live feed status",
                );
            }
        }
    }

    info!("Shutting down...");
    client.shutdown().await;

    Ok(())
}
