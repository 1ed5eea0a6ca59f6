use anyhow::Result;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub socket_url: Option<String>,
    pub socket_token: Option<String>,
    pub snapshot_url: Option<String>,
    pub trip_list_cap: usize,
    pub event_log_cap: usize,
    pub status_interval_secs: u64,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        // Endpoint and token are optional on purpose: without both, the
        // stream client stays in seeded-only mode and never dials out.
        let socket_url = env::var("SOCKET_URL").ok().filter(|v| !v.is_empty());
        let socket_token = env::var("SOCKET_TOKEN").ok().filter(|v| !v.is_empty());
        let snapshot_url = env::var("SNAPSHOT_URL").ok().filter(|v| !v.is_empty());

        let trip_list_cap = env::var("TRIP_LIST_CAP")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);
        let event_log_cap = env::var("EVENT_LOG_CAP")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .unwrap_or(25);
        let status_interval_secs = env::var("STATUS_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            socket_url,
            socket_token,
            snapshot_url,
            trip_list_cap,
            event_log_cap,
            status_interval_secs,
            log_level,
        })
    }
}
