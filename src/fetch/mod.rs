//! Upstream statistics API client.
//!
//! Fetches a player's personal leaderboard stats from the Relic community
//! API. The raw payload is passed through untouched for the proxy endpoint;
//! the overlay only ever sees validated [`StatRecord`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::models::{ProfileId, StatRecord};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source of live leaderboard stats.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Raw personal-stat payload for one player.
    async fn fetch_raw(&self, player: ProfileId) -> Result<Value, FetchError>;

    /// Validated leaderboard records for one player.
    async fn fetch_live_stats(&self, player: ProfileId) -> Result<Vec<StatRecord>, FetchError> {
        let payload = self.fetch_raw(player).await?;
        extract_records(&payload)
    }
}

/// Pull the `leaderboardStats` list out of a personal-stat payload.
///
/// A payload without the list yields no records. A non-zero `result.code`
/// is reported as an API error.
pub fn extract_records(payload: &Value) -> Result<Vec<StatRecord>, FetchError> {
    if let Some(result) = payload.get("result") {
        let code = result.get("code").and_then(Value::as_i64).unwrap_or(0);
        if code != 0 {
            let message = result
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(FetchError::Api { code, message });
        }
    }

    let Some(entries) = payload.get("leaderboardStats").and_then(Value::as_array) else {
        debug!("Payload has no leaderboardStats");
        return Ok(Vec::new());
    };

    let records = StatRecord::from_values(entries);
    if records.len() < entries.len() {
        debug!(
            "Dropped {} malformed leaderboard entries",
            entries.len() - records.len()
        );
    }
    Ok(records)
}

/// Configuration for the stats client.
#[derive(Debug, Clone)]
pub struct StatsClientConfig {
    pub base_url: String,
    pub title: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for StatsClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for StatsClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            title: api.title.clone(),
            timeout: Duration::from_secs(api.timeout_seconds),
            user_agent: api.user_agent.clone(),
        }
    }
}

/// HTTP client for the Relic community API.
pub struct StatsClient {
    client: Client,
    config: StatsClientConfig,
}

impl StatsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: StatsClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("coh3-overlay")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Personal-stat URL for a player.
    pub fn personal_stat_url(&self, player: ProfileId) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(["community", "leaderboard", "getpersonalstat"]);
        url.query_pairs_mut()
            .append_pair("profile_ids", &format!("[{}]", player))
            .append_pair("title", &self.config.title);
        Ok(url)
    }
}

#[async_trait]
impl StatsSource for StatsClient {
    fn name(&self) -> &'static str {
        "relic"
    }

    async fn fetch_raw(&self, player: ProfileId) -> Result<Value, FetchError> {
        let url = self.personal_stat_url(player)?;
        info!("Fetching stats for player {}", player);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Stats API returned {}", status);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Canned source for tests.
#[cfg(test)]
pub struct MockSource {
    payload: std::sync::Mutex<Option<Value>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockSource {
    /// Serve `records` as a personal-stat payload.
    pub fn with_records(records: &[StatRecord]) -> Self {
        let source = Self::failing();
        source.set_records(records);
        source
    }

    /// Fail every fetch.
    pub fn failing() -> Self {
        Self {
            payload: std::sync::Mutex::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn set_records(&self, records: &[StatRecord]) {
        let payload = serde_json::json!({
            "result": {"code": 0, "message": "SUCCESS"},
            "leaderboardStats": records,
        });
        *self.payload.lock().unwrap() = Some(payload);
    }

    pub fn set_failing(&self) {
        *self.payload.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl StatsSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_raw(&self, _player: ProfileId) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.payload
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FetchError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
    }
}
