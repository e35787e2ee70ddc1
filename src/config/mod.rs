//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BracketSize, Grouping, Preferences, ProfileId};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream statistics API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Relic community API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Game title passed to the API
    #[serde(default = "default_title")]
    pub title: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://coh3-api.reliclink.com".to_string()
}

fn default_title() -> String {
    "coh3".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("coh3-overlay/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title: default_title(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory served as static files (overlay pages)
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            public_dir: default_public_dir(),
        }
    }
}

/// Overlay polling and display defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Player tracked when no player.json exists yet
    #[serde(default = "default_player_id")]
    pub default_player_id: u64,

    /// Local hour from which the first launch of the day takes a snapshot
    #[serde(default = "default_auto_snapshot_hour")]
    pub auto_snapshot_hour: u32,

    #[serde(default = "default_visible_modes")]
    pub visible_modes: Vec<BracketSize>,

    #[serde(default)]
    pub grouping: Grouping,

    /// Mirror the rendered line into this file (for OBS text sources)
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

fn default_poll_interval() -> u64 {
    15
}

fn default_player_id() -> u64 {
    455809
}

fn default_auto_snapshot_hour() -> u32 {
    10
}

fn default_visible_modes() -> Vec<BracketSize> {
    BracketSize::ALL.to_vec()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            default_player_id: default_player_id(),
            auto_snapshot_hour: default_auto_snapshot_hour(),
            visible_modes: default_visible_modes(),
            grouping: Grouping::default(),
            output_file: None,
        }
    }
}

impl OverlayConfig {
    /// Preferences used until the user saves their own.
    pub fn default_preferences(&self) -> Preferences {
        Preferences::new(self.visible_modes.iter().copied(), self.grouping)
    }

    pub fn default_player(&self) -> ProfileId {
        ProfileId::new(self.default_player_id)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.overlay.poll_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.overlay.default_player_id == 0 {
            return Err(ConfigError::ValidationError(
                "Default player id must be non-zero".to_string(),
            ));
        }

        if self.overlay.auto_snapshot_hour > 23 {
            return Err(ConfigError::ValidationError(format!(
                "Auto snapshot hour must be 0-23, got {}",
                self.overlay.auto_snapshot_hour
            )));
        }

        url::Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::ValidationError(format!("Invalid API base URL: {}", e)))?;

        Ok(())
    }
}
