//! Local data directory.
//!
//! Three JSON slots live under the data directory:
//! - `player.json`: tracked player and time of the last snapshot
//! - `session.json`: baseline leaderboard records
//! - `preferences.json`: overlay display preferences
//!
//! The server also drops its PID file there.

mod json;
mod pid;

pub use json::*;
pub use pid::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{PlayerProfile, Preferences, StatRecord};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn player_file(&self) -> PathBuf {
        self.data_dir.join("player.json")
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.data_dir.join("server.pid")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Read the tracked player, `None` when not set yet.
pub fn read_player(config: &StorageConfig) -> Result<Option<PlayerProfile>, StorageError> {
    JsonFile::new(config.player_file()).read()
}

pub fn write_player(config: &StorageConfig, player: &PlayerProfile) -> Result<(), StorageError> {
    JsonFile::new(config.player_file()).write(player)
}

/// Read the baseline snapshot.
///
/// A missing file is an empty baseline. Entries that fail validation are
/// dropped the same way live API entries are.
pub fn read_baseline(config: &StorageConfig) -> Result<Vec<StatRecord>, StorageError> {
    let raw: Option<Vec<serde_json::Value>> = JsonFile::new(config.session_file()).read()?;
    Ok(raw.map(|v| StatRecord::from_values(&v)).unwrap_or_default())
}

/// Whether a baseline has ever been captured.
pub fn has_baseline(config: &StorageConfig) -> bool {
    config.session_file().exists()
}

/// Replace the baseline snapshot.
pub fn write_baseline(config: &StorageConfig, records: &[StatRecord]) -> Result<(), StorageError> {
    JsonFile::new(config.session_file()).write(&records)
}

pub fn read_preferences(config: &StorageConfig) -> Result<Option<Preferences>, StorageError> {
    JsonFile::new(config.preferences_file()).read()
}

pub fn write_preferences(config: &StorageConfig, prefs: &Preferences) -> Result<(), StorageError> {
    JsonFile::new(config.preferences_file()).write(prefs)
}
