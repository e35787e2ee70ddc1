//! Player profile persisted between runs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Relic profile id of the tracked player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProfileId(u64);

impl ProfileId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProfileId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(0) => Err("profile id must be non-zero".to_string()),
            Ok(id) => Ok(Self(id)),
            Err(_) => Err(format!("invalid profile id: {}", s)),
        }
    }
}

impl From<u64> for ProfileId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// player.json files written by older tooling store the id as a string.
impl<'de> Deserialize<'de> for ProfileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(0) => Err(serde::de::Error::custom("profile id must be non-zero")),
            Raw::Number(n) => Ok(ProfileId(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Contents of `player.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: ProfileId,

    /// When the last session snapshot was taken
    #[serde(
        rename = "lastLaunch",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_launch: Option<DateTime<Utc>>,
}

impl PlayerProfile {
    pub fn new(id: ProfileId) -> Self {
        Self {
            id,
            last_launch: None,
        }
    }

    pub fn launched_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_launch = Some(at);
        self
    }
}
