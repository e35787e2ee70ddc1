//! Win/loss counters and the grouped summaries built from them.

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use super::{BracketSize, Faction, LeaderboardId, TeamSide};

/// A wins/losses pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

impl WinLoss {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    /// Difference to an earlier reading, never below zero.
    pub fn delta_since(&self, reference: &WinLoss) -> WinLoss {
        WinLoss {
            wins: self.wins.saturating_sub(reference.wins),
            losses: self.losses.saturating_sub(reference.losses),
        }
    }

    pub fn add(&mut self, other: WinLoss) {
        self.wins = self.wins.saturating_add(other.wins);
        self.losses = self.losses.saturating_add(other.losses);
    }

    pub fn is_zero(&self) -> bool {
        self.wins == 0 && self.losses == 0
    }
}

/// One leaderboard entry from the statistics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub leaderboard_id: LeaderboardId,
    pub wins: u32,
    pub losses: u32,
}

impl StatRecord {
    pub fn new(leaderboard_id: LeaderboardId, wins: u32, losses: u32) -> Self {
        Self {
            leaderboard_id,
            wins,
            losses,
        }
    }

    /// Validate one loosely-typed API entry.
    ///
    /// Returns `None` when the id is missing or zero, or when either counter is
    /// absent or not a non-negative integer.
    pub fn from_value(value: &Value) -> Option<Self> {
        let leaderboard_id = value.get("leaderboard_id")?.as_u64().filter(|id| *id != 0)?;
        let wins = counter(value.get("wins")?)?;
        let losses = counter(value.get("losses")?)?;
        Some(Self {
            leaderboard_id,
            wins,
            losses,
        })
    }

    /// Validate a list of API entries, dropping malformed ones.
    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values
            .iter()
            .filter_map(|v| {
                let record = Self::from_value(v);
                if record.is_none() {
                    debug!("Dropping malformed stat record: {}", v);
                }
                record
            })
            .collect()
    }

    pub fn totals(&self) -> WinLoss {
        WinLoss::new(self.wins, self.losses)
    }
}

fn counter(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// Counters keyed by leaderboard id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatSnapshot {
    entries: HashMap<LeaderboardId, WinLoss>,
}

impl StatSnapshot {
    /// Build from records; a repeated id keeps the last record seen.
    pub fn from_records(records: &[StatRecord]) -> Self {
        let entries = records
            .iter()
            .map(|r| (r.leaderboard_id, r.totals()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: LeaderboardId) -> Option<&WinLoss> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeaderboardId, &WinLoss)> {
        self.entries.iter().map(|(id, wl)| (*id, wl))
    }
}

/// How the overlay buckets its deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    Size,
    Faction,
    Team,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::Size => write!(f, "size"),
            Grouping::Faction => write!(f, "faction"),
            Grouping::Team => write!(f, "team"),
        }
    }
}

impl std::str::FromStr for Grouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "size" | "mode" => Ok(Grouping::Size),
            "faction" => Ok(Grouping::Faction),
            "team" | "side" => Ok(Grouping::Team),
            other => Err(format!("unknown grouping: {}", other)),
        }
    }
}

/// Label of one output bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Size(BracketSize),
    Faction(Faction),
    Side(BracketSize, TeamSide),
}

impl GroupKey {
    /// Every bucket a grouping produces, in display order.
    pub fn all_for(grouping: Grouping) -> Vec<GroupKey> {
        match grouping {
            Grouping::Size => BracketSize::ALL.into_iter().map(GroupKey::Size).collect(),
            Grouping::Faction => Faction::ALL.into_iter().map(GroupKey::Faction).collect(),
            Grouping::Team => BracketSize::ALL
                .into_iter()
                .flat_map(|b| TeamSide::ALL.into_iter().map(move |s| GroupKey::Side(b, s)))
                .collect(),
        }
    }

    /// Bracket this bucket is tied to; faction buckets span all brackets.
    pub fn bracket(&self) -> Option<BracketSize> {
        match self {
            GroupKey::Size(b) | GroupKey::Side(b, _) => Some(*b),
            GroupKey::Faction(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Size(b) => write!(f, "{}", b),
            GroupKey::Faction(fa) => write!(f, "{}", fa),
            GroupKey::Side(b, s) => write!(f, "{}-{}", b, s),
        }
    }
}

/// Aggregated deltas per bucket, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedTotals {
    buckets: Vec<(GroupKey, WinLoss)>,
}

impl GroupedTotals {
    /// All buckets for `grouping`, zeroed.
    pub fn empty(grouping: Grouping) -> Self {
        let buckets = GroupKey::all_for(grouping)
            .into_iter()
            .map(|k| (k, WinLoss::default()))
            .collect();
        Self { buckets }
    }

    pub fn get(&self, key: &GroupKey) -> Option<&WinLoss> {
        self.buckets.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Lookup by rendered label, e.g. `"2v2"`, `"DAK"` or `"1v1-axis"`.
    pub fn get_label(&self, label: &str) -> Option<&WinLoss> {
        self.buckets
            .iter()
            .find(|(k, _)| k.to_string() == label)
            .map(|(_, v)| v)
    }

    /// Add to a bucket. Keys outside this grouping are ignored.
    pub(crate) fn accumulate(&mut self, key: GroupKey, delta: WinLoss) {
        if let Some((_, totals)) = self.buckets.iter_mut().find(|(k, _)| *k == key) {
            totals.add(delta);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &WinLoss)> {
        self.buckets.iter().map(|(k, v)| (k, v))
    }

    /// Buckets a display should show for the given visible brackets.
    pub fn visible<'a>(
        &'a self,
        visible_modes: &'a std::collections::BTreeSet<BracketSize>,
    ) -> impl Iterator<Item = (&'a GroupKey, &'a WinLoss)> + 'a {
        self.iter().filter(move |(k, _)| match k.bracket() {
            Some(b) => visible_modes.contains(&b),
            None => true,
        })
    }

    /// Sum over every bucket.
    pub fn total(&self) -> WinLoss {
        let mut sum = WinLoss::default();
        for (_, v) in &self.buckets {
            sum.add(*v);
        }
        sum
    }
}

impl Serialize for GroupedTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, totals) in &self.buckets {
            map.serialize_entry(&key.to_string(), totals)?;
        }
        map.end()
    }
}
