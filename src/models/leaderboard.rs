//! Leaderboard lookup table.
//!
//! Every ranked leaderboard in the game is one bracket size crossed with one
//! faction. The upstream API only reports numeric leaderboard ids, so this
//! table is what lets us group them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric leaderboard identifier as reported by the stats API.
pub type LeaderboardId = u64;

/// Game format by player count per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BracketSize {
    #[serde(rename = "1v1")]
    OneVsOne,
    #[serde(rename = "2v2")]
    TwoVsTwo,
    #[serde(rename = "3v3")]
    ThreeVsThree,
    #[serde(rename = "4v4")]
    FourVsFour,
}

impl BracketSize {
    pub const ALL: [BracketSize; 4] = [
        BracketSize::OneVsOne,
        BracketSize::TwoVsTwo,
        BracketSize::ThreeVsThree,
        BracketSize::FourVsFour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BracketSize::OneVsOne => "1v1",
            BracketSize::TwoVsTwo => "2v2",
            BracketSize::ThreeVsThree => "3v3",
            BracketSize::FourVsFour => "4v4",
        }
    }
}

impl fmt::Display for BracketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BracketSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1v1" => Ok(BracketSize::OneVsOne),
            "2v2" => Ok(BracketSize::TwoVsTwo),
            "3v3" => Ok(BracketSize::ThreeVsThree),
            "4v4" => Ok(BracketSize::FourVsFour),
            other => Err(format!("unknown bracket size: {}", other)),
        }
    }
}

/// Coalition a faction fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Allies,
    Axis,
}

impl TeamSide {
    pub const ALL: [TeamSide; 2] = [TeamSide::Allies, TeamSide::Axis];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Allies => "allies",
            TeamSide::Axis => "axis",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playable army.
///
/// The short codes are the only names this crate ever emits. The long names
/// are accepted on input and folded onto the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    #[serde(rename = "US", alias = "American")]
    Us,
    #[serde(rename = "UK", alias = "British")]
    Uk,
    #[serde(rename = "DAK")]
    Dak,
    #[serde(rename = "WEHR", alias = "German")]
    Wehr,
}

impl Faction {
    pub const ALL: [Faction; 4] = [Faction::Us, Faction::Uk, Faction::Dak, Faction::Wehr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Us => "US",
            Faction::Uk => "UK",
            Faction::Dak => "DAK",
            Faction::Wehr => "WEHR",
        }
    }

    /// Axis is DAK and Wehrmacht, everyone else is allied.
    pub fn side(&self) -> TeamSide {
        match self {
            Faction::Dak | Faction::Wehr => TeamSide::Axis,
            Faction::Us | Faction::Uk => TeamSide::Allies,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "US" | "AMERICAN" | "AMERICANS" => Ok(Faction::Us),
            "UK" | "BRITISH" => Ok(Faction::Uk),
            "DAK" => Ok(Faction::Dak),
            "WEHR" | "GERMAN" | "WEHRMACHT" => Ok(Faction::Wehr),
            other => Err(format!("unknown faction: {}", other)),
        }
    }
}

/// What a leaderboard id stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardInfo {
    pub bracket: BracketSize,
    pub faction: Faction,
}

const LEADERBOARDS: [(LeaderboardId, BracketSize, Faction); 16] = [
    (2130255, BracketSize::OneVsOne, Faction::Us),
    (2130257, BracketSize::OneVsOne, Faction::Uk),
    (2130259, BracketSize::OneVsOne, Faction::Dak),
    (2130261, BracketSize::OneVsOne, Faction::Wehr),
    (2130300, BracketSize::TwoVsTwo, Faction::Us),
    (2130302, BracketSize::TwoVsTwo, Faction::Uk),
    (2130304, BracketSize::TwoVsTwo, Faction::Dak),
    (2130306, BracketSize::TwoVsTwo, Faction::Wehr),
    (2130329, BracketSize::ThreeVsThree, Faction::Us),
    (2130331, BracketSize::ThreeVsThree, Faction::Uk),
    (2130333, BracketSize::ThreeVsThree, Faction::Dak),
    (2130335, BracketSize::ThreeVsThree, Faction::Wehr),
    (2130353, BracketSize::FourVsFour, Faction::Us),
    (2130356, BracketSize::FourVsFour, Faction::Uk),
    (2130358, BracketSize::FourVsFour, Faction::Dak),
    (2130360, BracketSize::FourVsFour, Faction::Wehr),
];

/// Resolve a leaderboard id, `None` for ids we do not track.
pub fn lookup(id: LeaderboardId) -> Option<LeaderboardInfo> {
    LEADERBOARDS
        .iter()
        .find(|(known, _, _)| *known == id)
        .map(|&(_, bracket, faction)| LeaderboardInfo { bracket, faction })
}

/// All known leaderboard ids, in table order.
pub fn known_ids() -> impl Iterator<Item = LeaderboardId> {
    LEADERBOARDS.iter().map(|(id, _, _)| *id)
}
