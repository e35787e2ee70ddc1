//! Overlay display preferences.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{BracketSize, Grouping};

/// What the overlay shows and how it groups it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Brackets the streamer wants counted
    #[serde(default = "all_modes")]
    pub visible_modes: BTreeSet<BracketSize>,

    #[serde(default)]
    pub grouping: Grouping,
}

fn all_modes() -> BTreeSet<BracketSize> {
    BracketSize::ALL.into_iter().collect()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            visible_modes: all_modes(),
            grouping: Grouping::default(),
        }
    }
}

impl Preferences {
    pub fn new(visible_modes: impl IntoIterator<Item = BracketSize>, grouping: Grouping) -> Self {
        Self {
            visible_modes: visible_modes.into_iter().collect(),
            grouping,
        }
    }
}
