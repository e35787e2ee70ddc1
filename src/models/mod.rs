//! Core data models for the overlay.

mod leaderboard;
mod player;
mod preferences;
mod stats;

pub use leaderboard::*;
pub use player::*;
pub use preferences::*;
pub use stats::*;
