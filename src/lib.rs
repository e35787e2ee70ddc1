//! # CoH3 Overlay
//!
//! Livestream overlay that shows a Company of Heroes 3 player's wins and
//! losses since the session baseline, grouped by team size, faction or side.
//!
//! ## Architecture
//!
//! - **models**: Leaderboard table, stat records, preferences, player profile
//! - **calculate**: Delta aggregation and line formatting
//! - **fetch**: Relic community API client
//! - **storage**: JSON slots on disk and the PID file
//! - **session**: Baseline snapshots, manual and daily automatic
//! - **overlay**: Periodic refresh of the rendered overlay line
//! - **api**: REST API endpoints and static file serving
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod overlay;
pub mod session;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num.checked_mul(multiplier)?))
}
