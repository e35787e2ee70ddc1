//! Overlay refresh loop.
//!
//! Each tick fetches live stats, loads the baseline and preferences, and
//! renders one overlay line. Ticks run to completion before the next one is
//! awaited; missed ticks are skipped rather than queued.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::calculate::{aggregate_with, render_line, PLACEHOLDER};
use crate::fetch::FetchError;
use crate::models::{GroupedTotals, Preferences, StatRecord};
use crate::session::SessionService;
use crate::storage;

/// Where the overlay currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStatus {
    /// Nothing rendered yet
    #[default]
    Starting,
    /// No baseline captured
    NoSession,
    /// Upstream API could not be reached
    Unavailable,
    Live,
}

/// Last rendered overlay.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayState {
    pub status: OverlayStatus,
    /// Text to display, the placeholder while waiting
    pub line: String,
    /// True when `line` is the placeholder
    pub waiting: bool,
    pub totals: Option<GroupedTotals>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            status: OverlayStatus::Starting,
            line: PLACEHOLDER.to_string(),
            waiting: true,
            totals: None,
            updated_at: None,
        }
    }
}

pub type SharedOverlayState = Arc<RwLock<OverlayState>>;

/// Build the overlay for one tick's inputs.
pub fn render_overlay(
    live: Result<Vec<StatRecord>, FetchError>,
    baseline: Option<&[StatRecord]>,
    prefs: &Preferences,
) -> OverlayState {
    let updated_at = Some(Utc::now());

    let live = match live {
        Ok(records) => records,
        Err(e) => {
            warn!("Live stats unavailable: {}", e);
            return OverlayState {
                status: OverlayStatus::Unavailable,
                updated_at,
                ..OverlayState::default()
            };
        }
    };

    let Some(baseline) = baseline else {
        return OverlayState {
            status: OverlayStatus::NoSession,
            totals: Some(GroupedTotals::empty(prefs.grouping)),
            updated_at,
            ..OverlayState::default()
        };
    };

    let totals = aggregate_with(&live, baseline, prefs);
    let line = render_line(&totals, &prefs.visible_modes);
    // Nothing recorded on either side yet
    let waiting = line.is_empty() || (live.is_empty() && baseline.is_empty());

    OverlayState {
        status: OverlayStatus::Live,
        line: if waiting { PLACEHOLDER.to_string() } else { line },
        waiting,
        totals: Some(totals),
        updated_at,
    }
}

/// Periodically refreshes the shared overlay state.
pub struct OverlayPoller {
    session: Arc<SessionService>,
    default_prefs: Preferences,
    state: SharedOverlayState,
    interval: Duration,
    output_file: Option<PathBuf>,
    echo: bool,
}

impl OverlayPoller {
    pub fn new(
        session: Arc<SessionService>,
        default_prefs: Preferences,
        state: SharedOverlayState,
        interval: Duration,
    ) -> Self {
        Self {
            session,
            default_prefs,
            state,
            interval,
            output_file: None,
            echo: false,
        }
    }

    /// Mirror every rendered line into a text file.
    pub fn with_output_file(mut self, path: Option<PathBuf>) -> Self {
        self.output_file = path;
        self
    }

    /// Print every rendered line to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn state(&self) -> &SharedOverlayState {
        &self.state
    }

    /// Stored preferences, falling back to the configured defaults.
    pub fn preferences(&self) -> Preferences {
        match storage::read_preferences(self.session.storage()) {
            Ok(Some(prefs)) => prefs,
            Ok(None) => self.default_prefs.clone(),
            Err(e) => {
                warn!("Failed to read preferences, using defaults: {}", e);
                self.default_prefs.clone()
            }
        }
    }

    /// Run one fetch, aggregate and render cycle.
    pub async fn tick(&self) -> OverlayState {
        let prefs = self.preferences();
        let store = self.session.storage();

        let player = self.session.player_id().unwrap_or_else(|e| {
            warn!("Failed to read player, using default: {}", e);
            self.session.default_player()
        });
        let source = self.session.source();
        let live = source.fetch_live_stats(player).await;
        if let Ok(records) = &live {
            debug!("{} returned {} leaderboards", source.name(), records.len());
        }

        let baseline = if storage::has_baseline(store) {
            match storage::read_baseline(store) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!("Failed to read baseline: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let rendered = render_overlay(live, baseline.as_deref(), &prefs);
        debug!("Overlay: {}", rendered.line);

        self.publish(&rendered).await;
        rendered
    }

    async fn publish(&self, rendered: &OverlayState) {
        *self.state.write().await = rendered.clone();

        if self.echo {
            println!("{}", rendered.line);
        }

        if let Some(path) = &self.output_file {
            if let Err(e) = tokio::fs::write(path, &rendered.line).await {
                warn!("Failed to write overlay file {:?}: {}", path, e);
            }
        }
    }

    /// Refresh forever at the configured interval.
    pub async fn run_periodic(self: Arc<Self>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Refreshing overlay every {:?}", self.interval);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}
