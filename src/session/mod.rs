//! Session baseline management.
//!
//! A session starts by copying the player's current leaderboard counters into
//! the baseline slot. On server start the first launch of the day past a
//! configured hour takes that snapshot automatically.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::fetch::{FetchError, StatsSource};
use crate::models::{PlayerProfile, ProfileId};
use crate::storage::{self, StorageConfig, StorageError};

/// Errors that can occur while managing sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result of starting a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStarted {
    pub player: ProfileId,
    pub leaderboards: usize,
    pub started_at: DateTime<Utc>,
}

/// What the startup auto-snapshot decided.
#[derive(Debug, Clone)]
pub enum AutoSnapshot {
    TooEarly { hour: u32 },
    AlreadyTaken,
    Created(SessionStarted),
}

/// Why a launch at `now` takes no snapshot, `None` when one is due.
///
/// Never before `min_hour` local time, and at most once per local day.
fn skip_reason<Tz: TimeZone>(
    now: &DateTime<Tz>,
    last_launch: Option<DateTime<Utc>>,
    min_hour: u32,
) -> Option<AutoSnapshot> {
    if now.hour() < min_hour {
        return Some(AutoSnapshot::TooEarly { hour: now.hour() });
    }

    match last_launch {
        Some(last) if last.with_timezone(&now.timezone()).date_naive() == now.date_naive() => {
            Some(AutoSnapshot::AlreadyTaken)
        }
        _ => None,
    }
}

/// Whether the first launch at `now` should take a snapshot.
pub fn should_auto_snapshot<Tz: TimeZone>(
    now: &DateTime<Tz>,
    last_launch: Option<DateTime<Utc>>,
    min_hour: u32,
) -> bool {
    skip_reason(now, last_launch, min_hour).is_none()
}

/// Owns baseline and player writes.
///
/// Snapshot creation is serialized so two concurrent "start session" calls
/// cannot interleave their file writes.
pub struct SessionService {
    source: Arc<dyn StatsSource>,
    storage: StorageConfig,
    default_player: ProfileId,
    lock: Mutex<()>,
}

impl SessionService {
    pub fn new(
        source: Arc<dyn StatsSource>,
        storage: StorageConfig,
        default_player: ProfileId,
    ) -> Self {
        Self {
            source,
            storage,
            default_player,
            lock: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &Arc<dyn StatsSource> {
        &self.source
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn default_player(&self) -> ProfileId {
        self.default_player
    }

    /// Stored player profile, or the default player with no launch yet.
    ///
    /// An unreadable or invalid `player.json` counts as no player set.
    pub fn player(&self) -> Result<PlayerProfile, StorageError> {
        Ok(self
            .stored_player()?
            .unwrap_or_else(|| PlayerProfile::new(self.default_player)))
    }

    fn stored_player(&self) -> Result<Option<PlayerProfile>, StorageError> {
        match storage::read_player(&self.storage) {
            Err(StorageError::Json(e)) => {
                warn!("Ignoring invalid player file: {}", e);
                Ok(None)
            }
            other => other,
        }
    }

    pub fn player_id(&self) -> Result<ProfileId, StorageError> {
        Ok(self.player()?.id)
    }

    /// Track a different player.
    pub async fn set_player(&self, id: ProfileId) -> Result<PlayerProfile, StorageError> {
        let _guard = self.lock.lock().await;
        let profile = PlayerProfile::new(id).launched_at(Utc::now());
        storage::write_player(&self.storage, &profile)?;
        info!("Player set to {}", id);
        Ok(profile)
    }

    /// Replace the baseline with the player's current stats.
    pub async fn start_session(&self, id: ProfileId) -> Result<SessionStarted, SessionError> {
        let _guard = self.lock.lock().await;

        let records = self.source.fetch_live_stats(id).await?;
        storage::write_baseline(&self.storage, &records)?;

        let started_at = Utc::now();
        let mut profile = self
            .stored_player()?
            .unwrap_or_else(|| PlayerProfile::new(id));
        profile.id = id;
        profile.last_launch = Some(started_at);
        storage::write_player(&self.storage, &profile)?;

        info!(
            "Session started for player {} ({} leaderboards)",
            id,
            records.len()
        );
        Ok(SessionStarted {
            player: id,
            leaderboards: records.len(),
            started_at,
        })
    }

    /// Take the daily snapshot if `now` calls for one.
    pub async fn auto_snapshot<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        min_hour: u32,
    ) -> Result<AutoSnapshot, SessionError> {
        let profile = self.player()?;

        match skip_reason(now, profile.last_launch, min_hour) {
            Some(AutoSnapshot::TooEarly { hour }) => {
                info!("It is {}h, no automatic snapshot before {}h", hour, min_hour);
                return Ok(AutoSnapshot::TooEarly { hour });
            }
            Some(skip) => {
                info!("Snapshot already taken on {}, skipping", now.date_naive());
                return Ok(skip);
            }
            None => {}
        }

        info!(
            "First launch of the day, taking snapshot for player {}",
            profile.id
        );
        let started = self.start_session(profile.id).await?;
        Ok(AutoSnapshot::Created(started))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockSource;
    use crate::models::StatRecord;
    use chrono::FixedOffset;

    fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    fn service(tmp: &tempfile::TempDir, source: Arc<MockSource>) -> SessionService {
        SessionService::new(
            source,
            StorageConfig::new(tmp.path().to_path_buf()),
            ProfileId::new(455809),
        )
    }

    #[test]
    fn test_no_snapshot_before_hour() {
        let now = at(0, 2026, 5, 2, 9);
        assert!(!should_auto_snapshot(&now, None, 10));
    }

    #[test]
    fn test_snapshot_first_launch_ever() {
        let now = at(0, 2026, 5, 2, 10);
        assert!(should_auto_snapshot(&now, None, 10));
    }

    #[test]
    fn test_snapshot_once_per_day() {
        let now = at(0, 2026, 5, 2, 18);
        let earlier_today = at(0, 2026, 5, 2, 11).with_timezone(&Utc);
        let yesterday = at(0, 2026, 5, 1, 23).with_timezone(&Utc);

        assert!(!should_auto_snapshot(&now, Some(earlier_today), 10));
        assert!(should_auto_snapshot(&now, Some(yesterday), 10));
    }

    #[test]
    fn test_same_day_uses_local_calendar() {
        // 23:30 UTC on May 1st is already May 2nd at UTC+2
        let last = Utc.with_ymd_and_hms(2026, 5, 1, 23, 30, 0).unwrap();
        let now = at(2, 2026, 5, 2, 12);
        assert!(!should_auto_snapshot(&now, Some(last), 10));

        let now_utc = at(0, 2026, 5, 2, 12);
        assert!(should_auto_snapshot(&now_utc, Some(last), 10));
    }

    #[tokio::test]
    async fn test_start_session_writes_baseline_and_player() {
        let tmp = tempfile::tempdir().unwrap();
        let records = vec![StatRecord::new(2130255, 10, 4)];
        let svc = service(&tmp, Arc::new(MockSource::with_records(&records)));

        let started = svc.start_session(ProfileId::new(42)).await.unwrap();
        assert_eq!(started.player, ProfileId::new(42));
        assert_eq!(started.leaderboards, 1);

        assert_eq!(storage::read_baseline(svc.storage()).unwrap(), records);
        let player = svc.player().unwrap();
        assert_eq!(player.id, ProfileId::new(42));
        // player.json stores milliseconds
        assert_eq!(
            player.last_launch.map(|t| t.timestamp_millis()),
            Some(started.started_at.timestamp_millis())
        );
    }

    #[tokio::test]
    async fn test_start_session_fetch_failure_keeps_old_baseline() {
        let tmp = tempfile::tempdir().unwrap();
        let old = vec![StatRecord::new(2130300, 1, 1)];
        let svc = service(&tmp, Arc::new(MockSource::failing()));
        storage::write_baseline(svc.storage(), &old).unwrap();

        let result = svc.start_session(ProfileId::new(1)).await;
        assert!(matches!(result, Err(SessionError::Fetch(_))));
        assert_eq!(storage::read_baseline(svc.storage()).unwrap(), old);
    }

    #[tokio::test]
    async fn test_player_defaults_then_set() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(&tmp, Arc::new(MockSource::failing()));

        assert_eq!(svc.player_id().unwrap(), ProfileId::new(455809));
        assert!(svc.player().unwrap().last_launch.is_none());

        svc.set_player(ProfileId::new(777)).await.unwrap();
        let player = svc.player().unwrap();
        assert_eq!(player.id, ProfileId::new(777));
        assert!(player.last_launch.is_some());
    }

    #[tokio::test]
    async fn test_invalid_player_file_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(&tmp, Arc::new(MockSource::failing()));
        std::fs::write(
            svc.storage().player_file(),
            r#"{"id":0,"lastLaunch":1700000000000}"#,
        )
        .unwrap();

        let player = svc.player().unwrap();
        assert_eq!(player.id, ProfileId::new(455809));
        assert!(player.last_launch.is_none());
        assert_eq!(svc.player_id().unwrap(), ProfileId::new(455809));
    }

    #[tokio::test]
    async fn test_start_session_replaces_invalid_player_file() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::with_records(&[StatRecord::new(2130255, 1, 0)]));
        let svc = service(&tmp, source);
        std::fs::write(svc.storage().player_file(), "{not json").unwrap();

        svc.start_session(ProfileId::new(9)).await.unwrap();
        assert_eq!(svc.player_id().unwrap(), ProfileId::new(9));
    }

    #[tokio::test]
    async fn test_auto_snapshot_outcomes() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::with_records(&[StatRecord::new(2130255, 1, 0)]));
        let svc = service(&tmp, source.clone());

        let early = svc.auto_snapshot(&at(0, 2026, 5, 2, 8), 10).await.unwrap();
        assert!(matches!(early, AutoSnapshot::TooEarly { hour: 8 }));
        assert_eq!(source.calls(), 0);

        let now = Utc::now();
        let created = svc.auto_snapshot(&now, 0).await.unwrap();
        assert!(matches!(created, AutoSnapshot::Created(_)));
        assert_eq!(source.calls(), 1);

        let again = svc.auto_snapshot(&now, 0).await.unwrap();
        assert!(matches!(again, AutoSnapshot::AlreadyTaken));
        assert_eq!(source.calls(), 1);
    }
}
