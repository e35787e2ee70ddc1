use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use super::PlayerQuery;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::StatRecord;
use crate::session::SessionStarted;
use crate::storage;

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub message: String,
    pub session: SessionStarted,
}

/// Snapshot current stats as the new baseline.
pub async fn start_session(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let player = match query.profile_id()? {
        Some(id) => id,
        None => state.session.player_id()?,
    };

    let session = state.session.start_session(player).await?;
    Ok(Json(StartSessionResponse {
        message: format!(
            "Session started for {} at {}",
            player,
            session.started_at.format("%H:%M:%S")
        ),
        session,
    }))
}

/// Current baseline records.
pub async fn get_session(State(state): State<AppState>) -> Result<Json<Vec<StatRecord>>, ApiError> {
    let store = state.session.storage();
    if !storage::has_baseline(store) {
        return Err(ApiError::NotFound("No active session".to_string()));
    }
    Ok(Json(storage::read_baseline(store)?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::api::test_support::*;
    use crate::fetch::MockSource;
    use crate::models::StatRecord;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::with_records(&[
            StatRecord::new(2130255, 10, 4),
            StatRecord::new(2130300, 2, 7),
        ]));
        let app = test_router(setup_test_state(tmp.path(), source), tmp.path());

        let (status, json) = send(app.clone(), "GET", "/api/session", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["message"], "Not found: No active session");

        let (status, json) = send(app.clone(), "POST", "/api/start-session?id=321", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["session"]["player"], 321);
        assert_eq!(json["session"]["leaderboards"], 2);

        let (status, json) = send(app.clone(), "GET", "/api/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[1]["losses"], 7);

        let (_, json) = send(app, "GET", "/api/player", None).await;
        assert_eq!(json["id"], 321);
    }

    #[tokio::test]
    async fn test_start_session_upstream_down() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(
            setup_test_state(tmp.path(), Arc::new(MockSource::failing())),
            tmp.path(),
        );

        let (status, _) = send(app.clone(), "POST", "/api/start-session", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = send(app, "GET", "/api/session", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
