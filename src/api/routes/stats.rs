use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use super::PlayerQuery;
use crate::api::state::AppState;
use crate::api::ApiError;

/// Proxy the raw personal-stat payload, for `?id=` or the tracked player.
pub async fn proxy_stats(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<Value>, ApiError> {
    let player = match query.profile_id()? {
        Some(id) => id,
        None => state.session.player_id()?,
    };

    let payload = state.session.source().fetch_raw(player).await?;
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::api::test_support::*;
    use crate::fetch::MockSource;
    use crate::models::StatRecord;

    #[tokio::test]
    async fn test_proxy_returns_upstream_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::with_records(&[StatRecord::new(2130255, 4, 2)]));
        let app = test_router(setup_test_state(tmp.path(), source), tmp.path());

        let (status, json) = send(app, "GET", "/api/stats?id=123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["leaderboardStats"][0]["leaderboard_id"], 2130255);
        assert_eq!(json["leaderboardStats"][0]["wins"], 4);
    }

    #[tokio::test]
    async fn test_proxy_upstream_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(
            setup_test_state(tmp.path(), Arc::new(MockSource::failing())),
            tmp.path(),
        );

        let (status, json) = send(app, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_proxy_bad_id() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_router(
            setup_test_state(tmp.path(), Arc::new(MockSource::failing())),
            tmp.path(),
        );

        let (status, _) = send(app, "GET", "/api/stats?id=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
