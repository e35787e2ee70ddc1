use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::overlay::OverlayState;

#[derive(Debug, Default, Deserialize)]
pub struct OverlayParams {
    /// Render now instead of returning the last tick
    #[serde(default)]
    pub refresh: bool,
}

pub async fn get_overlay(
    State(state): State<AppState>,
    Query(params): Query<OverlayParams>,
) -> Json<OverlayState> {
    if params.refresh {
        return Json(state.poller.tick().await);
    }
    Json(state.poller.state().read().await.clone())
}
