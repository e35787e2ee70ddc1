use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use super::PlayerQuery;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::PlayerProfile;

#[derive(Debug, Serialize)]
pub struct SetPlayerResponse {
    pub message: String,
    pub player: PlayerProfile,
}

pub async fn get_player(State(state): State<AppState>) -> Result<Json<PlayerProfile>, ApiError> {
    Ok(Json(state.session.player()?))
}

pub async fn set_player(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<SetPlayerResponse>, ApiError> {
    let id = query
        .profile_id()?
        .ok_or_else(|| ApiError::BadRequest("Missing player id".to_string()))?;

    let player = state.session.set_player(id).await?;
    Ok(Json(SetPlayerResponse {
        message: format!("Player set to {}", id),
        player,
    }))
}
