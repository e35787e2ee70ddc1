use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Preferences;
use crate::storage;

pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.poller.preferences())
}

pub async fn save_preferences(
    State(state): State<AppState>,
    Json(prefs): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    storage::write_preferences(state.session.storage(), &prefs)?;
    tracing::info!(
        "Preferences saved: grouping {}, {} modes visible",
        prefs.grouping,
        prefs.visible_modes.len()
    );
    Ok(Json(prefs))
}
