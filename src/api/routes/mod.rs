pub mod overlay;
pub mod player;
pub mod preferences;
pub mod session;
pub mod stats;

use serde::Deserialize;

use crate::api::ApiError;
use crate::models::ProfileId;

/// `?id=` query used by the player-scoped endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerQuery {
    pub id: Option<String>,
}

impl PlayerQuery {
    /// Parsed id; a missing or blank id is `None`.
    pub fn profile_id(&self) -> Result<Option<ProfileId>, ApiError> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(ApiError::BadRequest),
        }
    }
}
