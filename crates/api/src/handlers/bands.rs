//! Handlers for the `/bands` resource.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tourline_core::tour::Band;
use tourline_core::types::EntityId;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandResponse {
    pub band_id: EntityId,
    pub name: String,
}

impl From<Band> for BandResponse {
    fn from(band: Band) -> Self {
        Self {
            band_id: band.id,
            name: band.name,
        }
    }
}

/// GET /api/bands
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<BandResponse>>> {
    let bands = state.repo.list_bands().await?;
    Ok(Json(bands.into_iter().map(BandResponse::from).collect()))
}
