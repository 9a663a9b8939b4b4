//! Handlers for the `/managers` resource.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tourline_core::tour::Manager;
use tourline_core::types::EntityId;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerResponse {
    pub manager_id: EntityId,
    pub name: String,
}

impl From<Manager> for ManagerResponse {
    fn from(manager: Manager) -> Self {
        Self {
            manager_id: manager.id,
            name: manager.name,
        }
    }
}

/// GET /api/managers
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ManagerResponse>>> {
    let managers = state.repo.list_managers().await?;
    Ok(Json(managers.into_iter().map(ManagerResponse::from).collect()))
}
