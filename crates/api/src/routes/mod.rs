pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tours                 list (role-branched), create (Content-Type selects shape)
/// /tours/{id}            get (Accept selects shape), partial update (JSON Patch)
///
/// /bands                 list
/// /managers              list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tours",
            get(handlers::tours::list).post(handlers::tours::create),
        )
        .route(
            "/tours/{id}",
            get(handlers::tours::get_by_id).patch(handlers::tours::partially_update),
        )
        .route("/bands", get(handlers::bands::list))
        .route("/managers", get(handlers::managers::list))
}
