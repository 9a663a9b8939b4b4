//! Handlers for the `/tours` resource.
//!
//! Every handler first asks the [`RepresentationRegistry`] which variant
//! applies, then runs that variant's policies, and only then touches the
//! entity. Rejections at any step leave the store untouched.
//!
//! [`RepresentationRegistry`]: crate::negotiation::RepresentationRegistry

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tourline_core::creation::{resolve_owner, OwnerSource, TourForCreation};
use tourline_core::error::CoreError;
use tourline_core::patch::apply_patch;
use tourline_core::policy::{list_scope, ListScope};
use tourline_core::representation::{
    project, project_summary, RepresentationShape, TourRepresentation, TourSummary,
};
use tourline_core::tour::LoadedTour;
use tourline_core::types::EntityId;
use tourline_db::repositories::ChangeSet;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Caller;
use crate::middleware::policy::enforce;
use crate::negotiation::{TourOperation, Variant, TOURS_PATH, TOUR_PATH};
use crate::state::AppState;

/// GET /api/tours
///
/// Administrators see every tour; anyone else sees the tours they manage.
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
) -> AppResult<Json<Vec<TourSummary>>> {
    let variant = state.registry.select(&Method::GET, TOURS_PATH, &headers)?;
    if variant.operation != TourOperation::List {
        return Err(misrouted(variant));
    }

    let identity = caller.require_identity()?;
    let scope = list_scope(identity).map_err(|reason| {
        tracing::info!(subject = %identity.subject, %reason, "Tour list denied");
        AppError::Core(CoreError::Forbidden(reason.to_string()))
    })?;

    let tours = match scope {
        ListScope::All => state.repo.list_tours().await?,
        ListScope::OwnedBy(manager_id) => state.repo.list_tours_by_manager(manager_id).await?,
    };
    Ok(Json(tours.iter().map(project_summary).collect()))
}

/// GET /api/tours/{id}
///
/// The `Accept` header picks the representation; the response carries the
/// selected media type as its `Content-Type`.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    caller: Caller,
    headers: HeaderMap,
) -> AppResult<Response> {
    let id = parse_tour_id(&raw_id)?;
    let variant = state.registry.select(&Method::GET, TOUR_PATH, &headers)?;
    let TourOperation::Read(shape) = variant.operation else {
        return Err(misrouted(variant));
    };
    tracing::debug!(tour_id = %id, variant = variant.name, "Variant selected");

    // Profit strategies may price individual shows, so load them for those shapes too.
    let loaded = fetch_tour(&state, id, shape.shows || shape.estimated_profits).await?;
    enforce(variant, &caller, Some(&loaded))?;

    let representation = project(&loaded, shape, &*state.profits);
    Ok((
        [(CONTENT_TYPE, HeaderValue::from_static(variant.response_media_type()))],
        Json(representation),
    )
        .into_response())
}

/// POST /api/tours
///
/// The `Content-Type` header picks the creation shape. Responds 201 with a
/// `Location` header and the created tour.
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let variant = state.registry.select(&Method::POST, TOURS_PATH, &headers)?;
    let TourOperation::Create(shape) = variant.operation else {
        return Err(misrouted(variant));
    };
    tracing::debug!(variant = variant.name, "Variant selected");

    enforce(variant, &caller, None)?;

    let document = match parse_document(&body)? {
        None | Some(Value::Null) => {
            return Err(AppError::BadRequest("A tour payload is required".into()))
        }
        Some(document) => document,
    };
    let input: TourForCreation = serde_json::from_value(document)
        .map_err(|e| AppError::BadRequest(format!("Invalid tour payload: {e}")))?;
    let input = input
        .for_shape(shape)?
        .check()
        .map_err(|errors| AppError::Core(CoreError::InvalidFields(errors)))?;

    if !state.repo.band_exists(input.band_id).await? {
        return Err(AppError::BadRequest(format!(
            "Band {} does not exist",
            input.band_id
        )));
    }

    let caller_owner = caller.identity().and_then(|identity| identity.owner_id());
    let (manager_id, source) = resolve_owner(
        input.manager_id,
        caller_owner,
        state.config.fallback_manager_id,
    )
    .ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "No manager could be resolved to own the new tour".into(),
        ))
    })?;
    if source == OwnerSource::Fallback {
        tracing::warn!(
            %manager_id,
            "No caller identity resolved; assigning the configured fallback manager"
        );
    }
    if !state.repo.manager_exists(manager_id).await? {
        return Err(AppError::BadRequest(format!(
            "Manager {manager_id} does not exist"
        )));
    }

    let tour = input.into_tour(manager_id);
    let id = tour.id;
    let mut changes = ChangeSet::new();
    changes.add_tour(tour);
    state.repo.commit(changes).await?;
    tracing::info!(tour_id = %id, %manager_id, variant = variant.name, "Tour created");

    let created = state.repo.get_tour(id, shape.shows).await?.ok_or_else(|| {
        AppError::InternalError(format!("Tour {id} missing right after commit"))
    })?;
    let body: TourRepresentation = project(
        &created,
        RepresentationShape {
            estimated_profits: false,
            shows: shape.shows,
        },
        &*state.profits,
    );

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/api/tours/{id}"))],
        Json(body),
    )
        .into_response())
}

/// PATCH /api/tours/{id}
///
/// Applies a JSON Patch document to the tour's writable fields. The tour is
/// locked from fetch until commit so concurrent patches cannot overwrite
/// each other.
pub async fn partially_update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    caller: Caller,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    let variant = state.registry.select(&Method::PATCH, TOUR_PATH, &headers)?;
    if variant.operation != TourOperation::PartialUpdate {
        return Err(misrouted(variant));
    }
    let id = parse_tour_id(&raw_id)?;
    let document = parse_document(&body)?;

    let _guard = state.locks.acquire(id).await;

    let loaded = fetch_tour(&state, id, false).await?;
    enforce(variant, &caller, Some(&loaded))?;

    let updated = apply_patch(&loaded.tour, document.as_ref()).map_err(CoreError::from)?;
    if updated == loaded.tour {
        tracing::debug!(tour_id = %id, "Patch left the tour unchanged; nothing to commit");
        return Ok(StatusCode::NO_CONTENT);
    }

    let mut changes = ChangeSet::new();
    changes.update_tour(updated);
    state.repo.commit(changes).await?;
    tracing::info!(tour_id = %id, "Tour updated");

    Ok(StatusCode::NO_CONTENT)
}

fn parse_tour_id(raw: &str) -> AppResult<EntityId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("'{raw}' is not a valid tour id")))
}

/// Decode a JSON body. A blank body is `None`, not an error.
fn parse_document(body: &Bytes) -> AppResult<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Request body is not valid JSON: {e}")))
}

/// Load a tour, treating an unknown id as client input error.
async fn fetch_tour(state: &AppState, id: EntityId, include_shows: bool) -> AppResult<LoadedTour> {
    state
        .repo
        .get_tour(id, include_shows)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Tour {id} does not exist")))
}

fn misrouted(variant: &Variant) -> AppError {
    AppError::InternalError(format!(
        "Variant '{}' is registered for the wrong operation",
        variant.name
    ))
}
