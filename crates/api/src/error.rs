use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tourline_core::error::CoreError;
use tourline_db::StoreError;

/// Body returned for every unexpected fault.
const FAULT_MESSAGE: &str = "An unexpected fault happened. Try again later.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for the
/// persistence collaborator, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tourline_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A repository error from `tourline_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No registered variant produces the media type the caller accepts.
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    /// No registered variant consumes the media type the caller sent.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::BadRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
                }
                CoreError::InvalidFields(errors) => {
                    let body = json!({
                        "error": "One or more fields are invalid",
                        "code": "VALIDATION_ERROR",
                        "details": errors,
                    });
                    return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Persistence errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotAcceptable(msg) => {
                (StatusCode::NOT_ACCEPTABLE, "NOT_ACCEPTABLE", msg.clone())
            }
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    FAULT_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a repository error into an HTTP status, error code, and message.
///
/// - A version mismatch or a tour vanishing mid-update maps to 409.
/// - Everything else is a persistence fault: logged, and surfaced as 500
///   with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Conflict { .. } | StoreError::Missing { .. } => {
            (StatusCode::CONFLICT, "CONFLICT", err.to_string())
        }
        StoreError::Database(_) | StoreError::CommitFailed(_) => {
            tracing::error!(error = %err, "Persistence failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                FAULT_MESSAGE.to_string(),
            )
        }
    }
}
