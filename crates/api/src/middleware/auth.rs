//! JWT-based caller extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tourline_core::error::CoreError;
use tourline_core::policy::CallerIdentity;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Caller of a request, resolved from the `Authorization` header.
///
/// A request without the header is [`Caller::Anonymous`]; whether that is
/// acceptable depends on the policies of the selected variant. A header
/// that is present but malformed, or a token that fails validation, is
/// rejected with 401 before any handler runs.
///
/// ```ignore
/// async fn my_handler(caller: Caller) -> AppResult<Json<()>> {
///     let identity = caller.require_identity()?;
///     tracing::info!(subject = %identity.subject, role = %identity.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Identified(CallerIdentity),
}

impl Caller {
    pub fn identity(&self) -> Option<&CallerIdentity> {
        match self {
            Caller::Anonymous => None,
            Caller::Identified(identity) => Some(identity),
        }
    }

    /// The identity, or 401 for anonymous callers.
    pub fn require_identity(&self) -> Result<&CallerIdentity, AppError> {
        self.identity().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller::Anonymous);
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(Caller::Identified(CallerIdentity::new(claims.sub, claims.role)))
    }
}
