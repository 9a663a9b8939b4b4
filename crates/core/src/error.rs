use validator::ValidationErrors;

/// Errors raised by domain logic, independent of the HTTP surface.
///
/// Persistence faults live in `tourline_db::StoreError`; unknown entities
/// are reported as `BadRequest` because ids arrive as client input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    InvalidFields(ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
