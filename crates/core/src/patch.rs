//! Partial updates of a tour through a JSON Patch (RFC 6902) document.
//!
//! The patch never touches the entity directly. It is applied to a JSON
//! staging tree built from [`TourForUpdate`], the projection of the fields a
//! patch may alter. Application runs as a chain of gates:
//!
//! 1. presence: the document must be a non-empty operation array
//! 2. structure: every operation must target a known field, and the
//!    operations must apply cleanly in document order
//! 3. semantics: the patched projection must pass field and cross-field rules
//! 4. merge: the validated projection overwrites the writable fields of a
//!    copy of the entity
//!
//! Gates 1-2 fail with a client-input rejection, gate 3 with a validation
//! rejection. The caller's entity is left untouched in every case.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::tour::{validate_date_range, validate_not_blank, Tour};
use crate::types::Timestamp;

/// JSON pointers a patch operation may reference.
pub const UPDATABLE_PATHS: &[&str] = &["/title", "/description", "/startDate", "/endDate"];

const KNOWN_OPS: &[&str] = &["add", "remove", "replace", "move", "copy", "test"];

/// Mutable staging projection of a tour's writable fields.
///
/// Every field is optional so that `remove` operations survive structural
/// application and are then reported by validation, not by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "validate_update_dates"))]
pub struct TourForUpdate {
    #[validate(
        required(message = "Title is required."),
        length(max = 200, message = "Title is too long.")
    )]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long."))]
    pub description: Option<String>,
    #[validate(required(message = "The start date is required."))]
    pub start_date: Option<Timestamp>,
    #[validate(required(message = "The end date is required."))]
    pub end_date: Option<Timestamp>,
}

fn validate_update_dates(update: &TourForUpdate) -> Result<(), ValidationError> {
    match (update.start_date, update.end_date) {
        (Some(start), Some(end)) => validate_date_range(start, end),
        _ => Ok(()),
    }
}

/// A [`TourForUpdate`] that passed validation; every required field is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUpdate {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

impl TourForUpdate {
    /// Build the staging projection from the entity's current values.
    pub fn from_tour(tour: &Tour) -> Self {
        Self {
            title: Some(tour.title.clone()),
            description: tour.description.clone(),
            start_date: Some(tour.start_date),
            end_date: Some(tour.end_date),
        }
    }

    /// Staging tree the patch operations run against. Absent description is
    /// an explicit `null` so that `replace /description` is always valid.
    fn to_tree(&self) -> Value {
        json!({
            "title": self.title,
            "description": self.description,
            "startDate": self.start_date,
            "endDate": self.end_date,
        })
    }

    /// Run field and cross-field rules.
    pub fn check(self) -> Result<ValidatedUpdate, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(Err(err)) = self.title.as_deref().map(validate_not_blank) {
            errors.add("title", err);
        }

        match self {
            TourForUpdate {
                title: Some(title),
                description,
                start_date: Some(start_date),
                end_date: Some(end_date),
            } if errors.is_empty() => Ok(ValidatedUpdate {
                title,
                description,
                start_date,
                end_date,
            }),
            _ => Err(errors),
        }
    }
}

/// Why a patch was refused.
#[derive(Debug, thiserror::Error)]
pub enum PatchRejection {
    #[error("A non-empty patch document is required")]
    Missing,

    #[error("Malformed patch document: {0}")]
    Malformed(String),

    #[error("Patch could not be applied: {0}")]
    Structural(String),

    #[error("Patched tour failed validation: {0}")]
    Invalid(ValidationErrors),
}

impl From<PatchRejection> for CoreError {
    fn from(rejection: PatchRejection) -> Self {
        match rejection {
            PatchRejection::Invalid(errors) => CoreError::InvalidFields(errors),
            other => CoreError::BadRequest(other.to_string()),
        }
    }
}

/// Apply `document` to a copy of `tour` and return the updated copy.
///
/// `document` is `None` when the request carried no body at all.
pub fn apply_patch(tour: &Tour, document: Option<&Value>) -> Result<Tour, PatchRejection> {
    let operations = match document {
        None | Some(Value::Null) => return Err(PatchRejection::Missing),
        Some(Value::Array(ops)) if ops.is_empty() => return Err(PatchRejection::Missing),
        Some(Value::Array(ops)) => ops,
        Some(_) => {
            return Err(PatchRejection::Malformed(
                "Patch document must be an array of operations".into(),
            ))
        }
    };

    for (index, operation) in operations.iter().enumerate() {
        check_operation(index, operation)?;
    }

    let patch: json_patch::Patch = serde_json::from_value(Value::Array(operations.clone()))
        .map_err(|e| PatchRejection::Malformed(e.to_string()))?;

    let mut staged = TourForUpdate::from_tour(tour).to_tree();
    json_patch::patch(&mut staged, &patch)
        .map_err(|e| PatchRejection::Structural(e.to_string()))?;

    let projection: TourForUpdate = serde_json::from_value(staged)
        .map_err(|e| PatchRejection::Structural(format!("Patched value has wrong type: {e}")))?;

    let update = projection.check().map_err(PatchRejection::Invalid)?;

    let mut updated = tour.clone();
    merge_update(update, &mut updated);
    Ok(updated)
}

/// Overwrite the writable surface of `tour` with `update`.
pub fn merge_update(update: ValidatedUpdate, tour: &mut Tour) {
    tour.title = update.title;
    tour.description = update.description;
    tour.start_date = update.start_date;
    tour.end_date = update.end_date;
}

fn check_operation(index: usize, operation: &Value) -> Result<(), PatchRejection> {
    let op = operation
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchRejection::Malformed(format!("Operation {index} has no 'op'")))?;
    if !KNOWN_OPS.contains(&op) {
        return Err(PatchRejection::Malformed(format!(
            "Operation {index} has unknown op '{op}'"
        )));
    }

    let path = operation
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchRejection::Malformed(format!("Operation {index} has no 'path'")))?;
    check_path(index, path)?;

    if op == "move" || op == "copy" {
        let from = operation.get("from").and_then(Value::as_str).ok_or_else(|| {
            PatchRejection::Malformed(format!("Operation {index} ({op}) has no 'from'"))
        })?;
        check_path(index, from)?;
    }
    Ok(())
}

fn check_path(index: usize, path: &str) -> Result<(), PatchRejection> {
    if UPDATABLE_PATHS.contains(&path) {
        Ok(())
    } else {
        Err(PatchRejection::Structural(format!(
            "Operation {index} targets '{path}', which is not an updatable field"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn tour() -> Tour {
        let start = Utc.with_ymd_and_hms(2027, 6, 1, 19, 0, 0).unwrap();
        Tour {
            id: Uuid::new_v4(),
            band_id: Uuid::new_v4(),
            manager_id: Uuid::new_v4(),
            title: "Villains".to_string(),
            description: Some("North American leg".to_string()),
            start_date: start,
            end_date: start + Duration::days(40),
            estimated_profits: 0.0,
            version: 1,
            shows: Vec::new(),
        }
    }

    fn apply(tour: &Tour, document: Value) -> Result<Tour, PatchRejection> {
        apply_patch(tour, Some(&document))
    }

    #[test]
    fn replace_title_updates_copy_only() {
        let original = tour();
        let updated = apply(
            &original,
            json!([{"op": "replace", "path": "/title", "value": "Villains Redux"}]),
        )
        .unwrap();
        assert_eq!(updated.title, "Villains Redux");
        assert_eq!(original.title, "Villains");
        assert_eq!(updated.version, original.version);
    }

    #[test]
    fn missing_and_empty_documents_are_rejected() {
        assert_matches!(apply_patch(&tour(), None), Err(PatchRejection::Missing));
        assert_matches!(apply(&tour(), Value::Null), Err(PatchRejection::Missing));
        assert_matches!(apply(&tour(), json!([])), Err(PatchRejection::Missing));
        assert_matches!(
            apply(&tour(), json!({"title": "x"})),
            Err(PatchRejection::Malformed(_))
        );
    }

    #[test]
    fn unknown_path_is_structural() {
        let result = apply(
            &tour(),
            json!([{"op": "replace", "path": "/managerId", "value": Uuid::new_v4()}]),
        );
        assert_matches!(result, Err(PatchRejection::Structural(_)));
    }

    #[test]
    fn move_from_unknown_path_is_structural() {
        let result = apply(
            &tour(),
            json!([{"op": "move", "from": "/bandId", "path": "/title"}]),
        );
        assert_matches!(result, Err(PatchRejection::Structural(_)));
    }

    #[test]
    fn unknown_op_is_malformed() {
        let result = apply(&tour(), json!([{"op": "merge", "path": "/title"}]));
        assert_matches!(result, Err(PatchRejection::Malformed(_)));
    }

    #[test]
    fn replace_after_remove_is_structural() {
        let result = apply(
            &tour(),
            json!([
                {"op": "remove", "path": "/description"},
                {"op": "replace", "path": "/description", "value": "again"}
            ]),
        );
        assert_matches!(result, Err(PatchRejection::Structural(_)));
    }

    #[test]
    fn failed_test_operation_is_structural() {
        let result = apply(
            &tour(),
            json!([{"op": "test", "path": "/title", "value": "Something Else"}]),
        );
        assert_matches!(result, Err(PatchRejection::Structural(_)));
    }

    #[test]
    fn wrong_value_type_is_structural() {
        let result = apply(
            &tour(),
            json!([{"op": "replace", "path": "/startDate", "value": "next tuesday"}]),
        );
        assert_matches!(result, Err(PatchRejection::Structural(_)));
    }

    #[test]
    fn removing_title_fails_validation() {
        let result = apply(&tour(), json!([{"op": "remove", "path": "/title"}]));
        let errors = assert_matches!(result, Err(PatchRejection::Invalid(e)) => e);
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn blank_title_fails_validation() {
        let result = apply(
            &tour(),
            json!([{"op": "replace", "path": "/title", "value": "   "}]),
        );
        assert_matches!(result, Err(PatchRejection::Invalid(_)));
    }

    #[test]
    fn oversized_title_fails_validation() {
        let result = apply(
            &tour(),
            json!([{"op": "replace", "path": "/title", "value": "t".repeat(201)}]),
        );
        let errors = assert_matches!(result, Err(PatchRejection::Invalid(e)) => e);
        assert!(errors.field_errors().contains_key("title"));

        let longest = apply(
            &tour(),
            json!([{"op": "replace", "path": "/title", "value": "t".repeat(200)}]),
        );
        assert_eq!(longest.unwrap().title.len(), 200);
    }

    #[test]
    fn oversized_description_fails_validation() {
        let result = apply(
            &tour(),
            json!([{"op": "replace", "path": "/description", "value": "d".repeat(2001)}]),
        );
        let errors = assert_matches!(result, Err(PatchRejection::Invalid(e)) => e);
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn end_before_patched_start_fails_validation() {
        let result = apply(
            &tour(),
            json!([
                {"op": "replace", "path": "/startDate", "value": "2027-09-01T00:00:00Z"},
                {"op": "replace", "path": "/endDate", "value": "2027-08-01T00:00:00Z"}
            ]),
        );
        let errors = assert_matches!(result, Err(PatchRejection::Invalid(e)) => e);
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn copy_title_into_description() {
        let updated = apply(
            &tour(),
            json!([{"op": "copy", "from": "/title", "path": "/description"}]),
        )
        .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Villains"));
    }

    #[test]
    fn noop_replace_is_idempotent() {
        let original = tour();
        let document = json!([{"op": "replace", "path": "/title", "value": "Villains"}]);
        let once = apply(&original, document.clone()).unwrap();
        let twice = apply(&once, document).unwrap();
        assert_eq!(once, original);
        assert_eq!(twice, once);
    }

    #[test]
    fn rejection_maps_to_core_error_kinds() {
        assert_matches!(
            CoreError::from(PatchRejection::Missing),
            CoreError::BadRequest(_)
        );
        assert_matches!(
            CoreError::from(PatchRejection::Invalid(ValidationErrors::new())),
            CoreError::InvalidFields(_)
        );
    }
}
