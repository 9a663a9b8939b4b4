//! Tour aggregate and its reference entities.
//!
//! A [`Tour`] owns its [`Show`]s; bands and managers are referenced by id
//! only and are read-only from this crate's point of view.

use std::borrow::Cow;

use validator::ValidationError;

use crate::types::{EntityId, Timestamp};

/// A tour as stored by the persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub id: EntityId,
    pub band_id: EntityId,
    /// Owning manager. Checked by the `OwnerMatch` policy.
    pub manager_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Recorded profit figure, input to the default profit strategy.
    pub estimated_profits: f64,
    /// Optimistic concurrency token, bumped on every committed update.
    pub version: i64,
    /// Only populated when the tour was loaded with its shows.
    pub shows: Vec<Show>,
}

/// A single dated performance belonging to exactly one tour.
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub id: EntityId,
    pub tour_id: EntityId,
    pub date: Timestamp,
    pub venue: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manager {
    pub id: EntityId,
    pub name: String,
}

/// A tour together with the already-resolved name of its band.
///
/// The band join is performed by the repository; projection never queries.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTour {
    pub tour: Tour,
    pub band_name: String,
}

/// A resource with an owning manager, as seen by the ownership policy.
pub trait Owned {
    fn owner_id(&self) -> EntityId;
}

impl Owned for Tour {
    fn owner_id(&self) -> EntityId {
        self.manager_id
    }
}

impl Owned for LoadedTour {
    fn owner_id(&self) -> EntityId {
        self.tour.manager_id
    }
}

/// Reject strings that are empty or whitespace-only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("Value must not be blank."));
        return Err(err);
    }
    Ok(())
}

/// Cross-field rule shared by creation payloads and the update projection.
pub fn validate_date_range(start: Timestamp, end: Timestamp) -> Result<(), ValidationError> {
    if start < end {
        return Ok(());
    }
    let mut err = ValidationError::new("date_range");
    err.message = Some(Cow::Borrowed(
        "The start date should be smaller than the end date.",
    ));
    Err(err)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("Tour").is_ok());
    }

    #[test]
    fn date_range_requires_strictly_increasing_dates() {
        let now = Utc::now();
        assert!(validate_date_range(now, now + Duration::days(1)).is_ok());
        assert!(validate_date_range(now, now).is_err());
        assert!(validate_date_range(now + Duration::days(1), now).is_err());
    }
}
