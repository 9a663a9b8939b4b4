//! Creation payloads for the tour resource.
//!
//! There are four creation variants, selected by `Content-Type`. They share
//! one wire struct: the variant's [`CreationShape`] decides which optional
//! field groups (manager id, show list) are read. Groups outside the shape
//! are dropped before validation so they can neither fail nor leak into the
//! entity.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::tour::{validate_date_range, validate_not_blank, Show, Tour};
use crate::types::{EntityId, Timestamp};

/// Which optional field groups a creation variant accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationShape {
    /// Caller supplies the owning manager explicitly.
    pub manager: bool,
    /// Caller supplies the initial show list.
    pub shows: bool,
}

impl CreationShape {
    pub const FLAT: Self = Self {
        manager: false,
        shows: false,
    };
    pub const WITH_MANAGER: Self = Self {
        manager: true,
        shows: false,
    };
    pub const WITH_SHOWS: Self = Self {
        manager: false,
        shows: true,
    };
    pub const WITH_MANAGER_AND_SHOWS: Self = Self {
        manager: true,
        shows: true,
    };
}

/// Incoming tour creation payload.
///
/// Title and dates are optional on the wire so that a missing or `null`
/// value is reported by validation alongside the other field rules, not by
/// deserialization. The band id stays mandatory at the wire level.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_creation_dates"))]
pub struct TourForCreation {
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
    pub band_id: EntityId,
    #[serde(default)]
    pub manager_id: Option<EntityId>,
    #[serde(default)]
    #[validate(nested)]
    pub shows: Vec<ShowForCreation>,
}

/// A [`TourForCreation`] that passed validation; title and dates are set.
#[derive(Debug, Clone)]
pub struct ValidatedCreation {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub band_id: EntityId,
    pub manager_id: Option<EntityId>,
    pub shows: Vec<ShowForCreation>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShowForCreation {
    pub date: Timestamp,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 200, message = "Venue is too long.")
    )]
    pub venue: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "City is too long.")
    )]
    pub city: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Country is too long.")
    )]
    pub country: String,
}

fn validate_creation_dates(tour: &TourForCreation) -> Result<(), ValidationError> {
    match (tour.start_date, tour.end_date) {
        (Some(start), Some(end)) => validate_date_range(start, end),
        _ => Ok(()),
    }
}

impl TourForCreation {
    /// Keep only the field groups `shape` accepts.
    ///
    /// Fails with `BadRequest` when a manager-bearing shape arrives without a
    /// manager id.
    pub fn for_shape(mut self, shape: CreationShape) -> Result<Self, CoreError> {
        if shape.manager {
            if self.manager_id.is_none() {
                return Err(CoreError::BadRequest(
                    "managerId is required for this media type".into(),
                ));
            }
        } else {
            self.manager_id = None;
        }
        if !shape.shows {
            self.shows.clear();
        }
        Ok(self)
    }

    /// Run field, nested show and cross-field rules.
    pub fn check(self) -> Result<ValidatedCreation, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(Err(err)) = self.title.as_deref().map(validate_not_blank) {
            errors.add("title", err);
        }

        match self {
            TourForCreation {
                title: Some(title),
                description,
                start_date: Some(start_date),
                end_date: Some(end_date),
                band_id,
                manager_id,
                shows,
            } if errors.is_empty() => Ok(ValidatedCreation {
                title,
                description,
                start_date,
                end_date,
                band_id,
                manager_id,
                shows,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidatedCreation {
    /// Build a new entity owned by `manager_id`. Shows receive fresh ids.
    pub fn into_tour(self, manager_id: EntityId) -> Tour {
        let id = Uuid::new_v4();
        let shows = self
            .shows
            .into_iter()
            .map(|show| Show {
                id: Uuid::new_v4(),
                tour_id: id,
                date: show.date,
                venue: show.venue,
                city: show.city,
                country: show.country,
            })
            .collect();

        Tour {
            id,
            band_id: self.band_id,
            manager_id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            estimated_profits: 0.0,
            version: 0,
            shows,
        }
    }
}

/// Where the owner of a newly created tour came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerSource {
    Payload,
    Caller,
    Fallback,
}

/// Pick the owning manager for a new tour.
///
/// An explicit payload id wins, then the caller's resolved identity, then
/// the operator-configured fallback. `None` means no owner can be resolved
/// and the creation must be denied.
pub fn resolve_owner(
    payload: Option<EntityId>,
    caller: Option<EntityId>,
    fallback: Option<EntityId>,
) -> Option<(EntityId, OwnerSource)> {
    payload
        .map(|id| (id, OwnerSource::Payload))
        .or_else(|| caller.map(|id| (id, OwnerSource::Caller)))
        .or_else(|| fallback.map(|id| (id, OwnerSource::Fallback)))
}
