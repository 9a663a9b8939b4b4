//! Read-side projections of a tour.
//!
//! Every representation is the flat [`TourSummary`] plus zero or more
//! orthogonal extension groups (estimated profits, shows). A
//! [`RepresentationShape`] says which groups to fill; [`project`] fills them.
//! Profit is computed by a pluggable [`ProfitEstimator`].

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::tour::{LoadedTour, Show, Tour};
use crate::types::{EntityId, Timestamp};

/// Which extension groups a read representation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepresentationShape {
    pub estimated_profits: bool,
    pub shows: bool,
}

impl RepresentationShape {
    pub const FLAT: Self = Self {
        estimated_profits: false,
        shows: false,
    };
    pub const WITH_ESTIMATED_PROFITS: Self = Self {
        estimated_profits: true,
        shows: false,
    };
    pub const WITH_SHOWS: Self = Self {
        estimated_profits: false,
        shows: true,
    };
    pub const WITH_ESTIMATED_PROFITS_AND_SHOWS: Self = Self {
        estimated_profits: true,
        shows: true,
    };
}

/// Flat tour representation; the base of every shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSummary {
    pub tour_id: EntityId,
    /// Band name, resolved by the repository join.
    pub band: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRepresentation {
    pub show_id: EntityId,
    pub date: Timestamp,
    pub venue: String,
    pub city: String,
    pub country: String,
}

/// A tour projected into one [`RepresentationShape`].
///
/// Absent groups are omitted from the serialized body entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRepresentation {
    #[serde(flatten)]
    pub summary: TourSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_profits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shows: Option<Vec<ShowRepresentation>>,
}

/// Business rule producing the estimated profit of a tour.
pub trait ProfitEstimator: Send + Sync {
    fn estimate(&self, tour: &Tour) -> f64;
}

/// Reports the profit figure recorded on the tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedProfits;

impl ProfitEstimator for RecordedProfits {
    fn estimate(&self, tour: &Tour) -> f64 {
        tour.estimated_profits
    }
}

/// Flat expected margin per loaded show.
#[derive(Debug, Clone, Copy)]
pub struct PerShowProfits {
    pub per_show: f64,
}

impl ProfitEstimator for PerShowProfits {
    fn estimate(&self, tour: &Tour) -> f64 {
        self.per_show * tour.shows.len() as f64
    }
}

/// Configured choice of [`ProfitEstimator`].
///
/// Parsed from `recorded` or `per-show:<amount>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitStrategy {
    Recorded,
    PerShow(f64),
}

impl ProfitStrategy {
    pub fn estimator(self) -> Arc<dyn ProfitEstimator> {
        match self {
            ProfitStrategy::Recorded => Arc::new(RecordedProfits),
            ProfitStrategy::PerShow(per_show) => Arc::new(PerShowProfits { per_show }),
        }
    }
}

impl FromStr for ProfitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "recorded" {
            return Ok(ProfitStrategy::Recorded);
        }
        if let Some(amount) = s.strip_prefix("per-show:") {
            let per_show: f64 = amount
                .trim()
                .parse()
                .map_err(|e| format!("Invalid per-show amount '{amount}': {e}"))?;
            return Ok(ProfitStrategy::PerShow(per_show));
        }
        Err(format!(
            "Unknown profit strategy '{s}'. Expected 'recorded' or 'per-show:<amount>'"
        ))
    }
}

/// Project the flat fields of a loaded tour.
pub fn project_summary(loaded: &LoadedTour) -> TourSummary {
    let tour = &loaded.tour;
    TourSummary {
        tour_id: tour.id,
        band: loaded.band_name.clone(),
        title: tour.title.clone(),
        description: tour.description.clone(),
        start_date: tour.start_date,
        end_date: tour.end_date,
    }
}

pub fn project_show(show: &Show) -> ShowRepresentation {
    ShowRepresentation {
        show_id: show.id,
        date: show.date,
        venue: show.venue.clone(),
        city: show.city.clone(),
        country: show.country.clone(),
    }
}

/// Project a loaded tour into `shape`.
///
/// The shows group is built from whatever shows the repository loaded, so
/// callers must fetch with shows for shows-bearing shapes.
pub fn project(
    loaded: &LoadedTour,
    shape: RepresentationShape,
    profits: &dyn ProfitEstimator,
) -> TourRepresentation {
    TourRepresentation {
        summary: project_summary(loaded),
        estimated_profits: shape
            .estimated_profits
            .then(|| profits.estimate(&loaded.tour)),
        shows: shape
            .shows
            .then(|| loaded.tour.shows.iter().map(project_show).collect()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn loaded_tour() -> LoadedTour {
        let id = Uuid::new_v4();
        let start = Utc::now();
        LoadedTour {
            tour: Tour {
                id,
                band_id: Uuid::new_v4(),
                manager_id: Uuid::new_v4(),
                title: "Skeleton Tree".to_string(),
                description: None,
                start_date: start,
                end_date: start + Duration::days(30),
                estimated_profits: 125_000.0,
                version: 3,
                shows: vec![Show {
                    id: Uuid::new_v4(),
                    tour_id: id,
                    date: start + Duration::days(2),
                    venue: "Paradiso".to_string(),
                    city: "Amsterdam".to_string(),
                    country: "Netherlands".to_string(),
                }],
            },
            band_name: "Nick Cave and the Bad Seeds".to_string(),
        }
    }

    #[test]
    fn flat_shape_has_no_extension_groups() {
        let repr = project(&loaded_tour(), RepresentationShape::FLAT, &RecordedProfits);
        assert!(repr.estimated_profits.is_none());
        assert!(repr.shows.is_none());

        let json = serde_json::to_value(&repr).unwrap();
        assert_eq!(json["band"], "Nick Cave and the Bad Seeds");
        assert!(json.get("shows").is_none());
        assert!(json.get("estimatedProfits").is_none());
    }

    #[test]
    fn shows_shape_adds_shows_and_keeps_scalars() {
        let loaded = loaded_tour();
        let flat = project(&loaded, RepresentationShape::FLAT, &RecordedProfits);
        let with_shows = project(&loaded, RepresentationShape::WITH_SHOWS, &RecordedProfits);

        assert_eq!(flat.summary, with_shows.summary);
        let shows = with_shows.shows.expect("shows group should be present");
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].venue, "Paradiso");
    }

    #[test]
    fn profit_shapes_use_the_supplied_estimator() {
        let loaded = loaded_tour();
        let recorded = project(
            &loaded,
            RepresentationShape::WITH_ESTIMATED_PROFITS,
            &RecordedProfits,
        );
        assert_eq!(recorded.estimated_profits, Some(125_000.0));

        let per_show = project(
            &loaded,
            RepresentationShape::WITH_ESTIMATED_PROFITS_AND_SHOWS,
            &PerShowProfits { per_show: 500.0 },
        );
        assert_eq!(per_show.estimated_profits, Some(500.0));
        assert!(per_show.shows.is_some());
    }

    #[test]
    fn profit_strategy_parses() {
        assert_eq!(
            "recorded".parse::<ProfitStrategy>(),
            Ok(ProfitStrategy::Recorded)
        );
        assert_eq!(
            "per-show:250.5".parse::<ProfitStrategy>(),
            Ok(ProfitStrategy::PerShow(250.5))
        );
        assert!("per-show:lots".parse::<ProfitStrategy>().is_err());
        assert!("guesswork".parse::<ProfitStrategy>().is_err());
    }
}
