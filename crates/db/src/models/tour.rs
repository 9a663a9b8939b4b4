//! Tour and show row models.

use sqlx::FromRow;
use tourline_core::tour::{LoadedTour, Show, Tour};
use tourline_core::types::{EntityId, Timestamp};

/// A `tours` row joined with its band's name.
#[derive(Debug, Clone, FromRow)]
pub struct TourRow {
    pub id: EntityId,
    pub band_id: EntityId,
    pub manager_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub estimated_profits: f64,
    pub version: i64,
    pub band_name: String,
}

/// A row from the `shows` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShowRow {
    pub id: EntityId,
    pub tour_id: EntityId,
    pub date: Timestamp,
    pub venue: String,
    pub city: String,
    pub country: String,
}

impl TourRow {
    /// Assemble the aggregate. `shows` is empty unless they were fetched.
    pub fn into_loaded(self, shows: Vec<ShowRow>) -> LoadedTour {
        LoadedTour {
            tour: Tour {
                id: self.id,
                band_id: self.band_id,
                manager_id: self.manager_id,
                title: self.title,
                description: self.description,
                start_date: self.start_date,
                end_date: self.end_date,
                estimated_profits: self.estimated_profits,
                version: self.version,
                shows: shows.into_iter().map(Show::from).collect(),
            },
            band_name: self.band_name,
        }
    }
}

impl From<ShowRow> for Show {
    fn from(row: ShowRow) -> Self {
        Show {
            id: row.id,
            tour_id: row.tour_id,
            date: row.date,
            venue: row.venue,
            city: row.city,
            country: row.country,
        }
    }
}
