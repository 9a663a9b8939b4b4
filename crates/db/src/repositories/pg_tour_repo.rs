//! PostgreSQL-backed [`TourRepository`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tourline_core::tour::{Band, LoadedTour, Manager, Tour};
use tourline_core::types::EntityId;

use super::{ChangeSet, TourRepository};
use crate::error::{StoreError, StoreResult};
use crate::models::band::BandRow;
use crate::models::manager::ManagerRow;
use crate::models::tour::{ShowRow, TourRow};

/// Tour columns joined with the band name, shared across queries.
const TOUR_SELECT: &str = "SELECT t.id, t.band_id, t.manager_id, t.title, t.description, \
     t.start_date, t.end_date, t.estimated_profits, t.version, b.name AS band_name \
     FROM tours t JOIN bands b ON b.id = t.band_id";

const SHOW_COLUMNS: &str = "id, tour_id, date, venue, city, country";

#[derive(Debug, Clone)]
pub struct PgTourRepo {
    pool: PgPool,
}

impl PgTourRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn shows_for(&self, tour_id: EntityId) -> StoreResult<Vec<ShowRow>> {
        let query = format!("SELECT {SHOW_COLUMNS} FROM shows WHERE tour_id = $1 ORDER BY date");
        let rows = sqlx::query_as::<_, ShowRow>(&query)
            .bind(tour_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

async fn insert_tour(tx: &mut Transaction<'_, Postgres>, tour: &Tour) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO tours (id, band_id, manager_id, title, description, start_date, end_date,
                            estimated_profits, version)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(tour.id)
    .bind(tour.band_id)
    .bind(tour.manager_id)
    .bind(&tour.title)
    .bind(&tour.description)
    .bind(tour.start_date)
    .bind(tour.end_date)
    .bind(tour.estimated_profits)
    .bind(tour.version)
    .execute(&mut **tx)
    .await?;

    for show in &tour.shows {
        sqlx::query(
            "INSERT INTO shows (id, tour_id, date, venue, city, country)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(show.id)
        .bind(tour.id)
        .bind(show.date)
        .bind(&show.venue)
        .bind(&show.city)
        .bind(&show.country)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Compare-and-swap on `version`; bumps it on success.
async fn update_tour(tx: &mut Transaction<'_, Postgres>, tour: &Tour) -> StoreResult<()> {
    let result = sqlx::query(
        "UPDATE tours SET
            title = $3,
            description = $4,
            start_date = $5,
            end_date = $6,
            version = version + 1,
            updated_at = NOW()
         WHERE id = $1 AND version = $2",
    )
    .bind(tour.id)
    .bind(tour.version)
    .bind(&tour.title)
    .bind(&tour.description)
    .bind(tour.start_date)
    .bind(tour.end_date)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Conflict {
            id: tour.id,
            expected: tour.version,
        });
    }
    Ok(())
}

#[async_trait]
impl TourRepository for PgTourRepo {
    async fn list_tours(&self) -> StoreResult<Vec<LoadedTour>> {
        let query = format!("{TOUR_SELECT} ORDER BY t.start_date, t.title");
        let rows = sqlx::query_as::<_, TourRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_loaded(Vec::new())).collect())
    }

    async fn list_tours_by_manager(&self, manager_id: EntityId) -> StoreResult<Vec<LoadedTour>> {
        let query = format!("{TOUR_SELECT} WHERE t.manager_id = $1 ORDER BY t.start_date, t.title");
        let rows = sqlx::query_as::<_, TourRow>(&query)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_loaded(Vec::new())).collect())
    }

    async fn get_tour(
        &self,
        id: EntityId,
        include_shows: bool,
    ) -> StoreResult<Option<LoadedTour>> {
        let query = format!("{TOUR_SELECT} WHERE t.id = $1");
        let Some(row) = sqlx::query_as::<_, TourRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let shows = if include_shows {
            self.shows_for(id).await?
        } else {
            Vec::new()
        };
        Ok(Some(row.into_loaded(shows)))
    }

    async fn band_exists(&self, id: EntityId) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bands WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn manager_exists(&self, id: EntityId) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM managers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn list_bands(&self) -> StoreResult<Vec<Band>> {
        let rows = sqlx::query_as::<_, BandRow>("SELECT id, name FROM bands ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Band::from).collect())
    }

    async fn list_managers(&self) -> StoreResult<Vec<Manager>> {
        let rows = sqlx::query_as::<_, ManagerRow>("SELECT id, name FROM managers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Manager::from).collect())
    }

    async fn commit(&self, changes: ChangeSet) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        // Rolled back on drop if any statement fails.
        let mut tx = self.pool.begin().await?;
        for tour in changes.added() {
            insert_tour(&mut tx, tour).await?;
        }
        for tour in changes.updated() {
            update_tour(&mut tx, tour).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            added = changes.added().len(),
            updated = changes.updated().len(),
            "Committed tour changes"
        );
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
