//! Repository seam between the request pipeline and storage.
//!
//! Reads go straight through [`TourRepository`]. Writes are staged in a
//! [`ChangeSet`] that lives only in memory until [`TourRepository::commit`]
//! makes it durable in one step; dropping an uncommitted change set has no
//! effect on the store.

use async_trait::async_trait;
use tourline_core::tour::{Band, LoadedTour, Manager, Tour};
use tourline_core::types::EntityId;

use crate::error::StoreResult;

mod memory_tour_repo;
mod pg_tour_repo;

pub use memory_tour_repo::MemoryTourRepo;
pub use pg_tour_repo::PgTourRepo;

/// Pending writes for a single commit.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    added: Vec<Tour>,
    updated: Vec<Tour>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new tour (with its shows) for insertion.
    pub fn add_tour(&mut self, tour: Tour) {
        self.added.push(tour);
    }

    /// Stage the writable fields of an existing tour.
    ///
    /// `tour.version` must be the version that was read; commit fails with
    /// [`crate::StoreError::Conflict`] if the stored version has moved on.
    pub fn update_tour(&mut self, tour: Tour) {
        self.updated.push(tour);
    }

    pub fn added(&self) -> &[Tour] {
        &self.added
    }

    pub fn updated(&self) -> &[Tour] {
        &self.updated
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty()
    }
}

/// Storage operations the tour pipeline depends on.
#[async_trait]
pub trait TourRepository: Send + Sync + 'static {
    /// Every tour, without shows.
    async fn list_tours(&self) -> StoreResult<Vec<LoadedTour>>;

    /// Tours owned by `manager_id`, without shows.
    async fn list_tours_by_manager(&self, manager_id: EntityId) -> StoreResult<Vec<LoadedTour>>;

    async fn get_tour(&self, id: EntityId, include_shows: bool)
        -> StoreResult<Option<LoadedTour>>;

    async fn band_exists(&self, id: EntityId) -> StoreResult<bool>;

    async fn manager_exists(&self, id: EntityId) -> StoreResult<bool>;

    async fn list_bands(&self) -> StoreResult<Vec<Band>>;

    async fn list_managers(&self) -> StoreResult<Vec<Manager>>;

    /// Apply every staged change atomically, or none of them.
    async fn commit(&self, changes: ChangeSet) -> StoreResult<()>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> StoreResult<()>;
}
