//! In-memory [`TourRepository`] for development and tests.
//!
//! Holds the whole store behind one `RwLock`; commit takes the write lock,
//! checks every staged change, and only then applies them, so a failing
//! change set leaves the store untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::RwLock;
use tourline_core::tour::{Band, LoadedTour, Manager, Show, Tour};
use tourline_core::types::EntityId;
use uuid::Uuid;

use super::{ChangeSet, TourRepository};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    bands: HashMap<EntityId, Band>,
    managers: HashMap<EntityId, Manager>,
    tours: HashMap<EntityId, Tour>,
}

impl Inner {
    fn load(&self, tour: &Tour, include_shows: bool) -> LoadedTour {
        let mut tour = tour.clone();
        if include_shows {
            tour.shows.sort_by_key(|show| show.date);
        } else {
            tour.shows.clear();
        }
        let band_name = self
            .bands
            .get(&tour.band_id)
            .map(|band| band.name.clone())
            .unwrap_or_default();
        LoadedTour { tour, band_name }
    }

    fn sorted(&self, filter: impl Fn(&Tour) -> bool) -> Vec<LoadedTour> {
        let mut tours: Vec<_> = self
            .tours
            .values()
            .filter(|tour| filter(tour))
            .map(|tour| self.load(tour, false))
            .collect();
        tours.sort_by(|a, b| {
            a.tour
                .start_date
                .cmp(&b.tour.start_date)
                .then_with(|| a.tour.title.cmp(&b.tour.title))
        });
        tours
    }
}

#[derive(Debug, Default)]
pub struct MemoryTourRepo {
    inner: RwLock<Inner>,
    fail_commits: AtomicBool,
}

impl MemoryTourRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_band(&self, band: Band) {
        self.inner.write().await.bands.insert(band.id, band);
    }

    pub async fn insert_manager(&self, manager: Manager) {
        self.inner.write().await.managers.insert(manager.id, manager);
    }

    /// Store a tour as-is, bypassing change sets and version checks.
    pub async fn insert_tour(&self, tour: Tour) {
        self.inner.write().await.tours.insert(tour.id, tour);
    }

    /// Stored copy of a tour including its shows.
    pub async fn snapshot(&self, id: EntityId) -> Option<Tour> {
        self.inner.read().await.tours.get(&id).cloned()
    }

    pub async fn tour_count(&self) -> usize {
        self.inner.read().await.tours.len()
    }

    /// Make every subsequent commit fail, for fault-injection tests.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// A small catalogue of managers, bands and tours for local runs.
    pub async fn with_demo_data() -> Self {
        let repo = Self::new();

        let kevin = Manager {
            id: Uuid::from_u128(0xfec0a4d6_5830_4eb8_8024_272bd5d6d2bb),
            name: "Kevin Dockx".to_string(),
        };
        let sven = Manager {
            id: Uuid::from_u128(0xc3b7f625_c07f_4d7d_9be1_ddff8ff93b4d),
            name: "Sven Vercauteren".to_string(),
        };
        let qotsa = Band {
            id: Uuid::from_u128(0x25320c5e_f58a_4b1f_b63a_8ee07a840bdf),
            name: "Queens of the Stone Age".to_string(),
        };
        let bad_seeds = Band {
            id: Uuid::from_u128(0x83b126b9_d7bf_4f50_96dc_860884155f8b),
            name: "Nick Cave and the Bad Seeds".to_string(),
        };

        let villains_id = Uuid::from_u128(0xc7ba6add_09c4_45f8_8dd0_eaca221e5d93);
        let villains = Tour {
            id: villains_id,
            band_id: qotsa.id,
            manager_id: kevin.id,
            title: "Villains World Tour".to_string(),
            description: Some("Touring in support of the album Villains.".to_string()),
            start_date: Utc.with_ymd_and_hms(2017, 6, 9, 0, 0, 0).single().unwrap_or_default(),
            end_date: Utc.with_ymd_and_hms(2018, 3, 28, 0, 0, 0).single().unwrap_or_default(),
            estimated_profits: 2_500_000.0,
            version: 0,
            shows: vec![Show {
                id: Uuid::from_u128(0x9e2b0ab8_6a2e_4c5a_9f0b_04f6a1c3f0a1),
                tour_id: villains_id,
                date: Utc.with_ymd_and_hms(2017, 6, 9, 19, 0, 0).single().unwrap_or_default(),
                venue: "Rock Werchter".to_string(),
                city: "Werchter".to_string(),
                country: "Belgium".to_string(),
            }],
        };
        let skeleton_tree = Tour {
            id: Uuid::from_u128(0xf67ba678_b6e0_4307_afd9_e804c23b3cd3),
            band_id: bad_seeds.id,
            manager_id: sven.id,
            title: "Skeleton Tree European Tour".to_string(),
            description: None,
            start_date: Utc.with_ymd_and_hms(2017, 9, 19, 0, 0, 0).single().unwrap_or_default(),
            end_date: Utc.with_ymd_and_hms(2017, 11, 20, 0, 0, 0).single().unwrap_or_default(),
            estimated_profits: 1_200_000.0,
            version: 0,
            shows: Vec::new(),
        };

        repo.insert_manager(kevin).await;
        repo.insert_manager(sven).await;
        repo.insert_band(qotsa).await;
        repo.insert_band(bad_seeds).await;
        repo.insert_tour(villains).await;
        repo.insert_tour(skeleton_tree).await;
        repo
    }
}

#[async_trait]
impl TourRepository for MemoryTourRepo {
    async fn list_tours(&self) -> StoreResult<Vec<LoadedTour>> {
        Ok(self.inner.read().await.sorted(|_| true))
    }

    async fn list_tours_by_manager(&self, manager_id: EntityId) -> StoreResult<Vec<LoadedTour>> {
        Ok(self
            .inner
            .read()
            .await
            .sorted(|tour| tour.manager_id == manager_id))
    }

    async fn get_tour(
        &self,
        id: EntityId,
        include_shows: bool,
    ) -> StoreResult<Option<LoadedTour>> {
        let inner = self.inner.read().await;
        Ok(inner.tours.get(&id).map(|tour| inner.load(tour, include_shows)))
    }

    async fn band_exists(&self, id: EntityId) -> StoreResult<bool> {
        Ok(self.inner.read().await.bands.contains_key(&id))
    }

    async fn manager_exists(&self, id: EntityId) -> StoreResult<bool> {
        Ok(self.inner.read().await.managers.contains_key(&id))
    }

    async fn list_bands(&self) -> StoreResult<Vec<Band>> {
        let mut bands: Vec<_> = self.inner.read().await.bands.values().cloned().collect();
        bands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(bands)
    }

    async fn list_managers(&self) -> StoreResult<Vec<Manager>> {
        let mut managers: Vec<_> = self.inner.read().await.managers.values().cloned().collect();
        managers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(managers)
    }

    async fn commit(&self, changes: ChangeSet) -> StoreResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::CommitFailed("commit failure injected".into()));
        }

        let mut inner = self.inner.write().await;

        // Check everything before touching anything.
        for tour in changes.added() {
            if inner.tours.contains_key(&tour.id) {
                return Err(StoreError::CommitFailed(format!(
                    "tour {} already exists",
                    tour.id
                )));
            }
        }
        for tour in changes.updated() {
            let stored = inner
                .tours
                .get(&tour.id)
                .ok_or(StoreError::Missing { id: tour.id })?;
            if stored.version != tour.version {
                return Err(StoreError::Conflict {
                    id: tour.id,
                    expected: tour.version,
                });
            }
        }

        for tour in changes.added() {
            inner.tours.insert(tour.id, tour.clone());
        }
        for tour in changes.updated() {
            if let Some(stored) = inner.tours.get_mut(&tour.id) {
                stored.title = tour.title.clone();
                stored.description = tour.description.clone();
                stored.start_date = tour.start_date;
                stored.end_date = tour.end_date;
                stored.version += 1;
            }
        }

        tracing::debug!(
            added = changes.added().len(),
            updated = changes.updated().len(),
            "Committed tour changes"
        );
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
