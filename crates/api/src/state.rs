use std::sync::Arc;

use tourline_core::locks::ResourceLocks;
use tourline_core::representation::ProfitEstimator;
use tourline_db::repositories::TourRepository;

use crate::config::ServerConfig;
use crate::negotiation::{tour_registry, RegistryError, RepresentationRegistry};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator (PostgreSQL or in-memory).
    pub repo: Arc<dyn TourRepository>,
    /// Immutable variant table for the tour routes, built once at startup.
    pub registry: Arc<RepresentationRegistry>,
    /// Server configuration (JWT, fallback owner, profit strategy).
    pub config: Arc<ServerConfig>,
    /// Business rule behind the estimated-profits representations.
    pub profits: Arc<dyn ProfitEstimator>,
    /// Per-tour serialization of patch read-modify-write sequences.
    pub locks: Arc<ResourceLocks>,
}

impl AppState {
    /// Assemble state around `repo`. Fails if the variant table is ambiguous.
    pub fn new(repo: Arc<dyn TourRepository>, config: ServerConfig) -> Result<Self, RegistryError> {
        let registry = tour_registry()?;
        let profits = config.profit_strategy.estimator();
        Ok(Self {
            repo,
            registry: Arc::new(registry),
            config: Arc::new(config),
            profits,
            locks: Arc::new(ResourceLocks::new()),
        })
    }
}
