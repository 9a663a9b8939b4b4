//! Repository error types.

use thiserror::Error;
use tourline_core::types::EntityId;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version moved on since the tour was read.
    #[error("tour {id} was modified concurrently (expected version {expected})")]
    Conflict { id: EntityId, expected: i64 },

    /// An update referenced a tour that is not stored.
    #[error("tour {id} does not exist")]
    Missing { id: EntityId },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store refused to make the change set durable.
    #[error("commit failed: {0}")]
    CommitFailed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
