//! Per-resource serialization point for read-modify-write sequences.
//!
//! Two patches against the same tour would otherwise each read, modify and
//! write without seeing one another. [`ResourceLocks`] hands out one async
//! mutex per resource id; the guard is held from fetch until commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::EntityId;

#[derive(Debug, Default)]
pub struct ResourceLocks {
    slots: Mutex<HashMap<EntityId, Arc<AsyncMutex<()>>>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. Released when the guard drops.
    pub async fn acquire(&self, id: EntityId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop slots nobody holds or waits on.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(id).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of ids with a live slot.
    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
