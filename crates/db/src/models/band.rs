//! Band row model.

use sqlx::FromRow;
use tourline_core::tour::Band;
use tourline_core::types::EntityId;

/// A row from the `bands` table.
#[derive(Debug, Clone, FromRow)]
pub struct BandRow {
    pub id: EntityId,
    pub name: String,
}

impl From<BandRow> for Band {
    fn from(row: BandRow) -> Self {
        Band {
            id: row.id,
            name: row.name,
        }
    }
}
