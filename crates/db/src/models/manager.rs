//! Manager row model.

use sqlx::FromRow;
use tourline_core::tour::Manager;
use tourline_core::types::EntityId;

/// A row from the `managers` table.
#[derive(Debug, Clone, FromRow)]
pub struct ManagerRow {
    pub id: EntityId,
    pub name: String,
}

impl From<ManagerRow> for Manager {
    fn from(row: ManagerRow) -> Self {
        Manager {
            id: row.id,
            name: row.name,
        }
    }
}
