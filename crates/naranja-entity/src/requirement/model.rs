//! Required item row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use naranja_core::types::{ItemId, RoleId};

use super::item::{ItemKey, ItemType};

/// One obligation mandated by a role. Unique per `(role_id, item_id, item_type)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequiredItem {
    /// The role that mandates the item.
    pub role_id: RoleId,
    /// The module, document, or behaviour.
    pub item_id: ItemId,
    /// Kind of item.
    pub item_type: ItemType,
    /// When the item was added to the role's curriculum.
    pub created_at: DateTime<Utc>,
}

impl RequiredItem {
    /// The obligation key for diffing.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_id, self.item_type)
    }
}
