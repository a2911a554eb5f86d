//! User assignment row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use naranja_core::types::{AssignmentId, ItemId, RoleId, UserId};

use super::source::AssignmentSource;
use crate::requirement::{ItemKey, ItemType};

/// What a specific user must do, and whether they have done it.
///
/// At most one row exists per `(user_id, item_id, item_type)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAssignment {
    /// Unique assignment identifier.
    pub id: AssignmentId,
    /// The assignee.
    pub user_id: UserId,
    /// The module, document, or behaviour.
    pub item_id: ItemId,
    /// Kind of item.
    pub item_type: ItemType,
    /// Provenance.
    pub source: AssignmentSource,
    /// Role that caused a role-derived row.
    pub source_role_id: Option<RoleId>,
    /// When the row was created.
    pub assigned_at: DateTime<Utc>,
    /// When the user completed or acknowledged the item.
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserAssignment {
    /// The obligation key for diffing.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_id, self.item_type)
    }

    /// Whether the item has been completed.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether the synchronizer owns this row.
    pub fn is_role_derived(&self) -> bool {
        self.source == AssignmentSource::Role
    }
}

/// Data required to create an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
    /// The assignee.
    pub user_id: UserId,
    /// The obligation.
    pub key: ItemKey,
    /// Provenance.
    pub source: AssignmentSource,
    /// Role that caused a role-derived row.
    pub source_role_id: Option<RoleId>,
}

impl NewAssignment {
    /// A role-derived assignment, not yet completed.
    pub fn from_role(user_id: UserId, role_id: RoleId, key: ItemKey) -> Self {
        Self {
            user_id,
            key,
            source: AssignmentSource::Role,
            source_role_id: Some(role_id),
        }
    }

    /// A manually provisioned assignment.
    pub fn manual(user_id: UserId, key: ItemKey) -> Self {
        Self {
            user_id,
            key,
            source: AssignmentSource::Manual,
            source_role_id: None,
        }
    }
}
