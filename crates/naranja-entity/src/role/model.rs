//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use naranja_core::types::{DepartmentId, RoleId};

/// A job profile whose holders share a set of required items.
///
/// A role belongs to at most one department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Job title.
    pub title: String,
    /// Owning department.
    pub department_id: Option<DepartmentId>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    /// Job title.
    pub title: String,
    /// Owning department.
    pub department_id: Option<DepartmentId>,
}
