//! Department entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use naranja_core::types::DepartmentId;

/// A node in the department tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: DepartmentId,
    /// Department name.
    pub name: String,
    /// Parent department (None for top-level departments).
    pub parent_id: Option<DepartmentId>,
    /// When the department was created.
    pub created_at: DateTime<Utc>,
    /// When the department was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Department {
    /// Check if this is a top-level department.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDepartment {
    /// Department name.
    pub name: String,
    /// Parent department.
    pub parent_id: Option<DepartmentId>,
}
