//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use naranja_core::types::{DepartmentId, RoleId, UserId};

use super::access_level::AccessLevel;

/// A member of staff registered in Naranja.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Subject identifier issued by the hosted identity provider.
    pub auth_subject: String,
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Current role (job profile).
    pub role_id: Option<RoleId>,
    /// Current department.
    pub department_id: Option<DepartmentId>,
    /// Site or office.
    pub location: Option<String>,
    /// Authorization tier.
    pub access_level: AccessLevel,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Identity provider subject.
    pub auth_subject: String,
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Initial role.
    pub role_id: Option<RoleId>,
    /// Initial department.
    pub department_id: Option<DepartmentId>,
    /// Site or office.
    pub location: Option<String>,
    /// Authorization tier.
    pub access_level: AccessLevel,
}
