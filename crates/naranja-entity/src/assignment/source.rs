//! Assignment provenance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an assignment row came from.
///
/// Only `Role` rows are ever created or removed by synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    /// Derived from the user's role by the synchronizer.
    Role,
    /// Assigned by hand by an administrator or trainer.
    Manual,
}

impl AssignmentSource {
    /// Return the source as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
