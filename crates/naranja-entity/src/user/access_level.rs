//! Access level enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization tier assigned to a user.
///
/// The variants are declared in the order the admin UI lists them. That order
/// is presentational only: authorization never compares levels, it checks
/// exact membership in an allowed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "access_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Platform owner across all tenants.
    SuperAdmin,
    /// Tenant administrator.
    Admin,
    /// Human resources administrator.
    HrAdmin,
    /// Health & safety administrator.
    HsAdmin,
    /// Manager of a whole department.
    DeptManager,
    /// Line manager.
    Manager,
    /// Delivers and signs off training.
    Trainer,
    /// Regular staff member.
    User,
}

impl AccessLevel {
    /// Every level, in display order.
    pub const ALL: [AccessLevel; 8] = [
        Self::SuperAdmin,
        Self::Admin,
        Self::HrAdmin,
        Self::HsAdmin,
        Self::DeptManager,
        Self::Manager,
        Self::Trainer,
        Self::User,
    ];

    /// Storage name, as used in the database enum and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::HrAdmin => "hr_admin",
            Self::HsAdmin => "hs_admin",
            Self::DeptManager => "dept_manager",
            Self::Manager => "manager",
            Self::Trainer => "trainer",
            Self::User => "user",
        }
    }

    /// Name shown in the admin UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::HrAdmin => "HR Admin",
            Self::HsAdmin => "H&S Admin",
            Self::DeptManager => "Dept. Manager",
            Self::Manager => "Manager",
            Self::Trainer => "Trainer",
            Self::User => "User",
        }
    }
}

/// Fold a display or storage name into the storage form.
///
/// `"H&S Admin"` becomes `"hs_admin"`, `"Dept. Manager"` becomes
/// `"dept_manager"`.
fn normalize(s: &str) -> String {
    let folded: String = s
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '&' | '.'))
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    folded
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AccessLevel {
    type Err = naranja_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "hr_admin" => Ok(Self::HrAdmin),
            "hs_admin" => Ok(Self::HsAdmin),
            "dept_manager" | "department_manager" => Ok(Self::DeptManager),
            "manager" => Ok(Self::Manager),
            "trainer" => Ok(Self::Trainer),
            "user" => Ok(Self::User),
            _ => Err(naranja_core::AppError::validation(format!(
                "Invalid access level: '{s}'"
            ))),
        }
    }
}
