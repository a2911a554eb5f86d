//! Route guard table for the admin UI.

use naranja_entity::user::AccessLevel;

/// A protected route and the exact levels allowed to open it.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    /// Route path, without trailing slash.
    pub path: &'static str,
    /// Levels allowed; membership is exact.
    pub allowed: &'static [AccessLevel],
}

use AccessLevel::*;

const EVERYONE: &[AccessLevel] = &AccessLevel::ALL;

/// Every protected route. Routes not listed here are denied.
pub const ROUTE_GUARDS: &[RouteGuard] = &[
    RouteGuard {
        path: "/dashboard",
        allowed: EVERYONE,
    },
    RouteGuard {
        path: "/training",
        allowed: EVERYONE,
    },
    RouteGuard {
        path: "/documents",
        allowed: EVERYONE,
    },
    RouteGuard {
        path: "/behaviours",
        allowed: EVERYONE,
    },
    RouteGuard {
        path: "/incidents",
        allowed: EVERYONE,
    },
    RouteGuard {
        path: "/admin/users",
        allowed: &[SuperAdmin, Admin, HrAdmin],
    },
    RouteGuard {
        path: "/admin/roles",
        allowed: &[SuperAdmin, Admin, HrAdmin],
    },
    RouteGuard {
        path: "/admin/departments",
        allowed: &[SuperAdmin, Admin, HrAdmin],
    },
    RouteGuard {
        path: "/admin/training",
        allowed: &[SuperAdmin, Admin, HrAdmin, Trainer],
    },
    RouteGuard {
        path: "/admin/documents",
        allowed: &[SuperAdmin, Admin, HrAdmin, HsAdmin],
    },
    RouteGuard {
        path: "/admin/incidents",
        allowed: &[SuperAdmin, Admin, HsAdmin],
    },
    RouteGuard {
        path: "/team",
        allowed: &[SuperAdmin, Admin, DeptManager, Manager],
    },
    RouteGuard {
        path: "/reports",
        allowed: &[SuperAdmin, Admin, HrAdmin, HsAdmin, DeptManager, Manager],
    },
    RouteGuard {
        path: "/audit",
        allowed: &[SuperAdmin, Admin],
    },
    RouteGuard {
        path: "/tenants",
        allowed: &[SuperAdmin],
    },
];

/// Find the guard for `path`, ignoring case and a trailing slash.
pub fn guard_for(path: &str) -> Option<&'static RouteGuard> {
    let trimmed = path.trim();
    let normalized = if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    };
    ROUTE_GUARDS
        .iter()
        .find(|g| g.path.eq_ignore_ascii_case(normalized))
}
