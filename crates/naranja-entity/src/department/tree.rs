//! Walks over the department parent chain.
//!
//! The helpers take a parent lookup rather than a store so the same checks
//! run against a database snapshot or an in-memory map.

use std::collections::HashSet;

use naranja_core::types::DepartmentId;

/// Parent chain of `start`, nearest first, excluding `start` itself.
///
/// Stops early if the stored data already contains a cycle, so the result
/// is always finite.
pub fn ancestors_of<F>(start: DepartmentId, parent_of: F) -> Vec<DepartmentId>
where
    F: Fn(DepartmentId) -> Option<DepartmentId>,
{
    let mut chain = Vec::new();
    let mut seen = HashSet::from([start]);
    let mut current = parent_of(start);

    while let Some(id) = current {
        if !seen.insert(id) {
            break;
        }
        chain.push(id);
        current = parent_of(id);
    }

    chain
}

/// Whether giving `department` the parent `new_parent` would make it its
/// own ancestor.
pub fn would_create_cycle<F>(department: DepartmentId, new_parent: DepartmentId, parent_of: F) -> bool
where
    F: Fn(DepartmentId) -> Option<DepartmentId>,
{
    if department == new_parent {
        return true;
    }
    ancestors_of(new_parent, parent_of).contains(&department)
}
