//! Department creation and re-parenting with cycle protection.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use naranja_auth::{AccessPolicy, Permission};
use naranja_core::config::SyncConfig;
use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::DepartmentId;
use naranja_database::DepartmentStore;
use naranja_entity::department::{Department, NewDepartment, ancestors_of, would_create_cycle};

use crate::context::RequestContext;
use crate::retry::with_retry;

/// Maximum department name length.
const MAX_NAME_LEN: usize = 200;

/// Manages the department tree.
#[derive(Clone)]
pub struct DepartmentService {
    departments: Arc<dyn DepartmentStore>,
    policy: Arc<AccessPolicy>,
    config: SyncConfig,
}

impl std::fmt::Debug for DepartmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepartmentService").finish_non_exhaustive()
    }
}

impl DepartmentService {
    /// Creates a new department service.
    pub fn new(
        departments: Arc<dyn DepartmentStore>,
        policy: Arc<AccessPolicy>,
        config: SyncConfig,
    ) -> Self {
        Self {
            departments,
            policy,
            config,
        }
    }

    /// Create a department under `parent_id`, or at the top level.
    pub async fn create_department(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> AppResult<Department> {
        ctx.require(&self.policy, Permission::DepartmentsManage)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Department name cannot be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(AppError::validation(format!(
                "Department name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if let Some(parent) = parent_id {
            self.get(parent).await?;
        }

        let department = self
            .departments
            .create(NewDepartment {
                name: name.to_string(),
                parent_id,
            })
            .await?;

        info!(
            department_id = %department.id,
            parent_id = ?parent_id,
            created_by = %ctx.user_id,
            "Department created"
        );
        Ok(department)
    }

    /// Move a department under `new_parent_id`, or to the top level.
    ///
    /// Rejects any move that would make the department its own ancestor.
    pub async fn move_department(
        &self,
        ctx: &RequestContext,
        department_id: DepartmentId,
        new_parent_id: Option<DepartmentId>,
    ) -> AppResult<Department> {
        ctx.require(&self.policy, Permission::DepartmentsManage)?;
        self.get(department_id).await?;

        if let Some(parent) = new_parent_id {
            self.get(parent).await?;
            let parents = self.parent_map().await?;
            if would_create_cycle(department_id, parent, |id| {
                parents.get(&id).copied().flatten()
            }) {
                return Err(AppError::validation(format!(
                    "Moving department {department_id} under {parent} would create a cycle"
                )));
            }
        }

        let moved = self
            .departments
            .set_parent(department_id, new_parent_id)
            .await?;

        info!(
            department_id = %department_id,
            parent_id = ?new_parent_id,
            moved_by = %ctx.user_id,
            "Department moved"
        );
        Ok(moved)
    }

    /// Parent chain of a department, nearest first.
    pub async fn ancestors(&self, department_id: DepartmentId) -> AppResult<Vec<Department>> {
        self.get(department_id).await?;
        let all = with_retry(&self.config, "load_departments", || {
            self.departments.find_all()
        })
        .await?;
        let by_id: HashMap<DepartmentId, Department> =
            all.into_iter().map(|d| (d.id, d)).collect();

        Ok(ancestors_of(department_id, |id| {
            by_id.get(&id).and_then(|d| d.parent_id)
        })
        .into_iter()
        .filter_map(|id| by_id.get(&id).cloned())
        .collect())
    }

    async fn get(&self, department_id: DepartmentId) -> AppResult<Department> {
        with_retry(&self.config, "load_department", || {
            self.departments.find_by_id(department_id)
        })
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {department_id} not found")))
    }

    async fn parent_map(&self) -> AppResult<HashMap<DepartmentId, Option<DepartmentId>>> {
        let all = with_retry(&self.config, "load_departments", || {
            self.departments.find_all()
        })
        .await?;
        Ok(all.into_iter().map(|d| (d.id, d.parent_id)).collect())
    }
}
