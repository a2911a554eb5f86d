//! Role repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use naranja_core::result::AppResult;
use naranja_core::types::{DepartmentId, RoleId};
use naranja_entity::role::{NewRole, Role};

use crate::error::classify;
use crate::store::RoleStore;

/// Repository for role queries.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Failed to find role", e))
    }

    async fn create(&self, data: NewRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, title, department_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(RoleId::new())
        .bind(&data.title)
        .bind(data.department_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Failed to create role", e))
    }

    async fn find_by_department(&self, department_id: DepartmentId) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE department_id = $1 ORDER BY title, id",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Failed to list roles by department", e))
    }
}
