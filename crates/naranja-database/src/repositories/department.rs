//! Department repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::DepartmentId;
use naranja_entity::department::{Department, NewDepartment};

use crate::error::classify;
use crate::store::DepartmentStore;

/// Repository for the department tree.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentStore for DepartmentRepository {
    async fn find_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Failed to find department", e))
    }

    async fn create(&self, data: NewDepartment) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (id, name, parent_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(DepartmentId::new())
        .bind(&data.name)
        .bind(data.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Failed to create department", e))
    }

    async fn find_all(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Failed to list departments", e))
    }

    async fn set_parent(
        &self,
        id: DepartmentId,
        parent_id: Option<DepartmentId>,
    ) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "UPDATE departments SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify("Failed to move department", e))?
        .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))
    }
}
