//! Role curriculum repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use naranja_core::result::AppResult;
use naranja_core::types::RoleId;
use naranja_entity::requirement::{ItemKey, RequiredItem};

use crate::error::classify;
use crate::store::RequirementStore;

/// Repository for `role_required_items`.
#[derive(Debug, Clone)]
pub struct RequirementRepository {
    pool: PgPool,
}

impl RequirementRepository {
    /// Create a new requirement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequirementStore for RequirementRepository {
    async fn items_for_role(&self, role_id: RoleId) -> AppResult<Vec<RequiredItem>> {
        sqlx::query_as::<_, RequiredItem>(
            "SELECT * FROM role_required_items WHERE role_id = $1 \
             ORDER BY item_type, item_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Failed to load required items", e))
    }

    async fn items_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RequiredItem>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, RequiredItem>(
            "SELECT * FROM role_required_items WHERE role_id = ANY($1) \
             ORDER BY role_id, item_type, item_id",
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Failed to load required items for roles", e))
    }

    async fn replace_for_role(
        &self,
        role_id: RoleId,
        items: &[ItemKey],
    ) -> AppResult<Vec<RequiredItem>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM role_required_items WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify("Failed to clear required items", e))?;

        for key in items {
            sqlx::query(
                "INSERT INTO role_required_items (role_id, item_id, item_type) \
                 VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(role_id)
            .bind(key.item_id)
            .bind(key.item_type)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify("Failed to insert required item", e))?;
        }

        let stored = sqlx::query_as::<_, RequiredItem>(
            "SELECT * FROM role_required_items WHERE role_id = $1 \
             ORDER BY item_type, item_id",
        )
        .bind(role_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| classify("Failed to reload required items", e))?;

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit curriculum", e))?;

        debug!(role_id = %role_id, items = stored.len(), "Replaced role curriculum");
        Ok(stored)
    }

    async fn add(&self, role_id: RoleId, key: ItemKey) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO role_required_items (role_id, item_id, item_type) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(key.item_id)
        .bind(key.item_type)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Failed to add required item", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, role_id: RoleId, key: ItemKey) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM role_required_items \
             WHERE role_id = $1 AND item_id = $2 AND item_type = $3",
        )
        .bind(role_id)
        .bind(key.item_id)
        .bind(key.item_type)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Failed to remove required item", e))?;

        Ok(result.rows_affected() > 0)
    }
}
