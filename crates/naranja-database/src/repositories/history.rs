//! Role change history repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::{HistoryEntryId, PageRequest, PageResponse, UserId};
use naranja_entity::history::{RoleChange, RoleChangeHistoryEntry};

use crate::error::classify;
use crate::store::RoleHistoryStore;

/// Repository for `role_change_history`.
#[derive(Debug, Clone)]
pub struct RoleHistoryRepository {
    pool: PgPool,
}

impl RoleHistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleHistoryStore for RoleHistoryRepository {
    async fn record_transition(&self, change: &RoleChange) -> AppResult<RoleChangeHistoryEntry> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to begin transaction", e))?;

        let updated = sqlx::query(
            "UPDATE users SET role_id = $2, department_id = $3, updated_at = NOW() \
             WHERE id = $1 \
             AND role_id IS NOT DISTINCT FROM $4 \
             AND department_id IS NOT DISTINCT FROM $5",
        )
        .bind(change.user_id)
        .bind(change.to.role_id)
        .bind(change.to.department_id)
        .bind(change.from.role_id)
        .bind(change.from.department_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("Failed to update user placement", e))?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                    .bind(change.user_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| classify("Failed to check user", e))?;
            return Err(if exists {
                AppError::conflict(format!(
                    "User {} is no longer in the expected role/department",
                    change.user_id
                ))
            } else {
                AppError::not_found(format!("User {} not found", change.user_id))
            });
        }

        let entry = sqlx::query_as::<_, RoleChangeHistoryEntry>(
            "INSERT INTO role_change_history \
             (id, user_id, old_role_id, new_role_id, old_department_id, new_department_id, \
              changed_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(HistoryEntryId::new())
        .bind(change.user_id)
        .bind(change.from.role_id)
        .bind(change.to.role_id)
        .bind(change.from.department_id)
        .bind(change.to.department_id)
        .bind(change.changed_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify("Failed to append role history", e))?;

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit role change", e))?;

        info!(
            user_id = %change.user_id,
            history_entry_id = %entry.id,
            "Recorded role change"
        );
        Ok(entry)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RoleChangeHistoryEntry>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM role_change_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| classify("Failed to count role history", e))?;

        let entries = sqlx::query_as::<_, RoleChangeHistoryEntry>(
            "SELECT * FROM role_change_history WHERE user_id = $1 \
             ORDER BY changed_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Failed to list role history", e))?;

        Ok(PageResponse::new(entries, page, total as u64))
    }

    async fn all_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleChangeHistoryEntry>> {
        sqlx::query_as::<_, RoleChangeHistoryEntry>(
            "SELECT * FROM role_change_history WHERE user_id = $1 ORDER BY changed_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Failed to load role history", e))
    }
}
