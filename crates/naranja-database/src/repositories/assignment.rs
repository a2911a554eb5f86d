//! Assignment repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use naranja_core::result::AppResult;
use naranja_core::types::{AssignmentId, UserId};
use naranja_entity::assignment::{NewAssignment, UserAssignment};
use naranja_entity::requirement::{ItemKey, RequiredItem};
use naranja_entity::role::Role;
use naranja_entity::user::User;

use crate::error::classify;
use crate::store::{AssignmentStore, SyncView};

/// Repository for `user_assignments`.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn load_sync_view(&self, user_id: UserId) -> AppResult<Option<SyncView>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to begin snapshot", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| classify("Failed to set snapshot isolation", e))?;

        let Some(user) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| classify("Failed to load user", e))?
        else {
            return Ok(None);
        };

        let (role, required) = match user.role_id {
            Some(role_id) => {
                let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
                    .bind(role_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| classify("Failed to load role", e))?;
                let required = sqlx::query_as::<_, RequiredItem>(
                    "SELECT * FROM role_required_items WHERE role_id = $1 \
                     ORDER BY item_type, item_id",
                )
                .bind(role_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| classify("Failed to load required items", e))?;
                (role, required)
            }
            None => (None, Vec::new()),
        };

        let assignments = sqlx::query_as::<_, UserAssignment>(
            "SELECT * FROM user_assignments WHERE user_id = $1 ORDER BY item_type, item_id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| classify("Failed to load assignments", e))?;

        tx.commit()
            .await
            .map_err(|e| classify("Failed to close snapshot", e))?;

        Ok(Some(SyncView {
            user,
            role,
            required,
            assignments,
        }))
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserAssignment>> {
        sqlx::query_as::<_, UserAssignment>(
            "SELECT * FROM user_assignments WHERE user_id = $1 ORDER BY item_type, item_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Failed to list assignments", e))
    }

    async fn insert_missing(&self, rows: &[NewAssignment]) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to begin transaction", e))?;

        let mut inserted = 0;
        for row in rows {
            let result = sqlx::query(
                "INSERT INTO user_assignments \
                 (id, user_id, item_id, item_type, source, source_role_id) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT ON CONSTRAINT user_assignments_user_item_key DO NOTHING",
            )
            .bind(AssignmentId::new())
            .bind(row.user_id)
            .bind(row.key.item_id)
            .bind(row.key.item_type)
            .bind(row.source)
            .bind(row.source_role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify("Failed to insert assignment", e))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit assignments", e))?;

        Ok(inserted)
    }

    async fn remove_role_derived(
        &self,
        user_id: UserId,
        keys: &[ItemKey],
        include_completed: bool,
    ) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Failed to begin transaction", e))?;

        let mut removed = 0;
        for key in keys {
            let result = sqlx::query(
                "DELETE FROM user_assignments \
                 WHERE user_id = $1 AND item_id = $2 AND item_type = $3 \
                 AND source = 'role' AND ($4 OR completed_at IS NULL)",
            )
            .bind(user_id)
            .bind(key.item_id)
            .bind(key.item_type)
            .bind(include_completed)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify("Failed to remove assignment", e))?;
            removed += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit removals", e))?;

        Ok(removed)
    }
}
