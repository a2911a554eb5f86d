//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use naranja_core::result::AppResult;
use naranja_core::types::{RoleId, UserId};
use naranja_entity::user::{NewUser, User};

use crate::error::classify;
use crate::store::UserStore;

/// Repository for user queries.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Failed to find user by id", e))
    }

    async fn find_by_auth_subject(&self, subject: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE auth_subject = $1")
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Failed to find user by auth subject", e))
    }

    async fn create(&self, data: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, auth_subject, full_name, email, role_id, department_id, \
             location, access_level) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(UserId::new())
        .bind(&data.auth_subject)
        .bind(&data.full_name)
        .bind(&data.email)
        .bind(data.role_id)
        .bind(data.department_id)
        .bind(&data.location)
        .bind(data.access_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Failed to create user", e))
    }

    async fn list_ids_by_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE role_id = $1 ORDER BY id")
            .bind(role_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Failed to list users by role", e))
    }
}
