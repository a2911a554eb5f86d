//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use naranja_auth::{AccessPolicy, Permission};
use naranja_core::error::AppError;
use naranja_core::types::UserId;
use naranja_entity::user::{AccessLevel, User};

/// Context for the current authenticated request.
///
/// Built by the API layer from the verified token and passed into every
/// service method that acts on behalf of a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The caller's user ID.
    pub user_id: UserId,
    /// The caller's identity provider subject.
    pub auth_subject: String,
    /// The caller's access level at request time.
    pub access_level: AccessLevel,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for a request made by `user`.
    pub fn for_user(user: &User, ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            user_id: user.id,
            auth_subject: user.auth_subject.clone(),
            access_level: user.access_level,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Context for the operator CLI, which runs with full access.
    pub fn operator() -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            auth_subject: "operator".to_string(),
            access_level: AccessLevel::SuperAdmin,
            ip_address: "127.0.0.1".to_string(),
            user_agent: None,
            request_time: Utc::now(),
        }
    }

    /// Fail with `Authorization` unless the caller holds `permission`.
    pub fn require(&self, policy: &AccessPolicy, permission: Permission) -> Result<(), AppError> {
        policy.require(self.access_level, permission)
    }
}
