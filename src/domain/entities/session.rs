//! User Session entity and repository trait.
//!
//! Maps to the `user_sessions` table in the database schema.
//! One row per refresh token; the raw token never touches the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a login session backing one refresh token.
///
/// Maps to the `user_sessions` table:
/// - id: UUID PRIMARY KEY
/// - user_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - refresh_token_hash: VARCHAR(64) NOT NULL UNIQUE (SHA-256 hex)
/// - user_agent: TEXT NULL
/// - ip_address: VARCHAR(45) NULL
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at / last_used_at: TIMESTAMPTZ NOT NULL
/// - revoked_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,

    /// SHA-256 hash of the refresh token
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session.
    pub fn new(user_id: i64, refresh_token_hash: String, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            refresh_token_hash,
            user_agent: None,
            ip_address: None,
            expires_at,
            created_at: now,
            last_used_at: now,
            revoked_at: None,
        }
    }

    /// Attach client metadata captured at login.
    pub fn with_client(mut self, user_agent: Option<String>, ip_address: Option<String>) -> Self {
        self.user_agent = user_agent;
        self.ip_address = ip_address;
        self
    }

    /// Check if the session is currently active (not expired, not revoked).
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by its UUID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, AppError>;

    /// Find a non-revoked session by refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// All active sessions of a user, most recently used first.
    async fn find_active_by_user(&self, user_id: i64) -> Result<Vec<Session>, AppError>;

    /// Create a new session.
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Swap the refresh token hash, but only if `old_hash` is still current.
    ///
    /// Returns `false` when another request already rotated or revoked the
    /// session, which makes each refresh token usable exactly once.
    async fn rotate(
        &self,
        id: Uuid,
        old_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Revoke a session (set revoked_at).
    async fn revoke(&self, id: Uuid) -> Result<(), AppError>;

    /// Revoke all sessions for a user, optionally keeping one.
    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        except_session_id: Option<Uuid>,
    ) -> Result<u64, AppError>;

    /// Delete expired and long-revoked sessions.
    async fn cleanup_expired(&self) -> Result<u64, AppError>;
}
