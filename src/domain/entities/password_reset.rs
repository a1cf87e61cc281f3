//! Password reset token entity and repository trait.
//!
//! Maps to the `password_reset_tokens` table. The table has a UNIQUE
//! constraint on `user_id`, so a user owns at most one reset token at a time;
//! issuing a new one replaces the previous row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A stored (hashed) password reset token.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: i64,
    /// SHA-256 hex of the signed token handed to the user
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl PasswordResetToken {
    pub fn new(user_id: i64, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at,
            created_at: Utc::now(),
            used_at: None,
        }
    }

    /// Unused and not yet expired.
    pub fn is_usable(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store a token, replacing whatever token the user had before.
    async fn replace_for_user(
        &self,
        token: &PasswordResetToken,
    ) -> Result<PasswordResetToken, AppError>;

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, AppError>;

    /// Atomically mark the token used and store the owner's new password
    /// hash. Returns `false`, changing nothing, if the token was already
    /// used or expired in the meantime.
    async fn redeem(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError>;

    /// Delete expired and used tokens.
    async fn cleanup_expired(&self) -> Result<u64, AppError>;
}
