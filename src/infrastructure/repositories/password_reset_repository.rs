//! Password Reset Repository Implementation
//!
//! PostgreSQL implementation of the PasswordResetRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{PasswordResetRepository, PasswordResetToken};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ResetTokenRow {
    id: Uuid,
    user_id: i64,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl From<ResetTokenRow> for PasswordResetToken {
    fn from(row: ResetTokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
            used_at: row.used_at,
        }
    }
}

/// PostgreSQL password reset token repository.
#[derive(Clone)]
pub struct PgPasswordResetRepository {
    pool: PgPool,
}

impl PgPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for PgPasswordResetRepository {
    async fn replace_for_user(
        &self,
        token: &PasswordResetToken,
    ) -> Result<PasswordResetToken, AppError> {
        // UNIQUE(user_id) keeps a single row per user; the upsert invalidates
        // whatever token was issued before
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET id = EXCLUDED.id,
                token_hash = EXCLUDED.token_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at,
                used_at = NULL
            RETURNING id, user_id, token_hash, expires_at, created_at, used_at
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            SELECT id, user_id, token_hash, expires_at, created_at, used_at
            FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn redeem(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE password_reset_tokens
            SET used_at = NOW()
            WHERE id = $1 AND used_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            return Ok(false);
        };

        let updated = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM password_reset_tokens WHERE expires_at < NOW() OR used_at IS NOT NULL",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
