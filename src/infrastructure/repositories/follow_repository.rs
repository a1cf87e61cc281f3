//! Follow Repository Implementation
//!
//! PostgreSQL implementation of the FollowRepository trait.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{FollowRepository, UserSummary};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[derive(Debug, sqlx::FromRow)]
struct UserSummaryRow {
    id: i64,
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl From<UserSummaryRow> for UserSummary {
    fn from(row: UserSummaryRow) -> Self {
        UserSummary {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
        }
    }
}

/// PostgreSQL follow repository implementation.
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Users on the `join_on` side of edges whose `match_on` column is `user_id`
    async fn neighbours(
        &self,
        user_id: i64,
        match_on: &str,
        join_on: &str,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, AppError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(&format!(
            r#"
            SELECT u.id, u.username, u.display_name, u.avatar_url
            FROM follows f
            JOIN users u ON u.id = f.{join_on}
            WHERE f.{match_on} = $1
            ORDER BY f.created_at DESC, u.id DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM follows WHERE {match_on} = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower_id)
                .bind(followee_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn followers(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, AppError> {
        self.neighbours(user_id, "followee_id", "follower_id", page)
            .await
    }

    async fn following(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, AppError> {
        self.neighbours(user_id, "follower_id", "followee_id", page)
            .await
    }
}
