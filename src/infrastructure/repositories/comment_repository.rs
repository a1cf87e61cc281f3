//! Comment Repository Implementation
//!
//! PostgreSQL implementation of the CommentRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Comment, CommentDetails, CommentRepository, UserSummary};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    review_id: i64,
    user_id: i64,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            review_id: row.review_id,
            user_id: row.user_id,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentDetailsRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_username: String,
    author_display_name: Option<String>,
    author_avatar_url: Option<String>,
}

impl From<CommentDetailsRow> for CommentDetails {
    fn from(row: CommentDetailsRow) -> Self {
        CommentDetails {
            author: UserSummary {
                id: row.comment.user_id,
                username: row.author_username,
                display_name: row.author_display_name,
                avatar_url: row.author_avatar_url,
            },
            comment: row.comment.into(),
        }
    }
}

const COMMENT_COLUMNS: &str = "id, review_id, user_id, body, created_at, updated_at";

/// PostgreSQL comment repository implementation.
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {} FROM review_comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_review(
        &self,
        review_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentDetails>, AppError> {
        let rows = sqlx::query_as::<_, CommentDetailsRow>(
            r#"
            SELECT c.id, c.review_id, c.user_id, c.body, c.created_at, c.updated_at,
                   u.username AS author_username,
                   u.display_name AS author_display_name,
                   u.avatar_url AS author_avatar_url
            FROM review_comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.review_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(review_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM review_comments WHERE review_id = $1",
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO review_comments (id, review_id, user_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(comment.id)
        .bind(comment.review_id)
        .bind(comment.user_id)
        .bind(&comment.body)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_body(&self, id: i64, body: &str) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "UPDATE review_comments SET body = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM review_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Comment not found".into()));
        }

        Ok(())
    }
}
