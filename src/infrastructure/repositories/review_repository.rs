//! Review Repository Implementation
//!
//! PostgreSQL implementations of ReviewRepository and LikeRepository.
//! Review reads join the author and game and count likes and comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{LikeRepository, Review, ReviewDetails, ReviewRepository, UserSummary};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    game_id: i64,
    rating: i16,
    title: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            user_id: row.user_id,
            game_id: row.game_id,
            rating: row.rating,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Review joined with author, game and counters
#[derive(Debug, sqlx::FromRow)]
struct ReviewDetailsRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    author_username: String,
    author_display_name: Option<String>,
    author_avatar_url: Option<String>,
    game_title: String,
    game_slug: String,
    like_count: i64,
    comment_count: i64,
    liked_by_viewer: bool,
}

impl From<ReviewDetailsRow> for ReviewDetails {
    fn from(row: ReviewDetailsRow) -> Self {
        let author = UserSummary {
            id: row.review.user_id,
            username: row.author_username,
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        };

        ReviewDetails {
            review: row.review.into(),
            author,
            game_title: row.game_title,
            game_slug: row.game_slug,
            like_count: row.like_count,
            comment_count: row.comment_count,
            liked_by_viewer: row.liked_by_viewer,
        }
    }
}

const REVIEW_COLUMNS: &str = "id, user_id, game_id, rating, title, body, created_at, updated_at";

/// `$1` is always the viewer (NULL for anonymous requests)
const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.game_id, r.rating, r.title, r.body, r.created_at, r.updated_at,
           u.username AS author_username,
           u.display_name AS author_display_name,
           u.avatar_url AS author_avatar_url,
           g.title AS game_title,
           g.slug AS game_slug,
           (SELECT COUNT(*) FROM review_likes l WHERE l.review_id = r.id) AS like_count,
           (SELECT COUNT(*) FROM review_comments c WHERE c.review_id = r.id) AS comment_count,
           EXISTS(
               SELECT 1 FROM review_likes l WHERE l.review_id = r.id AND l.user_id = $1
           ) AS liked_by_viewer
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    JOIN games g ON g.id = r.game_id
"#;

/// PostgreSQL review repository implementation.
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest-first page of details; `$key` in `condition` binds to `key`
    async fn page_where(
        &self,
        condition: &str,
        key: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError> {
        let rows = sqlx::query_as::<_, ReviewDetailsRow>(&format!(
            "{} WHERE {} ORDER BY r.created_at DESC, r.id DESC LIMIT $3 OFFSET $4",
            DETAILS_SELECT,
            condition.replace("$key", "$2")
        ))
        .bind(viewer_id)
        .bind(key)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM reviews r WHERE {}",
            condition.replace("$key", "$1")
        ))
        .bind(key)
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
impl ReviewRepository for PgReviewRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_details(
        &self,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<ReviewDetails>, AppError> {
        let row = sqlx::query_as::<_, ReviewDetailsRow>(&format!(
            "{} WHERE r.id = $2",
            DETAILS_SELECT
        ))
        .bind(viewer_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_user_and_game(
        &self,
        user_id: i64,
        game_id: i64,
    ) -> Result<Option<Review>, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {} FROM reviews WHERE user_id = $1 AND game_id = $2",
            REVIEW_COLUMNS
        ))
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_game(
        &self,
        game_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError> {
        self.page_where("r.game_id = $key", game_id, viewer_id, page)
            .await
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError> {
        self.page_where("r.user_id = $key", user_id, viewer_id, page)
            .await
    }

    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<ReviewDetails>, AppError> {
        self.page_where(
            "r.user_id IN (SELECT followee_id FROM follows WHERE follower_id = $key)",
            user_id,
            Some(user_id),
            page,
        )
        .await
    }

    async fn create(&self, review: &Review) -> Result<Review, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"
            INSERT INTO reviews (id, user_id, game_id, rating, title, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.game_id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.body)
        .bind(review.created_at)
        .bind(review.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, review: &Review) -> Result<Review, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"
            UPDATE reviews
            SET rating = $2, title = $3, body = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.body)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Review not found".into()));
        }

        Ok(())
    }
}

/// PostgreSQL review like repository implementation.
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn like(&self, user_id: i64, review_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO review_likes (user_id, review_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, review_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(review_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn unlike(&self, user_id: i64, review_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM review_likes WHERE user_id = $1 AND review_id = $2")
            .bind(user_id)
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count(&self, review_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM review_likes WHERE review_id = $1",
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
