//! Review Service
//!
//! Reviews, likes and the following feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::services::notification_service::{NotificationEvent, Notifier};
use crate::domain::{
    GameRepository, LikeRepository, NotificationKind, Rating, Review, ReviewDetails,
    ReviewRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};
use crate::shared::snowflake::SnowflakeGenerator;

/// Review service trait
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Review a game; one review per user per game
    async fn create(
        &self,
        user_id: i64,
        game_id: i64,
        dto: CreateReviewDto,
    ) -> Result<ReviewDetails, ReviewError>;

    async fn get(&self, review_id: i64, viewer_id: Option<i64>) -> Result<ReviewDetails, ReviewError>;

    /// Author only
    async fn update(
        &self,
        user_id: i64,
        review_id: i64,
        dto: UpdateReviewDto,
    ) -> Result<ReviewDetails, ReviewError>;

    /// Author only
    async fn delete(&self, user_id: i64, review_id: i64) -> Result<(), ReviewError>;

    async fn list_for_game(
        &self,
        game_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, ReviewError>;

    async fn list_for_user(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, ReviewError>;

    /// Idempotent; returns the like count afterwards
    async fn like(&self, user_id: i64, review_id: i64) -> Result<i64, ReviewError>;

    /// Idempotent; returns the like count afterwards
    async fn unlike(&self, user_id: i64, review_id: i64) -> Result<i64, ReviewError>;

    /// Reviews by followed users, newest first
    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<ReviewDetails>, ReviewError>;
}

#[derive(Debug, Clone)]
pub struct CreateReviewDto {
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReviewDto {
    pub rating: Option<i16>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Review service errors
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Review not found")]
    NotFound,

    #[error("Game not found")]
    GameNotFound,

    #[error("You have already reviewed this game")]
    AlreadyReviewed,

    #[error("Only the author can modify this review")]
    NotAuthor,

    #[error(transparent)]
    InvalidRating(#[from] crate::domain::InvalidRating),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound => AppError::NotFound("Review not found".into()),
            ReviewError::GameNotFound => AppError::NotFound("Game not found".into()),
            ReviewError::AlreadyReviewed => AppError::Conflict(err.to_string()),
            ReviewError::NotAuthor => AppError::Forbidden(err.to_string()),
            ReviewError::InvalidRating(e) => AppError::BadRequest(e.to_string()),
            ReviewError::Repository(e) => e,
        }
    }
}

/// ReviewService implementation
pub struct ReviewServiceImpl {
    review_repo: Arc<dyn ReviewRepository>,
    like_repo: Arc<dyn LikeRepository>,
    game_repo: Arc<dyn GameRepository>,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

impl ReviewServiceImpl {
    pub fn new(
        review_repo: Arc<dyn ReviewRepository>,
        like_repo: Arc<dyn LikeRepository>,
        game_repo: Arc<dyn GameRepository>,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            review_repo,
            like_repo,
            game_repo,
            notifier,
            id_generator,
        }
    }

    async fn find(&self, review_id: i64) -> Result<Review, ReviewError> {
        self.review_repo
            .find_by_id(review_id)
            .await?
            .ok_or(ReviewError::NotFound)
    }

    async fn find_owned(&self, user_id: i64, review_id: i64) -> Result<Review, ReviewError> {
        let review = self.find(review_id).await?;
        if review.user_id != user_id {
            return Err(ReviewError::NotAuthor);
        }
        Ok(review)
    }
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    async fn create(
        &self,
        user_id: i64,
        game_id: i64,
        dto: CreateReviewDto,
    ) -> Result<ReviewDetails, ReviewError> {
        let rating = Rating::new(dto.rating)?;

        if self.game_repo.find_by_id(game_id).await?.is_none() {
            return Err(ReviewError::GameNotFound);
        }

        if self
            .review_repo
            .find_by_user_and_game(user_id, game_id)
            .await?
            .is_some()
        {
            return Err(ReviewError::AlreadyReviewed);
        }

        let now = Utc::now();
        let review = Review {
            id: self.id_generator.generate(),
            user_id,
            game_id,
            rating: rating.value(),
            title: dto.title,
            body: dto.body,
            created_at: now,
            updated_at: now,
        };

        let created = self.review_repo.create(&review).await?;
        tracing::debug!(review_id = created.id, user_id, game_id, "Review created");

        self.get(created.id, Some(user_id)).await
    }

    async fn get(&self, review_id: i64, viewer_id: Option<i64>) -> Result<ReviewDetails, ReviewError> {
        self.review_repo
            .find_details(review_id, viewer_id)
            .await?
            .ok_or(ReviewError::NotFound)
    }

    async fn update(
        &self,
        user_id: i64,
        review_id: i64,
        dto: UpdateReviewDto,
    ) -> Result<ReviewDetails, ReviewError> {
        let mut review = self.find_owned(user_id, review_id).await?;

        if let Some(rating) = dto.rating {
            review.rating = Rating::new(rating)?.value();
        }
        if let Some(title) = dto.title {
            review.title = Some(title).filter(|t| !t.trim().is_empty());
        }
        if let Some(body) = dto.body {
            review.body = body;
        }
        review.updated_at = Utc::now();

        self.review_repo.update(&review).await?;
        self.get(review_id, Some(user_id)).await
    }

    async fn delete(&self, user_id: i64, review_id: i64) -> Result<(), ReviewError> {
        self.find_owned(user_id, review_id).await?;
        self.review_repo.delete(review_id).await?;
        Ok(())
    }

    async fn list_for_game(
        &self,
        game_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, ReviewError> {
        if self.game_repo.find_by_id(game_id).await?.is_none() {
            return Err(ReviewError::GameNotFound);
        }

        Ok(self.review_repo.list_for_game(game_id, viewer_id, page).await?)
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, ReviewError> {
        Ok(self.review_repo.list_for_user(user_id, viewer_id, page).await?)
    }

    async fn like(&self, user_id: i64, review_id: i64) -> Result<i64, ReviewError> {
        let review = self.find(review_id).await?;

        if self.like_repo.like(user_id, review_id).await? {
            self.notifier
                .notify(NotificationEvent {
                    recipient_id: review.user_id,
                    actor_id: user_id,
                    kind: NotificationKind::Like,
                    review_id: Some(review_id),
                    comment_id: None,
                })
                .await;
        }

        Ok(self.like_repo.count(review_id).await?)
    }

    async fn unlike(&self, user_id: i64, review_id: i64) -> Result<i64, ReviewError> {
        self.find(review_id).await?;
        self.like_repo.unlike(user_id, review_id).await?;

        Ok(self.like_repo.count(review_id).await?)
    }

    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<ReviewDetails>, ReviewError> {
        Ok(self.review_repo.feed(user_id, page).await?)
    }
}
