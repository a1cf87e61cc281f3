//! Comment Service
//!
//! Comments on reviews.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::services::notification_service::{NotificationEvent, Notifier};
use crate::domain::{
    Comment, CommentDetails, CommentRepository, NotificationKind, ReviewRepository,
    UserRepository, UserSummary,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};
use crate::shared::snowflake::SnowflakeGenerator;

/// Comment service trait
#[async_trait]
pub trait CommentService: Send + Sync {
    async fn create(
        &self,
        user_id: i64,
        review_id: i64,
        body: String,
    ) -> Result<CommentDetails, CommentError>;

    /// Oldest first
    async fn list(
        &self,
        review_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentDetails>, CommentError>;

    /// Author only
    async fn update(
        &self,
        user_id: i64,
        comment_id: i64,
        body: String,
    ) -> Result<CommentDetails, CommentError>;

    /// Comment author or the author of the review it is on
    async fn delete(&self, user_id: i64, comment_id: i64) -> Result<(), CommentError>;
}

/// Comment service errors
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Comment not found")]
    NotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("You cannot modify this comment")]
    Forbidden,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CommentError> for AppError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::NotFound => AppError::NotFound("Comment not found".into()),
            CommentError::ReviewNotFound => AppError::NotFound("Review not found".into()),
            CommentError::Forbidden => AppError::Forbidden(err.to_string()),
            CommentError::Repository(e) => e,
        }
    }
}

/// CommentService implementation
pub struct CommentServiceImpl {
    comment_repo: Arc<dyn CommentRepository>,
    review_repo: Arc<dyn ReviewRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifier: Notifier,
    id_generator: Arc<SnowflakeGenerator>,
}

impl CommentServiceImpl {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifier: Notifier,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            comment_repo,
            review_repo,
            user_repo,
            notifier,
            id_generator,
        }
    }

    async fn with_author(&self, comment: Comment) -> Result<CommentDetails, CommentError> {
        let author = self
            .user_repo
            .find_by_id(comment.user_id)
            .await?
            .map(|u| UserSummary::from(&u))
            .ok_or_else(|| AppError::Internal("Comment author vanished".into()))?;

        Ok(CommentDetails { comment, author })
    }

    async fn find(&self, comment_id: i64) -> Result<Comment, CommentError> {
        self.comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or(CommentError::NotFound)
    }
}

#[async_trait]
impl CommentService for CommentServiceImpl {
    async fn create(
        &self,
        user_id: i64,
        review_id: i64,
        body: String,
    ) -> Result<CommentDetails, CommentError> {
        let review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or(CommentError::ReviewNotFound)?;

        let now = Utc::now();
        let comment = Comment {
            id: self.id_generator.generate(),
            review_id,
            user_id,
            body,
            created_at: now,
            updated_at: now,
        };

        let created = self.comment_repo.create(&comment).await?;

        self.notifier
            .notify(NotificationEvent {
                recipient_id: review.user_id,
                actor_id: user_id,
                kind: NotificationKind::Comment,
                review_id: Some(review_id),
                comment_id: Some(created.id),
            })
            .await;

        self.with_author(created).await
    }

    async fn list(
        &self,
        review_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentDetails>, CommentError> {
        if self.review_repo.find_by_id(review_id).await?.is_none() {
            return Err(CommentError::ReviewNotFound);
        }

        Ok(self.comment_repo.list_for_review(review_id, page).await?)
    }

    async fn update(
        &self,
        user_id: i64,
        comment_id: i64,
        body: String,
    ) -> Result<CommentDetails, CommentError> {
        let comment = self.find(comment_id).await?;
        if comment.user_id != user_id {
            return Err(CommentError::Forbidden);
        }

        let updated = self.comment_repo.update_body(comment_id, &body).await?;
        self.with_author(updated).await
    }

    async fn delete(&self, user_id: i64, comment_id: i64) -> Result<(), CommentError> {
        let comment = self.find(comment_id).await?;

        if comment.user_id != user_id {
            let review_author = self
                .review_repo
                .find_by_id(comment.review_id)
                .await?
                .map(|r| r.user_id);

            if review_author != Some(user_id) {
                return Err(CommentError::Forbidden);
            }
        }

        self.comment_repo.delete(comment_id).await?;
        Ok(())
    }
}
