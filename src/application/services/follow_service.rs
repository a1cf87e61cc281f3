//! Follow Service
//!
//! The directed follow graph between users.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::notification_service::{NotificationEvent, Notifier};
use crate::domain::{FollowRepository, NotificationKind, User, UserRepository, UserSummary};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

/// Follow service trait
#[async_trait]
pub trait FollowService: Send + Sync {
    /// Follow `username`; following twice is a no-op
    async fn follow(&self, follower_id: i64, username: &str) -> Result<(), FollowError>;

    /// Unfollow `username`; unfollowing a stranger is a no-op
    async fn unfollow(&self, follower_id: i64, username: &str) -> Result<(), FollowError>;

    async fn followers(
        &self,
        username: &str,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, FollowError>;

    async fn following(
        &self,
        username: &str,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, FollowError>;
}

/// Follow service errors
#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    #[error("User not found")]
    UserNotFound,

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<FollowError> for AppError {
    fn from(err: FollowError) -> Self {
        match err {
            FollowError::UserNotFound => AppError::NotFound("User not found".into()),
            FollowError::SelfFollow => AppError::BadRequest(err.to_string()),
            FollowError::Repository(e) => e,
        }
    }
}

/// FollowService implementation
pub struct FollowServiceImpl {
    follow_repo: Arc<dyn FollowRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifier: Notifier,
}

impl FollowServiceImpl {
    pub fn new(
        follow_repo: Arc<dyn FollowRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifier: Notifier,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            notifier,
        }
    }

    async fn resolve(&self, username: &str) -> Result<User, FollowError> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or(FollowError::UserNotFound)
    }
}

#[async_trait]
impl FollowService for FollowServiceImpl {
    async fn follow(&self, follower_id: i64, username: &str) -> Result<(), FollowError> {
        let followee = self.resolve(username).await?;
        if followee.id == follower_id {
            return Err(FollowError::SelfFollow);
        }

        if self.follow_repo.follow(follower_id, followee.id).await? {
            self.notifier
                .notify(NotificationEvent {
                    recipient_id: followee.id,
                    actor_id: follower_id,
                    kind: NotificationKind::Follow,
                    review_id: None,
                    comment_id: None,
                })
                .await;
        }

        Ok(())
    }

    async fn unfollow(&self, follower_id: i64, username: &str) -> Result<(), FollowError> {
        let followee = self.resolve(username).await?;
        self.follow_repo.unfollow(follower_id, followee.id).await?;
        Ok(())
    }

    async fn followers(
        &self,
        username: &str,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, FollowError> {
        let user = self.resolve(username).await?;
        Ok(self.follow_repo.followers(user.id, page).await?)
    }

    async fn following(
        &self,
        username: &str,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, FollowError> {
        let user = self.resolve(username).await?;
        Ok(self.follow_repo.following(user.id, page).await?)
    }
}
