//! Follow relationship and repository trait.
//!
//! Maps to the `follows` table: PRIMARY KEY(follower_id, followee_id) with a
//! CHECK that nobody follows themselves.

use async_trait::async_trait;

use super::user::UserSummary;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns `true` if the relationship is new.
    async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Returns `true` if a relationship was removed.
    async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Users following `user_id`, most recent first.
    async fn followers(&self, user_id: i64, page: PageRequest)
        -> Result<Page<UserSummary>, AppError>;

    /// Users `user_id` follows, most recent first.
    async fn following(&self, user_id: i64, page: PageRequest)
        -> Result<Page<UserSummary>, AppError>;
}
