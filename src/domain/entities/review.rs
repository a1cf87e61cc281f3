//! Review entity, likes and repository traits.
//!
//! Maps to the `reviews` and `review_likes` tables. A user reviews a game at
//! most once (UNIQUE(user_id, game_id)) and likes a review at most once
//! (PRIMARY KEY(user_id, review_id)).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

/// A user's rated evaluation of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub game_id: i64,
    /// 1..=10, see [`crate::domain::Rating`]
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review joined with its author, game and social counters.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetails {
    pub review: Review,
    pub author: UserSummary,
    pub game_title: String,
    pub game_slug: String,
    pub like_count: i64,
    pub comment_count: i64,
    /// Whether the requesting user liked this review; `false` for anonymous
    pub liked_by_viewer: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError>;

    async fn find_details(
        &self,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<ReviewDetails>, AppError>;

    async fn find_by_user_and_game(
        &self,
        user_id: i64,
        game_id: i64,
    ) -> Result<Option<Review>, AppError>;

    /// Reviews of a game, newest first.
    async fn list_for_game(
        &self,
        game_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError>;

    /// Reviews written by a user, newest first.
    async fn list_for_user(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError>;

    /// Reviews written by the users `user_id` follows, newest first.
    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<ReviewDetails>, AppError>;

    async fn create(&self, review: &Review) -> Result<Review, AppError>;

    /// Update rating, title and body.
    async fn update(&self, review: &Review) -> Result<Review, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Returns `true` if a new like was recorded.
    async fn like(&self, user_id: i64, review_id: i64) -> Result<bool, AppError>;

    /// Returns `true` if a like was removed.
    async fn unlike(&self, user_id: i64, review_id: i64) -> Result<bool, AppError>;

    async fn count(&self, review_id: i64) -> Result<i64, AppError>;
}
