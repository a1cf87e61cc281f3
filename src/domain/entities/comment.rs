//! Review comment entity and repository trait.
//!
//! Maps to the `review_comments` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its author.
#[derive(Debug, Clone, Serialize)]
pub struct CommentDetails {
    pub comment: Comment,
    pub author: UserSummary,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;

    /// Comments on a review, oldest first.
    async fn list_for_review(
        &self,
        review_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentDetails>, AppError>;

    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;

    async fn update_body(&self, id: i64, body: &str) -> Result<Comment, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
