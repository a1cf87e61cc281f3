//! Notification entity and repository trait.
//!
//! Maps to the `notifications` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

/// What happened, matching the database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
}

impl NotificationKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "follow" => Some(Self::Follow),
            "like" => Some(Self::Like),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
            Self::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    /// Who triggered it
    pub actor_id: i64,
    pub kind: NotificationKind,
    pub review_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(id: i64, user_id: i64, actor_id: i64, kind: NotificationKind) -> Self {
        Self {
            id,
            user_id,
            actor_id,
            kind,
            review_id: None,
            comment_id: None,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// A notification with the actor's public profile.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationDetails {
    pub notification: Notification,
    pub actor: UserSummary,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<(), AppError>;

    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationDetails>, AppError>;

    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError>;

    /// Returns `false` if no such notification belongs to the user.
    async fn mark_read(&self, user_id: i64, id: i64) -> Result<bool, AppError>;

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, AppError>;
}
