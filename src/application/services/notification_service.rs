//! Notification Service
//!
//! Reading and acknowledging notifications, plus the [`Notifier`] the other
//! services use to emit follow/like/comment events.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Notification, NotificationDetails, NotificationKind, NotificationRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};
use crate::shared::snowflake::SnowflakeGenerator;

/// Notification service trait
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationDetails>, NotificationError>;

    async fn unread_count(&self, user_id: i64) -> Result<i64, NotificationError>;

    async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<(), NotificationError>;

    /// Returns how many notifications changed state
    async fn mark_all_read(&self, user_id: i64) -> Result<u64, NotificationError>;
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => AppError::NotFound("Notification not found".into()),
            NotificationError::Repository(e) => e,
        }
    }
}

/// Something that happened to `recipient_id` because of `actor_id`
#[derive(Debug, Clone, Copy)]
pub struct NotificationEvent {
    pub recipient_id: i64,
    pub actor_id: i64,
    pub kind: NotificationKind,
    pub review_id: Option<i64>,
    pub comment_id: Option<i64>,
}

/// Emits notifications on behalf of other services.
///
/// Delivery is best effort: a failed insert is logged and never fails the
/// action that caused it. Actions on one's own content produce nothing.
#[derive(Clone)]
pub struct Notifier {
    repo: Arc<dyn NotificationRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl Notifier {
    pub fn new(repo: Arc<dyn NotificationRepository>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { repo, id_generator }
    }

    pub async fn notify(&self, event: NotificationEvent) {
        if event.recipient_id == event.actor_id {
            return;
        }

        let mut notification = Notification::new(
            self.id_generator.generate(),
            event.recipient_id,
            event.actor_id,
            event.kind,
        );
        notification.review_id = event.review_id;
        notification.comment_id = event.comment_id;

        if let Err(e) = self.repo.create(&notification).await {
            tracing::warn!(
                recipient_id = event.recipient_id,
                kind = event.kind.as_str(),
                error = %e,
                "Failed to store notification"
            );
        }
    }
}

/// NotificationService implementation
pub struct NotificationServiceImpl {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationServiceImpl {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn list(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationDetails>, NotificationError> {
        Ok(self.repo.list_for_user(user_id, unread_only, page).await?)
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, NotificationError> {
        Ok(self.repo.unread_count(user_id).await?)
    }

    async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<(), NotificationError> {
        if self.repo.mark_read(user_id, notification_id).await? {
            Ok(())
        } else {
            Err(NotificationError::NotFound)
        }
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, NotificationError> {
        Ok(self.repo.mark_all_read(user_id).await?)
    }
}
