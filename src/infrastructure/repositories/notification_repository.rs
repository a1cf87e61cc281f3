//! Notification Repository Implementation
//!
//! PostgreSQL implementation of the NotificationRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Notification, NotificationDetails, NotificationKind, NotificationRepository, UserSummary,
};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    actor_id: i64,
    kind: String,
    review_id: Option<i64>,
    comment_id: Option<i64>,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    actor_username: String,
    actor_display_name: Option<String>,
    actor_avatar_url: Option<String>,
}

impl NotificationRow {
    fn into_details(self) -> Result<NotificationDetails, AppError> {
        let kind = NotificationKind::from_str(&self.kind).ok_or_else(|| {
            AppError::Internal(format!("Unknown notification kind: {}", self.kind))
        })?;

        Ok(NotificationDetails {
            notification: Notification {
                id: self.id,
                user_id: self.user_id,
                actor_id: self.actor_id,
                kind,
                review_id: self.review_id,
                comment_id: self.comment_id,
                read_at: self.read_at,
                created_at: self.created_at,
            },
            actor: UserSummary {
                id: self.actor_id,
                username: self.actor_username,
                display_name: self.actor_display_name,
                avatar_url: self.actor_avatar_url,
            },
        })
    }
}

/// PostgreSQL notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, actor_id, kind, review_id, comment_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.actor_id)
        .bind(notification.kind.as_str())
        .bind(notification.review_id)
        .bind(notification.comment_id)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationDetails>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT n.id, n.user_id, n.actor_id, n.kind, n.review_id, n.comment_id,
                   n.read_at, n.created_at,
                   a.username AS actor_username,
                   a.display_name AS actor_display_name,
                   a.avatar_url AS actor_avatar_url
            FROM notifications n
            JOIN users a ON a.id = n.actor_id
            WHERE n.user_id = $1 AND (NOT $2 OR n.read_at IS NULL)
            ORDER BY n.created_at DESC, n.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(NotificationRow::into_details)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page, total))
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_read(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        // Re-reading an already read notification still succeeds
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
