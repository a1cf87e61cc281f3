//! Notification Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::NotificationParams;
use crate::application::dto::response::{
    MarkedReadResponse, NotificationResponse, UnreadCountResponse,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::Page;
use crate::shared::snowflake::parse_id;
use crate::startup::AppState;

/// Newest first; `?unread=true` hides read notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<NotificationParams>,
) -> Result<Json<Page<NotificationResponse>>, AppError> {
    let page = state
        .services
        .notifications
        .list(auth_user.user_id, params.unread, params.page_request())
        .await?;

    Ok(Json(page.map(Into::into)))
}

pub async fn unread_count(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = state
        .services
        .notifications
        .unread_count(auth_user.user_id)
        .await?;

    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let notification_id = parse_id(&notification_id, "notification")?;

    state
        .services
        .notifications
        .mark_read(auth_user.user_id, notification_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MarkedReadResponse>, AppError> {
    let updated = state
        .services
        .notifications
        .mark_all_read(auth_user.user_id)
        .await?;

    Ok(Json(MarkedReadResponse { updated }))
}
