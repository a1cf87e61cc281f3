//! Review Handlers
//!
//! Single reviews, likes, comments and the following feed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CommentRequest, UpdateReviewRequest};
use crate::application::dto::response::{CommentResponse, LikeResponse, ReviewResponse};
use crate::presentation::http::extractors::MaybeAuthUser;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageParams};
use crate::shared::snowflake::parse_id;
use crate::shared::validation::ValidatedJson;
use crate::startup::AppState;

pub async fn get_review(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(review_id): Path<String>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review_id = parse_id(&review_id, "review")?;

    let review = state
        .services
        .reviews
        .get(review_id, viewer.user_id())
        .await?;

    Ok(Json(review.into()))
}

/// Edit a review (author only)
pub async fn update_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(review_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review_id = parse_id(&review_id, "review")?;

    let review = state
        .services
        .reviews
        .update(auth_user.user_id, review_id, body.into())
        .await?;

    Ok(Json(review.into()))
}

/// Delete a review (author only)
pub async fn delete_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(review_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let review_id = parse_id(&review_id, "review")?;

    state
        .services
        .reviews
        .delete(auth_user.user_id, review_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Like a review; liking twice is a no-op
pub async fn like_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(review_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let review_id = parse_id(&review_id, "review")?;

    let like_count = state
        .services
        .reviews
        .like(auth_user.user_id, review_id)
        .await?;

    Ok(Json(LikeResponse {
        liked: true,
        like_count,
    }))
}

pub async fn unlike_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(review_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let review_id = parse_id(&review_id, "review")?;

    let like_count = state
        .services
        .reviews
        .unlike(auth_user.user_id, review_id)
        .await?;

    Ok(Json(LikeResponse {
        liked: false,
        like_count,
    }))
}

/// Comments on a review, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CommentResponse>>, AppError> {
    let review_id = parse_id(&review_id, "review")?;

    let comments = state
        .services
        .comments
        .list(review_id, params.into())
        .await?;

    Ok(Json(comments.map(Into::into)))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(review_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let review_id = parse_id(&review_id, "review")?;

    let comment = state
        .services
        .comments
        .create(auth_user.user_id, review_id, body.body)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Edit a comment (author only)
pub async fn update_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let comment_id = parse_id(&comment_id, "comment")?;

    let comment = state
        .services
        .comments
        .update(auth_user.user_id, comment_id, body.body)
        .await?;

    Ok(Json(comment.into()))
}

/// Delete a comment (its author or the review's author)
pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let comment_id = parse_id(&comment_id, "comment")?;

    state
        .services
        .comments
        .delete(auth_user.user_id, comment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Reviews by followed users, newest first
pub async fn get_feed(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ReviewResponse>>, AppError> {
    let feed = state
        .services
        .reviews
        .feed(auth_user.user_id, params.into())
        .await?;

    Ok(Json(feed.map(Into::into)))
}
