//! User Handlers
//!
//! The signed-in account under `/users/@me` and public profiles under
//! `/users/{username}`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::application::dto::request::UpdateProfileRequest;
use crate::application::dto::response::{
    GameListResponse, ProfileResponse, ReviewResponse, SessionResponse, UserResponse,
    UserSummaryResponse,
};
use crate::presentation::http::extractors::MaybeAuthUser;
use crate::presentation::http::handlers::auth::without_token_cookies;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageParams};
use crate::shared::validation::ValidatedJson;
use crate::startup::AppState;

/// Get the current user's account
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.services.users.get_me(auth_user.user_id).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

/// Update the current user's profile
pub async fn update_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .services
        .users
        .update_profile(auth_user.user_id, body.into())
        .await?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Delete the current user's account and everything it owns
pub async fn delete_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    state
        .services
        .users
        .delete_account(auth_user.user_id)
        .await?;

    let jar = without_token_cookies(jar, &state.settings.cookies);
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Active sessions (devices) of the current user
pub async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let sessions = state
        .services
        .auth
        .list_sessions(auth_user.user_id)
        .await?;

    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

/// Sign out one device
pub async fn revoke_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session_id = Uuid::parse_str(&session_id)
        .map_err(|_| AppError::BadRequest("Invalid session ID".into()))?;

    state
        .services
        .auth
        .revoke_session(auth_user.user_id, session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Public profile with follow counters
pub async fn get_profile(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .services
        .users
        .get_profile(&username, viewer.user_id())
        .await?;

    Ok(Json(profile.into()))
}

/// Reviews written by a user, newest first
pub async fn get_user_reviews(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ReviewResponse>>, AppError> {
    let user = state.services.users.find_by_username(&username).await?;

    let reviews = state
        .services
        .reviews
        .list_for_user(user.id, viewer.user_id(), params.into())
        .await?;

    Ok(Json(reviews.map(Into::into)))
}

pub async fn get_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<UserSummaryResponse>>, AppError> {
    let page = state
        .services
        .follows
        .followers(&username, params.into())
        .await?;

    Ok(Json(page.map(Into::into)))
}

pub async fn get_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<UserSummaryResponse>>, AppError> {
    let page = state
        .services
        .follows
        .following(&username, params.into())
        .await?;

    Ok(Json(page.map(Into::into)))
}

/// Lists of a user; private ones only when the owner asks
pub async fn get_user_lists(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
) -> Result<Json<Vec<GameListResponse>>, AppError> {
    let user = state.services.users.find_by_username(&username).await?;

    let lists = state
        .services
        .lists
        .list_for_user(user.id, viewer.user_id())
        .await?;

    Ok(Json(lists.into_iter().map(Into::into).collect()))
}

pub async fn follow_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .follows
        .follow(auth_user.user_id, &username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .follows
        .unfollow(auth_user.user_id, &username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
