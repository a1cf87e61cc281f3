//! Game Catalogue Handlers
//!
//! Reads are public; writes require the admin role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateGameRequest, CreateReviewRequest, GameSearchParams, UpdateGameRequest,
};
use crate::application::dto::response::{GameResponse, ReviewResponse};
use crate::domain::GameQuery;
use crate::presentation::http::extractors::{AdminUser, MaybeAuthUser};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageParams};
use crate::shared::snowflake::parse_id;
use crate::shared::validation::ValidatedJson;
use crate::startup::AppState;

/// Search the catalogue
pub async fn list_games(
    State(state): State<AppState>,
    Query(params): Query<GameSearchParams>,
) -> Result<Json<Page<GameResponse>>, AppError> {
    let page = params.page_request();
    let query = GameQuery {
        search: params.q.filter(|q| !q.trim().is_empty()),
        genre: params.genre.filter(|g| !g.trim().is_empty()),
    };

    let games = state.services.games.list(query, page).await?;
    Ok(Json(games.map(Into::into)))
}

/// Get a game by snowflake ID or slug
pub async fn get_game(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let game = state.services.games.get(&id_or_slug).await?;
    Ok(Json(game.into()))
}

pub async fn create_game(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(body): ValidatedJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    let game = state.services.games.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

pub async fn update_game(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(game_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateGameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let game_id = parse_id(&game_id, "game")?;

    let game = state.services.games.update(game_id, body.into()).await?;
    Ok(Json(game.into()))
}

pub async fn delete_game(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(game_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let game_id = parse_id(&game_id, "game")?;

    state.services.games.delete(game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reviews of a game, newest first
pub async fn list_game_reviews(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(game_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ReviewResponse>>, AppError> {
    let game_id = parse_id(&game_id, "game")?;

    let reviews = state
        .services
        .reviews
        .list_for_game(game_id, viewer.user_id(), params.into())
        .await?;

    Ok(Json(reviews.map(Into::into)))
}

/// Review a game; one review per user per game
pub async fn create_review(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(game_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let game_id = parse_id(&game_id, "game")?;

    let review = state
        .services
        .reviews
        .create(auth_user.user_id, game_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}
