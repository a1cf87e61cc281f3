//! Game List Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{AddListGameRequest, CreateListRequest, UpdateListRequest};
use crate::application::dto::response::{GameListDetailResponse, GameListResponse};
use crate::presentation::http::extractors::MaybeAuthUser;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::shared::validation::ValidatedJson;
use crate::startup::AppState;

pub async fn create_list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateListRequest>,
) -> Result<(StatusCode, Json<GameListResponse>), AppError> {
    let list = state
        .services
        .lists
        .create(auth_user.user_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(list.into())))
}

/// A list with its games; private lists answer 404 to everyone but the owner
pub async fn get_list(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<GameListDetailResponse>, AppError> {
    let list_id = parse_id(&list_id, "list")?;

    let details = state
        .services
        .lists
        .get(list_id, viewer.user_id())
        .await?;

    Ok(Json(details.into()))
}

pub async fn update_list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(list_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateListRequest>,
) -> Result<Json<GameListResponse>, AppError> {
    let list_id = parse_id(&list_id, "list")?;

    let list = state
        .services
        .lists
        .update(auth_user.user_id, list_id, body.into())
        .await?;

    Ok(Json(list.into()))
}

pub async fn delete_list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(list_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let list_id = parse_id(&list_id, "list")?;

    state
        .services
        .lists
        .delete(auth_user.user_id, list_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Append a game to the end of a list
pub async fn add_game(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(list_id): Path<String>,
    ValidatedJson(body): ValidatedJson<AddListGameRequest>,
) -> Result<(StatusCode, Json<GameListDetailResponse>), AppError> {
    let list_id = parse_id(&list_id, "list")?;

    let details = state
        .services
        .lists
        .add_game(auth_user.user_id, list_id, body.game_id, body.note)
        .await?;

    Ok((StatusCode::CREATED, Json(details.into())))
}

pub async fn remove_game(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((list_id, game_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let list_id = parse_id(&list_id, "list")?;
    let game_id = parse_id(&game_id, "game")?;

    state
        .services
        .lists
        .remove_game(auth_user.user_id, list_id, game_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
