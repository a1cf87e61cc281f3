//! Game List Service
//!
//! Curated, ordered collections of games. Private lists behave as if they did
//! not exist for anyone but their owner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{GameList, GameListEntry, GameListRepository, GameRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Game list service trait
#[async_trait]
pub trait GameListService: Send + Sync {
    async fn create(&self, user_id: i64, dto: CreateListDto) -> Result<GameList, GameListError>;

    async fn get(
        &self,
        list_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<GameListDetails, GameListError>;

    /// Lists owned by `owner_id` that `viewer_id` may see
    async fn list_for_user(
        &self,
        owner_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<GameList>, GameListError>;

    async fn update(
        &self,
        user_id: i64,
        list_id: i64,
        dto: UpdateListDto,
    ) -> Result<GameList, GameListError>;

    async fn delete(&self, user_id: i64, list_id: i64) -> Result<(), GameListError>;

    /// Append a game at the end of the list
    async fn add_game(
        &self,
        user_id: i64,
        list_id: i64,
        game_id: i64,
        note: Option<String>,
    ) -> Result<GameListDetails, GameListError>;

    async fn remove_game(
        &self,
        user_id: i64,
        list_id: i64,
        game_id: i64,
    ) -> Result<(), GameListError>;
}

/// A list with its entries in order
#[derive(Debug, Clone)]
pub struct GameListDetails {
    pub list: GameList,
    pub entries: Vec<GameListEntry>,
}

#[derive(Debug, Clone)]
pub struct CreateListDto {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateListDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Game list service errors
#[derive(Debug, thiserror::Error)]
pub enum GameListError {
    #[error("List not found")]
    NotFound,

    #[error("Game not found")]
    GameNotFound,

    #[error("You already have a list with this name")]
    NameTaken,

    #[error("Game is already in this list")]
    AlreadyListed,

    #[error("Game is not in this list")]
    NotListed,

    #[error("Only the owner can modify this list")]
    NotOwner,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<GameListError> for AppError {
    fn from(err: GameListError) -> Self {
        match err {
            GameListError::NotFound
            | GameListError::GameNotFound
            | GameListError::NotListed => AppError::NotFound(err.to_string()),
            GameListError::NameTaken | GameListError::AlreadyListed => {
                AppError::Conflict(err.to_string())
            }
            GameListError::NotOwner => AppError::Forbidden(err.to_string()),
            GameListError::Repository(e) => e,
        }
    }
}

/// GameListService implementation
pub struct GameListServiceImpl {
    list_repo: Arc<dyn GameListRepository>,
    game_repo: Arc<dyn GameRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl GameListServiceImpl {
    pub fn new(
        list_repo: Arc<dyn GameListRepository>,
        game_repo: Arc<dyn GameRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            list_repo,
            game_repo,
            id_generator,
        }
    }

    async fn find_visible(
        &self,
        list_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<GameList, GameListError> {
        self.list_repo
            .find_by_id(list_id)
            .await?
            .filter(|list| list.is_visible_to(viewer_id))
            .ok_or(GameListError::NotFound)
    }

    async fn find_owned(&self, user_id: i64, list_id: i64) -> Result<GameList, GameListError> {
        let list = self.find_visible(list_id, Some(user_id)).await?;
        if list.user_id != user_id {
            return Err(GameListError::NotOwner);
        }
        Ok(list)
    }

    async fn name_taken(&self, user_id: i64, name: &str) -> Result<bool, GameListError> {
        Ok(self
            .list_repo
            .list_for_user(user_id, true)
            .await?
            .iter()
            .any(|list| list.name == name))
    }
}

#[async_trait]
impl GameListService for GameListServiceImpl {
    async fn create(&self, user_id: i64, dto: CreateListDto) -> Result<GameList, GameListError> {
        let name = dto.name.trim().to_string();
        if self.name_taken(user_id, &name).await? {
            return Err(GameListError::NameTaken);
        }

        let now = Utc::now();
        let list = GameList {
            id: self.id_generator.generate(),
            user_id,
            name,
            description: dto.description,
            is_public: dto.is_public,
            created_at: now,
            updated_at: now,
        };

        Ok(self.list_repo.create(&list).await?)
    }

    async fn get(
        &self,
        list_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<GameListDetails, GameListError> {
        let list = self.find_visible(list_id, viewer_id).await?;
        let entries = self.list_repo.entries(list.id).await?;

        Ok(GameListDetails { list, entries })
    }

    async fn list_for_user(
        &self,
        owner_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<GameList>, GameListError> {
        let include_private = viewer_id == Some(owner_id);
        Ok(self.list_repo.list_for_user(owner_id, include_private).await?)
    }

    async fn update(
        &self,
        user_id: i64,
        list_id: i64,
        dto: UpdateListDto,
    ) -> Result<GameList, GameListError> {
        let mut list = self.find_owned(user_id, list_id).await?;

        if let Some(name) = dto.name.map(|n| n.trim().to_string()) {
            if name != list.name && self.name_taken(user_id, &name).await? {
                return Err(GameListError::NameTaken);
            }
            list.name = name;
        }
        if let Some(description) = dto.description {
            list.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(is_public) = dto.is_public {
            list.is_public = is_public;
        }
        list.updated_at = Utc::now();

        Ok(self.list_repo.update(&list).await?)
    }

    async fn delete(&self, user_id: i64, list_id: i64) -> Result<(), GameListError> {
        self.find_owned(user_id, list_id).await?;
        self.list_repo.delete(list_id).await?;
        Ok(())
    }

    async fn add_game(
        &self,
        user_id: i64,
        list_id: i64,
        game_id: i64,
        note: Option<String>,
    ) -> Result<GameListDetails, GameListError> {
        let list = self.find_owned(user_id, list_id).await?;

        if self.game_repo.find_by_id(game_id).await?.is_none() {
            return Err(GameListError::GameNotFound);
        }

        if !self.list_repo.add_game(list_id, game_id, note).await? {
            return Err(GameListError::AlreadyListed);
        }

        let entries = self.list_repo.entries(list_id).await?;
        Ok(GameListDetails { list, entries })
    }

    async fn remove_game(
        &self,
        user_id: i64,
        list_id: i64,
        game_id: i64,
    ) -> Result<(), GameListError> {
        self.find_owned(user_id, list_id).await?;

        if !self.list_repo.remove_game(list_id, game_id).await? {
            return Err(GameListError::NotListed);
        }
        Ok(())
    }
}
