//! Curated game list entity and repository trait.
//!
//! Maps to the `game_lists` and `game_list_items` tables. List names are
//! unique per owner; a game appears in a list at most once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameList {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameList {
    /// Private lists are only visible to their owner.
    pub fn is_visible_to(&self, viewer_id: Option<i64>) -> bool {
        self.is_public || viewer_id == Some(self.user_id)
    }
}

/// One game inside a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameListEntry {
    pub game_id: i64,
    pub slug: String,
    pub title: String,
    pub cover_url: Option<String>,
    /// 1-based position, appended entries go last
    pub position: i32,
    pub note: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameListRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<GameList>, AppError>;

    /// Lists of a user, newest first; private ones only if requested.
    async fn list_for_user(
        &self,
        user_id: i64,
        include_private: bool,
    ) -> Result<Vec<GameList>, AppError>;

    async fn create(&self, list: &GameList) -> Result<GameList, AppError>;

    /// Update name, description and visibility.
    async fn update(&self, list: &GameList) -> Result<GameList, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Entries ordered by position.
    async fn entries(&self, list_id: i64) -> Result<Vec<GameListEntry>, AppError>;

    /// Append a game. Returns `false` if it was already in the list.
    async fn add_game(
        &self,
        list_id: i64,
        game_id: i64,
        note: Option<String>,
    ) -> Result<bool, AppError>;

    /// Returns `false` if the game was not in the list.
    async fn remove_game(&self, list_id: i64, game_id: i64) -> Result<bool, AppError>;
}
