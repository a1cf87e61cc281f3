//! Game Service
//!
//! Public catalogue reads and admin-only catalogue maintenance. Callers are
//! expected to have checked the admin role before calling the write methods.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::domain::{slugify, Game, GameQuery, GameRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};
use crate::shared::snowflake::SnowflakeGenerator;

/// Game service trait
#[async_trait]
pub trait GameService: Send + Sync {
    /// Search the catalogue
    async fn list(&self, query: GameQuery, page: PageRequest) -> Result<Page<Game>, GameError>;

    /// Get a game by numeric ID or slug
    async fn get(&self, id_or_slug: &str) -> Result<Game, GameError>;

    async fn get_by_id(&self, id: i64) -> Result<Game, GameError>;

    async fn create(&self, dto: CreateGameDto) -> Result<Game, GameError>;

    async fn update(&self, id: i64, dto: UpdateGameDto) -> Result<Game, GameError>;

    async fn delete(&self, id: i64) -> Result<(), GameError>;
}

#[derive(Debug, Clone, Default)]
pub struct CreateGameDto {
    pub title: String,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
}

/// The slug is not regenerated when the title changes, so links stay valid.
#[derive(Debug, Clone, Default)]
pub struct UpdateGameDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Game service errors
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game not found")]
    NotFound,

    #[error("A game with this slug already exists")]
    SlugTaken,

    #[error("Title must contain at least one letter or digit")]
    UnusableTitle,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::NotFound => AppError::NotFound("Game not found".into()),
            GameError::SlugTaken => {
                AppError::Conflict("A game with this slug already exists".into())
            }
            GameError::UnusableTitle => AppError::BadRequest(err.to_string()),
            GameError::Repository(e) => e,
        }
    }
}

/// Trimmed, de-duplicated, lowercase genre tags
fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim().to_lowercase();
        if !genre.is_empty() && !normalized.contains(&genre) {
            normalized.push(genre);
        }
    }
    normalized
}

/// GameService implementation
pub struct GameServiceImpl {
    game_repo: Arc<dyn GameRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl GameServiceImpl {
    pub fn new(game_repo: Arc<dyn GameRepository>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            game_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl GameService for GameServiceImpl {
    async fn list(&self, mut query: GameQuery, page: PageRequest) -> Result<Page<Game>, GameError> {
        query.search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        query.genre = query
            .genre
            .map(|g| g.trim().to_lowercase())
            .filter(|g| !g.is_empty());

        Ok(self.game_repo.list(&query, page).await?)
    }

    async fn get(&self, id_or_slug: &str) -> Result<Game, GameError> {
        let game = match id_or_slug.parse::<i64>() {
            Ok(id) => match self.game_repo.find_by_id(id).await? {
                Some(game) => Some(game),
                // All-digit titles such as "1942" have all-digit slugs
                None => self.game_repo.find_by_slug(id_or_slug).await?,
            },
            Err(_) => self.game_repo.find_by_slug(&id_or_slug.to_lowercase()).await?,
        };

        game.ok_or(GameError::NotFound)
    }

    async fn get_by_id(&self, id: i64) -> Result<Game, GameError> {
        self.game_repo
            .find_by_id(id)
            .await?
            .ok_or(GameError::NotFound)
    }

    async fn create(&self, dto: CreateGameDto) -> Result<Game, GameError> {
        let title = dto.title.trim().to_string();
        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(GameError::UnusableTitle);
        }

        if self.game_repo.find_by_slug(&slug).await?.is_some() {
            return Err(GameError::SlugTaken);
        }

        let now = Utc::now();
        let game = Game {
            id: self.id_generator.generate(),
            slug,
            title,
            description: dto.description,
            developer: dto.developer,
            publisher: dto.publisher,
            release_date: dto.release_date,
            cover_url: dto.cover_url,
            genres: normalize_genres(dto.genres),
            created_at: now,
            updated_at: now,
            average_rating: None,
            review_count: 0,
        };

        let created = self.game_repo.create(&game).await?;
        tracing::info!(game_id = created.id, slug = %created.slug, "Game created");

        Ok(created)
    }

    async fn update(&self, id: i64, dto: UpdateGameDto) -> Result<Game, GameError> {
        let mut game = self.get_by_id(id).await?;

        if let Some(title) = dto.title {
            let title = title.trim().to_string();
            if slugify(&title).is_empty() {
                return Err(GameError::UnusableTitle);
            }
            game.title = title;
        }
        if let Some(description) = dto.description {
            game.description = Some(description);
        }
        if let Some(developer) = dto.developer {
            game.developer = Some(developer);
        }
        if let Some(publisher) = dto.publisher {
            game.publisher = Some(publisher);
        }
        if let Some(release_date) = dto.release_date {
            game.release_date = Some(release_date);
        }
        if let Some(cover_url) = dto.cover_url {
            game.cover_url = Some(cover_url);
        }
        if let Some(genres) = dto.genres {
            game.genres = normalize_genres(genres);
        }
        game.updated_at = Utc::now();

        Ok(self.game_repo.update(&game).await?)
    }

    async fn delete(&self, id: i64) -> Result<(), GameError> {
        self.get_by_id(id).await?;
        self.game_repo.delete(id).await?;

        tracing::info!(game_id = id, "Game deleted");
        Ok(())
    }
}
