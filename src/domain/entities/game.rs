//! Game entity and repository trait.
//!
//! Maps to the `games` table. `average_rating` and `review_count` are derived
//! from `reviews` when reading and ignored when writing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

/// A game in the catalogue.
///
/// Maps to the `games` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - slug: VARCHAR(220) NOT NULL UNIQUE
/// - title: VARCHAR(200) NOT NULL
/// - description, developer, publisher, cover_url: NULL
/// - release_date: DATE NULL
/// - genres: TEXT[] NOT NULL DEFAULT '{}'
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Mean review rating, `None` without reviews
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

impl Game {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

/// Catalogue filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameQuery {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Exact genre, case-insensitive
    pub genre: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Game>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Game>, AppError>;

    /// Games matching the query, ordered by title.
    async fn list(&self, query: &GameQuery, page: PageRequest) -> Result<Page<Game>, AppError>;

    async fn create(&self, game: &Game) -> Result<Game, AppError>;

    async fn update(&self, game: &Game) -> Result<Game, AppError>;

    /// Delete a game; its reviews and list entries cascade.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
