//! Game Repository Implementation
//!
//! PostgreSQL implementation of the GameRepository trait. Rating statistics
//! are aggregated from `reviews` at read time.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::{Game, GameQuery, GameRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Page, PageRequest};

#[derive(Debug, sqlx::FromRow)]
struct GameRow {
    id: i64,
    slug: String,
    title: String,
    description: Option<String>,
    developer: Option<String>,
    publisher: Option<String>,
    release_date: Option<NaiveDate>,
    cover_url: Option<String>,
    genres: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    average_rating: Option<f64>,
    review_count: i64,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Game {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            developer: row.developer,
            publisher: row.publisher,
            release_date: row.release_date,
            cover_url: row.cover_url,
            genres: row.genres,
            created_at: row.created_at,
            updated_at: row.updated_at,
            average_rating: row.average_rating,
            review_count: row.review_count,
        }
    }
}

const GAME_SELECT: &str = r#"
    SELECT g.id, g.slug, g.title, g.description, g.developer, g.publisher, g.release_date,
           g.cover_url, g.genres, g.created_at, g.updated_at,
           s.average_rating, s.review_count
    FROM games g
    CROSS JOIN LATERAL (
        SELECT AVG(r.rating)::float8 AS average_rating, COUNT(r.id) AS review_count
        FROM reviews r
        WHERE r.game_id = g.id
    ) s
"#;

const GAME_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR g.title ILIKE '%' || $1 || '%' ESCAPE '\')
      AND ($2::text IS NULL OR $2 = ANY(g.genres))
"#;

/// Escape LIKE wildcards so user input only matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// PostgreSQL game repository implementation.
#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Game>, AppError> {
        let row = sqlx::query_as::<_, GameRow>(&format!("{} WHERE g.id = $1", GAME_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Game>, AppError> {
        let row = sqlx::query_as::<_, GameRow>(&format!("{} WHERE g.slug = $1", GAME_SELECT))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, query: &GameQuery, page: PageRequest) -> Result<Page<Game>, AppError> {
        let search = query.search.as_deref().map(escape_like);

        let rows = sqlx::query_as::<_, GameRow>(&format!(
            "{} {} ORDER BY LOWER(g.title), g.id LIMIT $3 OFFSET $4",
            GAME_SELECT, GAME_FILTER
        ))
        .bind(&search)
        .bind(&query.genre)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM games g {}",
            GAME_FILTER
        ))
        .bind(&search)
        .bind(&query.genre)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    async fn create(&self, game: &Game) -> Result<Game, AppError> {
        sqlx::query(
            r#"
            INSERT INTO games (id, slug, title, description, developer, publisher,
                               release_date, cover_url, genres, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(game.id)
        .bind(&game.slug)
        .bind(&game.title)
        .bind(&game.description)
        .bind(&game.developer)
        .bind(&game.publisher)
        .bind(game.release_date)
        .bind(&game.cover_url)
        .bind(&game.genres)
        .bind(game.created_at)
        .bind(game.updated_at)
        .execute(&self.pool)
        .await?;

        self.find_by_id(game.id)
            .await?
            .ok_or_else(|| AppError::Internal("Inserted game not found".into()))
    }

    async fn update(&self, game: &Game) -> Result<Game, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE games
            SET title = $2, description = $3, developer = $4, publisher = $5,
                release_date = $6, cover_url = $7, genres = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(game.id)
        .bind(&game.title)
        .bind(&game.description)
        .bind(&game.developer)
        .bind(&game.publisher)
        .bind(game.release_date)
        .bind(&game.cover_url)
        .bind(&game.genres)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Game not found".into()));
        }

        self.find_by_id(game.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".into()))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Game not found".into()));
        }

        Ok(())
    }
}
