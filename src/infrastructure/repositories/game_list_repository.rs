//! Game List Repository Implementation
//!
//! PostgreSQL implementation of the GameListRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{GameList, GameListEntry, GameListRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct GameListRow {
    id: i64,
    user_id: i64,
    name: String,
    description: Option<String>,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GameListRow> for GameList {
    fn from(row: GameListRow) -> Self {
        GameList {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    game_id: i64,
    slug: String,
    title: String,
    cover_url: Option<String>,
    position: i32,
    note: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<EntryRow> for GameListEntry {
    fn from(row: EntryRow) -> Self {
        GameListEntry {
            game_id: row.game_id,
            slug: row.slug,
            title: row.title,
            cover_url: row.cover_url,
            position: row.position,
            note: row.note,
            added_at: row.added_at,
        }
    }
}

const LIST_COLUMNS: &str = "id, user_id, name, description, is_public, created_at, updated_at";

/// PostgreSQL game list repository implementation.
#[derive(Clone)]
pub struct PgGameListRepository {
    pool: PgPool,
}

impl PgGameListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameListRepository for PgGameListRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<GameList>, AppError> {
        let row = sqlx::query_as::<_, GameListRow>(&format!(
            "SELECT {} FROM game_lists WHERE id = $1",
            LIST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        include_private: bool,
    ) -> Result<Vec<GameList>, AppError> {
        let rows = sqlx::query_as::<_, GameListRow>(&format!(
            r#"
            SELECT {} FROM game_lists
            WHERE user_id = $1 AND (is_public OR $2)
            ORDER BY created_at DESC, id DESC
            "#,
            LIST_COLUMNS
        ))
        .bind(user_id)
        .bind(include_private)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, list: &GameList) -> Result<GameList, AppError> {
        let row = sqlx::query_as::<_, GameListRow>(&format!(
            r#"
            INSERT INTO game_lists (id, user_id, name, description, is_public, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            LIST_COLUMNS
        ))
        .bind(list.id)
        .bind(list.user_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.is_public)
        .bind(list.created_at)
        .bind(list.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, list: &GameList) -> Result<GameList, AppError> {
        let row = sqlx::query_as::<_, GameListRow>(&format!(
            r#"
            UPDATE game_lists
            SET name = $2, description = $3, is_public = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LIST_COLUMNS
        ))
        .bind(list.id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.is_public)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".into()))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM game_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("List not found".into()));
        }

        Ok(())
    }

    async fn entries(&self, list_id: i64) -> Result<Vec<GameListEntry>, AppError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT i.game_id, g.slug, g.title, g.cover_url, i.position, i.note, i.added_at
            FROM game_list_items i
            JOIN games g ON g.id = i.game_id
            WHERE i.list_id = $1
            ORDER BY i.position ASC
            "#,
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_game(
        &self,
        list_id: i64,
        game_id: i64,
        note: Option<String>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO game_list_items (list_id, game_id, position, note)
            SELECT $1, $2, COALESCE(MAX(position), 0) + 1, $3
            FROM game_list_items
            WHERE list_id = $1
            ON CONFLICT (list_id, game_id) DO NOTHING
            "#,
        )
        .bind(list_id)
        .bind(game_id)
        .bind(note)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            sqlx::query("UPDATE game_lists SET updated_at = NOW() WHERE id = $1")
                .bind(list_id)
                .execute(&self.pool)
                .await?;
            return Ok(true);
        }

        Ok(false)
    }

    async fn remove_game(&self, list_id: i64, game_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM game_list_items WHERE list_id = $1 AND game_id = $2")
                .bind(list_id)
                .bind(game_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
