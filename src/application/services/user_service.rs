//! User Service
//!
//! Handles account and profile operations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{FollowRepository, User, UserRepository, UserStats};
use crate::shared::error::AppError;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get the authenticated user's own account
    async fn get_me(&self, user_id: i64) -> Result<User, UserError>;

    /// Public profile with counters; `viewer_id` fills `is_following`
    async fn get_profile(
        &self,
        username: &str,
        viewer_id: Option<i64>,
    ) -> Result<Profile, UserError>;

    /// Resolve a username to the user
    async fn find_by_username(&self, username: &str) -> Result<User, UserError>;

    /// Update user profile
    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileDto,
    ) -> Result<User, UserError>;

    /// Delete user account
    async fn delete_account(&self, user_id: i64) -> Result<(), UserError>;
}

/// A user as seen on their profile page
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub stats: UserStats,
    pub is_following: bool,
}

/// Profile fields to change; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Username already taken")]
    UsernameTaken,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound("User not found".into()),
            UserError::UsernameTaken => AppError::Conflict("Username already taken".into()),
            UserError::Repository(e) => e,
        }
    }
}

/// Empty strings clear an optional profile field
fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// UserService implementation
pub struct UserServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    follow_repo: Arc<dyn FollowRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, follow_repo: Arc<dyn FollowRepository>) -> Self {
        Self {
            user_repo,
            follow_repo,
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_me(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn get_profile(
        &self,
        username: &str,
        viewer_id: Option<i64>,
    ) -> Result<Profile, UserError> {
        let user = self.find_by_username(username).await?;
        let stats = self.user_repo.stats(user.id).await?;

        let is_following = match viewer_id {
            Some(viewer) if viewer != user.id => {
                self.follow_repo.is_following(viewer, user.id).await?
            }
            _ => false,
        };

        Ok(Profile {
            user,
            stats,
            is_following,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<User, UserError> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileDto,
    ) -> Result<User, UserError> {
        let mut user = self.get_me(user_id).await?;

        // Check if username is being changed and if it's available
        if let Some(new_username) = update.username.map(|u| u.trim().to_string()) {
            if new_username != user.username {
                if self.user_repo.username_exists(&new_username).await? {
                    return Err(UserError::UsernameTaken);
                }
                user.username = new_username;
            }
        }

        if let Some(display_name) = update.display_name {
            user.display_name = blank_to_none(display_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = blank_to_none(avatar_url);
        }
        if let Some(bio) = update.bio {
            user.bio = blank_to_none(bio);
        }
        user.updated_at = Utc::now();

        Ok(self.user_repo.update(&user).await?)
    }

    async fn delete_account(&self, user_id: i64) -> Result<(), UserError> {
        // Make sure the user exists
        self.get_me(user_id).await?;
        self.user_repo.delete(user_id).await?;

        tracing::info!(user_id, "Account deleted");
        Ok(())
    }
}
