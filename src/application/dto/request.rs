//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::application::services::{
    CreateGameDto, CreateListDto, CreateReviewDto, Registration, UpdateGameDto, UpdateListDto,
    UpdateProfileDto, UpdateReviewDto,
};
use crate::shared::pagination::{PageParams, PageRequest};

/// Letters, digits, `_`, `-` and `.`; no leading/trailing punctuation
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    let valid_edges = username
        .chars()
        .next()
        .zip(username.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    // `@me` is a reserved path segment, so usernames never start with `@`
    if valid_chars && valid_edges {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(Cow::Borrowed(
            "Username may contain only letters, digits, '_', '-' and '.'",
        )))
    }
}

/// Snowflake IDs travel as strings, but plain JSON numbers are accepted too
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(id) => Ok(id),
        RawId::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh/logout body; the token may come from the cookie instead
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Forgot password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

/// Change password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

/// Update user request; empty strings clear optional fields
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateProfileDto {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            username: req.username,
            display_name: req.display_name,
            avatar_url: req.avatar_url,
            bio: req.bio,
        }
    }
}

/// `GET /games` query string
#[derive(Debug, Default, Deserialize)]
pub struct GameSearchParams {
    /// Case-insensitive title search
    pub q: Option<String>,
    pub genre: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl GameSearchParams {
    pub fn page_request(&self) -> PageRequest {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
        .into()
    }
}

/// Create game request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,

    #[validate(length(max = 200))]
    pub developer: Option<String>,

    #[validate(length(max = 200))]
    pub publisher: Option<String>,

    pub release_date: Option<NaiveDate>,

    #[validate(url(message = "Cover URL must be a valid URL"))]
    pub cover_url: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 genres"))]
    pub genres: Vec<String>,
}

impl From<CreateGameRequest> for CreateGameDto {
    fn from(req: CreateGameRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            developer: req.developer,
            publisher: req.publisher,
            release_date: req.release_date,
            cover_url: req.cover_url,
            genres: req.genres,
        }
    }
}

/// Update game request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,

    #[validate(length(max = 200))]
    pub developer: Option<String>,

    #[validate(length(max = 200))]
    pub publisher: Option<String>,

    pub release_date: Option<NaiveDate>,

    #[validate(url(message = "Cover URL must be a valid URL"))]
    pub cover_url: Option<String>,

    #[validate(length(max = 20, message = "At most 20 genres"))]
    pub genres: Option<Vec<String>>,
}

impl From<UpdateGameRequest> for UpdateGameDto {
    fn from(req: UpdateGameRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            developer: req.developer,
            publisher: req.publisher,
            release_date: req.release_date,
            cover_url: req.cover_url,
            genres: req.genres,
        }
    }
}

/// Create review request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: i16,

    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Review must be 1-10000 characters"))]
    pub body: String,
}

impl From<CreateReviewRequest> for CreateReviewDto {
    fn from(req: CreateReviewRequest) -> Self {
        Self {
            rating: req.rating,
            title: req.title,
            body: req.body,
        }
    }
}

/// Update review request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: Option<i16>,

    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Review must be 1-10000 characters"))]
    pub body: Option<String>,
}

impl From<UpdateReviewRequest> for UpdateReviewDto {
    fn from(req: UpdateReviewRequest) -> Self {
        Self {
            rating: req.rating,
            title: req.title,
            body: req.body,
        }
    }
}

/// Create/update comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub body: String,
}

fn default_true() -> bool {
    true
}

/// Create game list request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

impl From<CreateListRequest> for CreateListDto {
    fn from(req: CreateListRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            is_public: req.is_public,
        }
    }
}

/// Update game list request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub is_public: Option<bool>,
}

impl From<UpdateListRequest> for UpdateListDto {
    fn from(req: UpdateListRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            is_public: req.is_public,
        }
    }
}

/// Add a game to a list
#[derive(Debug, Deserialize, Validate)]
pub struct AddListGameRequest {
    #[serde(deserialize_with = "deserialize_id")]
    pub game_id: i64,

    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// `GET /notifications` query string
#[derive(Debug, Default, Deserialize)]
pub struct NotificationParams {
    #[serde(default)]
    pub unread: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl NotificationParams {
    pub fn page_request(&self) -> PageRequest {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
        .into()
    }
}
