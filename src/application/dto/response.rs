//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake IDs are rendered as
//! strings so JavaScript clients do not lose precision.

use serde::Serialize;

use crate::application::services::{AuthTokens, GameListDetails, Profile};
use crate::domain::{
    CommentDetails, Game, GameList, GameListEntry, NotificationDetails, ReviewDetails, Session,
    User, UserSummary,
};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Register/login response (user and tokens)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

impl AuthResponse {
    pub fn new(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: UserResponse::from_user(user, true),
            tokens: tokens.into(),
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl UserResponse {
    /// `include_email` is only set when the user views their own account
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: include_email.then_some(user.email),
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            role: user.role.as_str().to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Public profile with counters
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub followers_count: i64,
    pub following_count: i64,
    pub reviews_count: i64,
    pub is_following: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user: UserResponse::from_user(profile.user, false),
            followers_count: profile.stats.followers,
            following_count: profile.stats.following,
            reviews_count: profile.stats.reviews,
            is_following: profile.is_following,
        }
    }
}

/// Author/actor embedded in other resources
#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

/// Login session as listed under `/users/@me/sessions`
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: String,
    pub last_used_at: String,
    pub expires_at: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id.to_string(),
            user_agent: session.user_agent,
            ip_address: session.ip_address,
            created_at: session.created_at.to_rfc3339(),
            last_used_at: session.last_used_at.to_rfc3339(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

/// Game response
#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<String>,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub created_at: String,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id.to_string(),
            slug: game.slug,
            title: game.title,
            description: game.description,
            developer: game.developer,
            publisher: game.publisher,
            release_date: game.release_date.map(|d| d.to_string()),
            cover_url: game.cover_url,
            genres: game.genres,
            // One decimal is all the UI shows
            average_rating: game.average_rating.map(|r| (r * 10.0).round() / 10.0),
            review_count: game.review_count,
            created_at: game.created_at.to_rfc3339(),
        }
    }
}

/// Review response
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub game_id: String,
    pub game_title: String,
    pub game_slug: String,
    pub author: UserSummaryResponse,
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub liked_by_viewer: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ReviewDetails> for ReviewResponse {
    fn from(details: ReviewDetails) -> Self {
        let review = details.review;
        Self {
            id: review.id.to_string(),
            game_id: review.game_id.to_string(),
            game_title: details.game_title,
            game_slug: details.game_slug,
            author: details.author.into(),
            rating: review.rating,
            title: review.title,
            body: review.body,
            like_count: details.like_count,
            comment_count: details.comment_count,
            liked_by_viewer: details.liked_by_viewer,
            created_at: review.created_at.to_rfc3339(),
            updated_at: review.updated_at.to_rfc3339(),
        }
    }
}

/// Like state after a like/unlike
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Comment response
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub review_id: String,
    pub author: UserSummaryResponse,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentDetails> for CommentResponse {
    fn from(details: CommentDetails) -> Self {
        let comment = details.comment;
        Self {
            id: comment.id.to_string(),
            review_id: comment.review_id.to_string(),
            author: details.author.into(),
            body: comment.body,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.to_rfc3339(),
        }
    }
}

/// Game list response
#[derive(Debug, Serialize)]
pub struct GameListResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameList> for GameListResponse {
    fn from(list: GameList) -> Self {
        Self {
            id: list.id.to_string(),
            owner_id: list.user_id.to_string(),
            name: list.name,
            description: list.description,
            is_public: list.is_public,
            created_at: list.created_at.to_rfc3339(),
            updated_at: list.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameListEntryResponse {
    pub game_id: String,
    pub slug: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub position: i32,
    pub note: Option<String>,
    pub added_at: String,
}

impl From<GameListEntry> for GameListEntryResponse {
    fn from(entry: GameListEntry) -> Self {
        Self {
            game_id: entry.game_id.to_string(),
            slug: entry.slug,
            title: entry.title,
            cover_url: entry.cover_url,
            position: entry.position,
            note: entry.note,
            added_at: entry.added_at.to_rfc3339(),
        }
    }
}

/// Game list with its games in order
#[derive(Debug, Serialize)]
pub struct GameListDetailResponse {
    #[serde(flatten)]
    pub list: GameListResponse,
    pub games: Vec<GameListEntryResponse>,
}

impl From<GameListDetails> for GameListDetailResponse {
    fn from(details: GameListDetails) -> Self {
        Self {
            list: details.list.into(),
            games: details.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Notification response
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub kind: String,
    pub actor: UserSummaryResponse,
    pub review_id: Option<String>,
    pub comment_id: Option<String>,
    pub read: bool,
    pub created_at: String,
}

impl From<NotificationDetails> for NotificationResponse {
    fn from(details: NotificationDetails) -> Self {
        let n = details.notification;
        Self {
            id: n.id.to_string(),
            kind: n.kind.as_str().to_string(),
            actor: details.actor.into(),
            review_id: n.review_id.map(|id| id.to_string()),
            comment_id: n.comment_id.map(|id| id.to_string()),
            read: n.is_read(),
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedReadResponse {
    pub updated: u64,
}
