//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - Accounts and profile counters
//! - **PgSessionRepository** - Refresh-token sessions
//! - **PgPasswordResetRepository** - Hashed password reset tokens
//! - **PgGameRepository** - Game catalogue with rating aggregates
//! - **PgReviewRepository** / **PgLikeRepository** - Reviews and likes
//! - **PgCommentRepository** - Review comments
//! - **PgFollowRepository** - Follow graph
//! - **PgGameListRepository** - Game lists and their entries
//! - **PgNotificationRepository** - Notification inbox

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::Repositories;

pub mod comment_repository;
pub mod follow_repository;
pub mod game_list_repository;
pub mod game_repository;
pub mod notification_repository;
pub mod password_reset_repository;
pub mod review_repository;
pub mod session_repository;
pub mod user_repository;

pub use comment_repository::PgCommentRepository;
pub use follow_repository::PgFollowRepository;
pub use game_list_repository::PgGameListRepository;
pub use game_repository::PgGameRepository;
pub use notification_repository::PgNotificationRepository;
pub use password_reset_repository::PgPasswordResetRepository;
pub use review_repository::{PgLikeRepository, PgReviewRepository};
pub use session_repository::PgSessionRepository;
pub use user_repository::PgUserRepository;

/// Wire every repository to the same connection pool
pub fn postgres(pool: PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        sessions: Arc::new(PgSessionRepository::new(pool.clone())),
        password_resets: Arc::new(PgPasswordResetRepository::new(pool.clone())),
        games: Arc::new(PgGameRepository::new(pool.clone())),
        reviews: Arc::new(PgReviewRepository::new(pool.clone())),
        likes: Arc::new(PgLikeRepository::new(pool.clone())),
        comments: Arc::new(PgCommentRepository::new(pool.clone())),
        follows: Arc::new(PgFollowRepository::new(pool.clone())),
        lists: Arc::new(PgGameListRepository::new(pool.clone())),
        notifications: Arc::new(PgNotificationRepository::new(pool)),
    }
}
