//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT tokens, sessions, password reset
//! - **UserService**: Account and profile management
//! - **GameService**: Game catalogue
//! - **ReviewService**: Reviews, likes and the following feed
//! - **CommentService**: Comments on reviews
//! - **FollowService**: Follow graph
//! - **GameListService**: Curated game lists
//! - **NotificationService**: Notification inbox

use std::sync::Arc;

use crate::config::Settings;
use crate::domain::{
    CommentRepository, FollowRepository, GameListRepository, GameRepository, LikeRepository,
    Mailer, NotificationRepository, PasswordResetRepository, ReviewRepository, SessionRepository,
    UserRepository,
};
use crate::shared::snowflake::SnowflakeGenerator;

pub mod auth_service;
pub mod comment_service;
pub mod follow_service;
pub mod game_list_service;
pub mod game_service;
pub mod notification_service;
pub mod review_service;
pub mod user_service;

pub use auth_service::{
    AuthError, AuthService, AuthServiceImpl, AuthTokens, AuthenticatedUser, Claims, ClientInfo,
    PasswordHashing, Registration,
};
pub use comment_service::{CommentError, CommentService, CommentServiceImpl};
pub use follow_service::{FollowError, FollowService, FollowServiceImpl};
pub use game_list_service::{
    CreateListDto, GameListDetails, GameListError, GameListService, GameListServiceImpl,
    UpdateListDto,
};
pub use game_service::{CreateGameDto, GameError, GameService, GameServiceImpl, UpdateGameDto};
pub use notification_service::{
    NotificationError, NotificationEvent, NotificationService, NotificationServiceImpl, Notifier,
};
pub use review_service::{
    CreateReviewDto, ReviewError, ReviewService, ReviewServiceImpl, UpdateReviewDto,
};
pub use user_service::{Profile, UpdateProfileDto, UserError, UserService, UserServiceImpl};

/// Every repository the services need, behind trait objects
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub password_resets: Arc<dyn PasswordResetRepository>,
    pub games: Arc<dyn GameRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub lists: Arc<dyn GameListRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

/// The wired service graph shared by all handlers
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub games: Arc<dyn GameService>,
    pub reviews: Arc<dyn ReviewService>,
    pub comments: Arc<dyn CommentService>,
    pub follows: Arc<dyn FollowService>,
    pub lists: Arc<dyn GameListService>,
    pub notifications: Arc<dyn NotificationService>,
}

impl Services {
    pub fn new(
        repos: Repositories,
        mailer: Arc<dyn Mailer>,
        id_generator: Arc<SnowflakeGenerator>,
        settings: &Settings,
    ) -> Result<Self, AuthError> {
        let hashing = PasswordHashing::new(
            settings.auth.argon2_memory_kib,
            settings.auth.argon2_iterations,
        )?;
        let notifier = Notifier::new(repos.notifications.clone(), id_generator.clone());

        Ok(Self {
            auth: Arc::new(AuthServiceImpl::new(
                repos.users.clone(),
                repos.sessions.clone(),
                repos.password_resets.clone(),
                mailer,
                id_generator.clone(),
                hashing,
                settings.jwt.clone(),
                settings.auth.clone(),
            )),
            users: Arc::new(UserServiceImpl::new(
                repos.users.clone(),
                repos.follows.clone(),
            )),
            games: Arc::new(GameServiceImpl::new(
                repos.games.clone(),
                id_generator.clone(),
            )),
            reviews: Arc::new(ReviewServiceImpl::new(
                repos.reviews.clone(),
                repos.likes.clone(),
                repos.games.clone(),
                notifier.clone(),
                id_generator.clone(),
            )),
            comments: Arc::new(CommentServiceImpl::new(
                repos.comments.clone(),
                repos.reviews.clone(),
                repos.users.clone(),
                notifier.clone(),
                id_generator.clone(),
            )),
            follows: Arc::new(FollowServiceImpl::new(
                repos.follows.clone(),
                repos.users.clone(),
                notifier,
            )),
            lists: Arc::new(GameListServiceImpl::new(
                repos.lists.clone(),
                repos.games.clone(),
                id_generator,
            )),
            notifications: Arc::new(NotificationServiceImpl::new(repos.notifications)),
        })
    }
}
