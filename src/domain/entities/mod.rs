//! # Domain Entities
//!
//! Core domain entities of the game social network. Entities map to their
//! database tables; `*Details` types are read models joined with related
//! rows (author, counters).
//!
//! ## Core Entities
//!
//! - **User**: Account with authentication data, role and profile
//! - **Game**: Catalogue entry with derived rating statistics
//! - **Review**: A user's rating and text for a game, one per (user, game)
//! - **Comment**: A reply on a review
//! - **GameList**: A curated, optionally private list of games
//!
//! ## Supporting Entities
//!
//! - **Session**: Refresh-token backed login sessions
//! - **PasswordResetToken**: Hashed, single-use reset tokens
//! - **Notification**: Follow/like/comment events for a user
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod comment;
mod follow;
mod game;
mod game_list;
mod notification;
mod password_reset;
mod review;
mod session;
mod user;

pub use user::{User, UserRepository, UserRole, UserStats, UserSummary};

pub use session::{Session, SessionRepository};

pub use password_reset::{PasswordResetRepository, PasswordResetToken};

pub use game::{Game, GameQuery, GameRepository};

pub use review::{LikeRepository, Review, ReviewDetails, ReviewRepository};

pub use comment::{Comment, CommentDetails, CommentRepository};

pub use follow::FollowRepository;

pub use game_list::{GameList, GameListEntry, GameListRepository};

pub use notification::{Notification, NotificationDetails, NotificationKind, NotificationRepository};

#[cfg(test)]
pub use comment::MockCommentRepository;
#[cfg(test)]
pub use follow::MockFollowRepository;
#[cfg(test)]
pub use game::MockGameRepository;
#[cfg(test)]
pub use game_list::MockGameListRepository;
#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use password_reset::MockPasswordResetRepository;
#[cfg(test)]
pub use review::{MockLikeRepository, MockReviewRepository};
#[cfg(test)]
pub use session::MockSessionRepository;
#[cfg(test)]
pub use user::MockUserRepository;
