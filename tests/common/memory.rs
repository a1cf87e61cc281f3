//! In-memory implementations of every repository trait.
//!
//! One `MemoryStore` backs all repositories so joins (review authors, like
//! counts, list entries) and cascades behave like the PostgreSQL schema.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use game_social::domain::{
    Comment, CommentDetails, CommentRepository, FollowRepository, Game, GameList, GameListEntry,
    GameListRepository, GameQuery, GameRepository, LikeRepository, Notification,
    NotificationDetails, NotificationRepository, PasswordResetRepository, PasswordResetToken,
    Review, ReviewDetails, ReviewRepository, Session, SessionRepository, User, UserRepository,
    UserStats, UserSummary,
};
use game_social::shared::error::AppError;
use game_social::shared::pagination::{Page, PageRequest};

#[derive(Debug, Clone)]
struct ListItem {
    list_id: i64,
    game_id: i64,
    position: i32,
    note: Option<String>,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct FollowEdge {
    follower_id: i64,
    followee_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Data {
    users: Vec<User>,
    sessions: Vec<Session>,
    resets: Vec<PasswordResetToken>,
    games: Vec<Game>,
    reviews: Vec<Review>,
    likes: HashSet<(i64, i64)>,
    comments: Vec<Comment>,
    follows: Vec<FollowEdge>,
    lists: Vec<GameList>,
    list_items: Vec<ListItem>,
    notifications: Vec<Notification>,
}

impl Data {
    fn summary(&self, user_id: i64) -> UserSummary {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(UserSummary::from)
            .unwrap_or(UserSummary {
                id: user_id,
                username: String::new(),
                display_name: None,
                avatar_url: None,
            })
    }

    fn with_stats(&self, game: &Game) -> Game {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.game_id == game.id)
            .map(|r| f64::from(r.rating))
            .collect();

        let mut game = game.clone();
        game.review_count = ratings.len() as i64;
        game.average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };
        game
    }

    fn review_details(&self, review: &Review, viewer_id: Option<i64>) -> ReviewDetails {
        let game = self.games.iter().find(|g| g.id == review.game_id);
        ReviewDetails {
            review: review.clone(),
            author: self.summary(review.user_id),
            game_title: game.map(|g| g.title.clone()).unwrap_or_default(),
            game_slug: game.map(|g| g.slug.clone()).unwrap_or_default(),
            like_count: self.likes.iter().filter(|(_, r)| *r == review.id).count() as i64,
            comment_count: self
                .comments
                .iter()
                .filter(|c| c.review_id == review.id)
                .count() as i64,
            liked_by_viewer: viewer_id.is_some_and(|v| self.likes.contains(&(v, review.id))),
        }
    }

    fn review_page<F>(&self, viewer_id: Option<i64>, page: PageRequest, filter: F) -> Page<ReviewDetails>
    where
        F: Fn(&Review) -> bool,
    {
        let mut reviews: Vec<&Review> = self.reviews.iter().filter(|r| filter(r)).collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let items = reviews
            .into_iter()
            .map(|r| self.review_details(r, viewer_id))
            .collect();
        paginate(items, page)
    }

    fn delete_review_cascade(&mut self, review_id: i64) {
        self.reviews.retain(|r| r.id != review_id);
        self.likes.retain(|(_, r)| *r != review_id);
        self.comments.retain(|c| c.review_id != review_id);
        self.notifications
            .retain(|n| n.review_id != Some(review_id));
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page::new(items, page, total)
}

/// Shared in-memory database
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap()
    }

    /// Stored reset token rows for a user (test inspection)
    pub fn reset_tokens_for(&self, user_id: i64) -> Vec<PasswordResetToken> {
        self.lock()
            .resets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Force a user's reset token past its expiry (test inspection)
    pub fn expire_reset_tokens_of(&self, user_id: i64) {
        let mut data = self.lock();
        for token in data.resets.iter_mut().filter(|t| t.user_id == user_id) {
            token.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }

    /// Force a session past its expiry (test inspection)
    pub fn expire_sessions_of(&self, user_id: i64) {
        let mut data = self.lock();
        for session in data.sessions.iter_mut().filter(|s| s.user_id == user_id) {
            session.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut data = self.lock();
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".into()));
        }
        if data.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        data.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut data = self.lock();
        if data
            .users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        let stored = data
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        *stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut data = self.lock();
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut data = self.lock();
        if !data.users.iter().any(|u| u.id == id) {
            return Err(AppError::NotFound("User not found".into()));
        }

        let owned_reviews: Vec<i64> = data
            .reviews
            .iter()
            .filter(|r| r.user_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in owned_reviews {
            data.delete_review_cascade(review_id);
        }

        let owned_lists: HashSet<i64> = data
            .lists
            .iter()
            .filter(|l| l.user_id == id)
            .map(|l| l.id)
            .collect();
        data.list_items.retain(|i| !owned_lists.contains(&i.list_id));
        data.lists.retain(|l| l.user_id != id);

        data.users.retain(|u| u.id != id);
        data.sessions.retain(|s| s.user_id != id);
        data.resets.retain(|t| t.user_id != id);
        data.likes.retain(|(u, _)| *u != id);
        data.comments.retain(|c| c.user_id != id);
        data.follows
            .retain(|f| f.follower_id != id && f.followee_id != id);
        data.notifications
            .retain(|n| n.user_id != id && n.actor_id != id);
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.lock().users.iter().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.lock().users.iter().any(|u| u.username == username))
    }

    async fn stats(&self, id: i64) -> Result<UserStats, AppError> {
        let data = self.lock();
        Ok(UserStats {
            followers: data.follows.iter().filter(|f| f.followee_id == id).count() as i64,
            following: data.follows.iter().filter(|f| f.follower_id == id).count() as i64,
            reviews: data.reviews.iter().filter(|r| r.user_id == id).count() as i64,
        })
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.lock().sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .find(|s| s.refresh_token_hash == token_hash && s.revoked_at.is_none())
            .cloned())
    }

    async fn find_active_by_user(&self, user_id: i64) -> Result<Vec<Session>, AppError> {
        let mut sessions: Vec<Session> = self
            .lock()
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active())
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(sessions)
    }

    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        self.lock().sessions.push(session.clone());
        Ok(session.clone())
    }

    async fn rotate(
        &self,
        id: Uuid,
        old_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut data = self.lock();
        let Some(session) = data
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.refresh_token_hash == old_hash && s.is_active())
        else {
            return Ok(false);
        };
        session.refresh_token_hash = new_hash.to_string();
        session.expires_at = expires_at;
        session.last_used_at = Utc::now();
        Ok(true)
    }

    async fn revoke(&self, id: Uuid) -> Result<(), AppError> {
        let mut data = self.lock();
        if let Some(session) = data
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.revoked_at.is_none())
        {
            session.revoked_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        except_session_id: Option<Uuid>,
    ) -> Result<u64, AppError> {
        let mut data = self.lock();
        let mut revoked = 0;
        for session in data.sessions.iter_mut().filter(|s| {
            s.user_id == user_id && s.revoked_at.is_none() && Some(s.id) != except_session_id
        }) {
            session.revoked_at = Some(Utc::now());
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let mut data = self.lock();
        let before = data.sessions.len();
        data.sessions.retain(|s| !s.is_expired());
        Ok((before - data.sessions.len()) as u64)
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryStore {
    async fn replace_for_user(
        &self,
        token: &PasswordResetToken,
    ) -> Result<PasswordResetToken, AppError> {
        let mut data = self.lock();
        data.resets.retain(|t| t.user_id != token.user_id);
        data.resets.push(token.clone());
        Ok(token.clone())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        Ok(self
            .lock()
            .resets
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn redeem(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let mut data = self.lock();
        let Some(user_id) = data
            .resets
            .iter()
            .find(|t| t.id == id && t.is_usable())
            .map(|t| t.user_id)
        else {
            return Ok(false);
        };
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();

        if let Some(token) = data.resets.iter_mut().find(|t| t.id == id) {
            token.used_at = Some(Utc::now());
        }
        Ok(true)
    }

    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let mut data = self.lock();
        let before = data.resets.len();
        data.resets.retain(|t| t.is_usable());
        Ok((before - data.resets.len()) as u64)
    }
}

#[async_trait]
impl GameRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Game>, AppError> {
        let data = self.lock();
        Ok(data
            .games
            .iter()
            .find(|g| g.id == id)
            .map(|g| data.with_stats(g)))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Game>, AppError> {
        let data = self.lock();
        Ok(data
            .games
            .iter()
            .find(|g| g.slug == slug)
            .map(|g| data.with_stats(g)))
    }

    async fn list(&self, query: &GameQuery, page: PageRequest) -> Result<Page<Game>, AppError> {
        let data = self.lock();
        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let mut games: Vec<Game> = data
            .games
            .iter()
            .filter(|g| {
                search
                    .as_ref()
                    .map_or(true, |s| g.title.to_lowercase().contains(s))
            })
            .filter(|g| query.genre.as_ref().map_or(true, |genre| g.has_genre(genre)))
            .map(|g| data.with_stats(g))
            .collect();
        games.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(paginate(games, page))
    }

    async fn create(&self, game: &Game) -> Result<Game, AppError> {
        let mut data = self.lock();
        if data.games.iter().any(|g| g.slug == game.slug) {
            return Err(AppError::Conflict(
                "A game with this title already exists".into(),
            ));
        }
        data.games.push(game.clone());
        Ok(data.with_stats(game))
    }

    async fn update(&self, game: &Game) -> Result<Game, AppError> {
        let mut data = self.lock();
        let stored = data
            .games
            .iter_mut()
            .find(|g| g.id == game.id)
            .ok_or_else(|| AppError::NotFound("Game not found".into()))?;
        *stored = Game {
            updated_at: Utc::now(),
            ..game.clone()
        };
        let updated = stored.clone();
        Ok(data.with_stats(&updated))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut data = self.lock();
        if !data.games.iter().any(|g| g.id == id) {
            return Err(AppError::NotFound("Game not found".into()));
        }
        let reviews: Vec<i64> = data
            .reviews
            .iter()
            .filter(|r| r.game_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in reviews {
            data.delete_review_cascade(review_id);
        }
        data.list_items.retain(|i| i.game_id != id);
        data.games.retain(|g| g.id != id);
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError> {
        Ok(self.lock().reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn find_details(
        &self,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<ReviewDetails>, AppError> {
        let data = self.lock();
        Ok(data
            .reviews
            .iter()
            .find(|r| r.id == id)
            .map(|r| data.review_details(r, viewer_id)))
    }

    async fn find_by_user_and_game(
        &self,
        user_id: i64,
        game_id: i64,
    ) -> Result<Option<Review>, AppError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.game_id == game_id)
            .cloned())
    }

    async fn list_for_game(
        &self,
        game_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError> {
        Ok(self
            .lock()
            .review_page(viewer_id, page, |r| r.game_id == game_id))
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<ReviewDetails>, AppError> {
        Ok(self
            .lock()
            .review_page(viewer_id, page, |r| r.user_id == user_id))
    }

    async fn feed(&self, user_id: i64, page: PageRequest) -> Result<Page<ReviewDetails>, AppError> {
        let data = self.lock();
        let followees: HashSet<i64> = data
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.followee_id)
            .collect();
        Ok(data.review_page(Some(user_id), page, |r| followees.contains(&r.user_id)))
    }

    async fn create(&self, review: &Review) -> Result<Review, AppError> {
        let mut data = self.lock();
        if !data.games.iter().any(|g| g.id == review.game_id) {
            return Err(AppError::NotFound("Game not found".into()));
        }
        if data
            .reviews
            .iter()
            .any(|r| r.user_id == review.user_id && r.game_id == review.game_id)
        {
            return Err(AppError::Conflict(
                "You have already reviewed this game".into(),
            ));
        }
        data.reviews.push(review.clone());
        Ok(review.clone())
    }

    async fn update(&self, review: &Review) -> Result<Review, AppError> {
        let mut data = self.lock();
        let stored = data
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| AppError::NotFound("Review not found".into()))?;
        stored.rating = review.rating;
        stored.title = review.title.clone();
        stored.body = review.body.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut data = self.lock();
        if !data.reviews.iter().any(|r| r.id == id) {
            return Err(AppError::NotFound("Review not found".into()));
        }
        data.delete_review_cascade(id);
        Ok(())
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn like(&self, user_id: i64, review_id: i64) -> Result<bool, AppError> {
        let mut data = self.lock();
        if !data.reviews.iter().any(|r| r.id == review_id) {
            return Err(AppError::NotFound("Review not found".into()));
        }
        Ok(data.likes.insert((user_id, review_id)))
    }

    async fn unlike(&self, user_id: i64, review_id: i64) -> Result<bool, AppError> {
        Ok(self.lock().likes.remove(&(user_id, review_id)))
    }

    async fn count(&self, review_id: i64) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .likes
            .iter()
            .filter(|(_, r)| *r == review_id)
            .count() as i64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.lock().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_review(
        &self,
        review_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentDetails>, AppError> {
        let data = self.lock();
        let mut comments: Vec<&Comment> = data
            .comments
            .iter()
            .filter(|c| c.review_id == review_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let items = comments
            .into_iter()
            .map(|c| CommentDetails {
                comment: c.clone(),
                author: data.summary(c.user_id),
            })
            .collect();
        Ok(paginate(items, page))
    }

    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        let mut data = self.lock();
        if !data.reviews.iter().any(|r| r.id == comment.review_id) {
            return Err(AppError::NotFound("Review not found".into()));
        }
        data.comments.push(comment.clone());
        Ok(comment.clone())
    }

    async fn update_body(&self, id: i64, body: &str) -> Result<Comment, AppError> {
        let mut data = self.lock();
        let comment = data
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
        comment.body = body.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut data = self.lock();
        if !data.comments.iter().any(|c| c.id == id) {
            return Err(AppError::NotFound("Comment not found".into()));
        }
        data.comments.retain(|c| c.id != id);
        data.notifications.retain(|n| n.comment_id != Some(id));
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut data = self.lock();
        if data
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.followee_id == followee_id)
        {
            return Ok(false);
        }
        data.follows.push(FollowEdge {
            follower_id,
            followee_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut data = self.lock();
        let before = data.follows.len();
        data.follows
            .retain(|f| !(f.follower_id == follower_id && f.followee_id == followee_id));
        Ok(data.follows.len() < before)
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.followee_id == followee_id))
    }

    async fn followers(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, AppError> {
        let data = self.lock();
        let mut edges: Vec<&FollowEdge> =
            data.follows.iter().filter(|f| f.followee_id == user_id).collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let items = edges.iter().map(|f| data.summary(f.follower_id)).collect();
        Ok(paginate(items, page))
    }

    async fn following(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserSummary>, AppError> {
        let data = self.lock();
        let mut edges: Vec<&FollowEdge> =
            data.follows.iter().filter(|f| f.follower_id == user_id).collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let items = edges.iter().map(|f| data.summary(f.followee_id)).collect();
        Ok(paginate(items, page))
    }
}

#[async_trait]
impl GameListRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<GameList>, AppError> {
        Ok(self.lock().lists.iter().find(|l| l.id == id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        include_private: bool,
    ) -> Result<Vec<GameList>, AppError> {
        let mut lists: Vec<GameList> = self
            .lock()
            .lists
            .iter()
            .filter(|l| l.user_id == user_id && (l.is_public || include_private))
            .cloned()
            .collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(lists)
    }

    async fn create(&self, list: &GameList) -> Result<GameList, AppError> {
        let mut data = self.lock();
        if data
            .lists
            .iter()
            .any(|l| l.user_id == list.user_id && l.name == list.name)
        {
            return Err(AppError::Conflict(
                "You already have a list with this name".into(),
            ));
        }
        data.lists.push(list.clone());
        Ok(list.clone())
    }

    async fn update(&self, list: &GameList) -> Result<GameList, AppError> {
        let mut data = self.lock();
        if data
            .lists
            .iter()
            .any(|l| l.id != list.id && l.user_id == list.user_id && l.name == list.name)
        {
            return Err(AppError::Conflict(
                "You already have a list with this name".into(),
            ));
        }
        let stored = data
            .lists
            .iter_mut()
            .find(|l| l.id == list.id)
            .ok_or_else(|| AppError::NotFound("List not found".into()))?;
        stored.name = list.name.clone();
        stored.description = list.description.clone();
        stored.is_public = list.is_public;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut data = self.lock();
        if !data.lists.iter().any(|l| l.id == id) {
            return Err(AppError::NotFound("List not found".into()));
        }
        data.list_items.retain(|i| i.list_id != id);
        data.lists.retain(|l| l.id != id);
        Ok(())
    }

    async fn entries(&self, list_id: i64) -> Result<Vec<GameListEntry>, AppError> {
        let data = self.lock();
        let mut items: Vec<&ListItem> =
            data.list_items.iter().filter(|i| i.list_id == list_id).collect();
        items.sort_by_key(|i| i.position);
        Ok(items
            .into_iter()
            .filter_map(|item| {
                data.games
                    .iter()
                    .find(|g| g.id == item.game_id)
                    .map(|game| GameListEntry {
                        game_id: game.id,
                        slug: game.slug.clone(),
                        title: game.title.clone(),
                        cover_url: game.cover_url.clone(),
                        position: item.position,
                        note: item.note.clone(),
                        added_at: item.added_at,
                    })
            })
            .collect())
    }

    async fn add_game(
        &self,
        list_id: i64,
        game_id: i64,
        note: Option<String>,
    ) -> Result<bool, AppError> {
        let mut data = self.lock();
        if !data.games.iter().any(|g| g.id == game_id) {
            return Err(AppError::NotFound("Game not found".into()));
        }
        if data
            .list_items
            .iter()
            .any(|i| i.list_id == list_id && i.game_id == game_id)
        {
            return Ok(false);
        }
        let position = data
            .list_items
            .iter()
            .filter(|i| i.list_id == list_id)
            .map(|i| i.position)
            .max()
            .unwrap_or(0)
            + 1;
        data.list_items.push(ListItem {
            list_id,
            game_id,
            position,
            note,
            added_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_game(&self, list_id: i64, game_id: i64) -> Result<bool, AppError> {
        let mut data = self.lock();
        let before = data.list_items.len();
        data.list_items
            .retain(|i| !(i.list_id == list_id && i.game_id == game_id));
        Ok(data.list_items.len() < before)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create(&self, notification: &Notification) -> Result<(), AppError> {
        self.lock().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<NotificationDetails>, AppError> {
        let data = self.lock();
        let mut notifications: Vec<&Notification> = data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || n.read_at.is_none()))
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let items = notifications
            .into_iter()
            .map(|n| NotificationDetails {
                notification: n.clone(),
                actor: data.summary(n.actor_id),
            })
            .collect();
        Ok(paginate(items, page))
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
            .count() as i64)
    }

    async fn mark_read(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        let mut data = self.lock();
        let Some(notification) = data
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        else {
            return Ok(false);
        };
        notification.read_at.get_or_insert_with(Utc::now);
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, AppError> {
        let mut data = self.lock();
        let mut updated = 0;
        for notification in data
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
        {
            notification.read_at = Some(Utc::now());
            updated += 1;
        }
        Ok(updated)
    }
}
