//! Authentication Service
//!
//! Handles registration, login, JWT access tokens, refresh-token sessions and
//! the password reset lifecycle.
//!
//! Token model:
//! - access tokens are short-lived HS256 JWTs (`purpose = access`)
//! - refresh tokens are opaque random strings; only their SHA-256 is stored,
//!   and every refresh rotates them
//! - reset tokens are HS256 JWTs (`purpose = password_reset`); only their
//!   SHA-256 is stored, one per user, and they are consumed on use

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{AuthSettings, JwtSettings};
use crate::domain::{
    Mailer, PasswordResetRepository, PasswordResetToken, Session, SessionRepository, User,
    UserRepository, UserRole,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and open a session
    async fn register(
        &self,
        registration: Registration,
        client: ClientInfo,
    ) -> Result<(User, AuthTokens), AuthError>;

    /// Authenticate user with credentials
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<(User, AuthTokens), AuthError>;

    /// Exchange a refresh token for a new token pair (rotation)
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke the session behind a refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Validate an access token
    async fn validate_token(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Issue and mail a password reset token; silent for unknown e-mails
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Consume a reset token and set a new password
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Change password after verifying the current one; ends all sessions
    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Active sessions of a user
    async fn list_sessions(&self, user_id: i64) -> Result<Vec<Session>, AuthError>;

    /// Revoke one of the user's own sessions
    async fn revoke_session(&self, user_id: i64, session_id: Uuid) -> Result<(), AuthError>;
}

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Client metadata recorded on the session
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
    pub token_type: String,
}

/// Identity carried by a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub role: UserRole,
}

/// What a signed token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    PasswordReset,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Unique token ID
    pub jti: String,
    pub purpose: TokenPurpose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Session not found")]
    UnknownSession,

    #[error(transparent)]
    Repository(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".into())
            }
            AuthError::IncorrectPassword => {
                AppError::Unauthorized("Current password is incorrect".into())
            }
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::SessionNotFound => {
                AppError::Unauthorized("Invalid or expired refresh token".into())
            }
            AuthError::InvalidResetToken => {
                AppError::BadRequest("Invalid or expired reset token".into())
            }
            AuthError::UserNotFound => AppError::NotFound("User not found".into()),
            AuthError::UnknownSession => AppError::NotFound("Session not found".into()),
            AuthError::EmailExists => AppError::Conflict("Email already exists".into()),
            AuthError::UsernameExists => AppError::Conflict("Username already exists".into()),
            AuthError::Repository(e) => e,
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Argon2id hashing with configurable cost.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl PasswordHashing {
    /// Build a hasher; `memory_kib` and `iterations` feed the Argon2 params.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AuthError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a PHC hash string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

/// SHA-256 hex digest used to store refresh and reset tokens
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lowercase, trimmed e-mail used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// AuthService implementation
pub struct AuthServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    reset_repo: Arc<dyn PasswordResetRepository>,
    mailer: Arc<dyn Mailer>,
    id_generator: Arc<SnowflakeGenerator>,
    hashing: PasswordHashing,
    jwt_settings: JwtSettings,
    auth_settings: AuthSettings,
}

impl AuthServiceImpl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        reset_repo: Arc<dyn PasswordResetRepository>,
        mailer: Arc<dyn Mailer>,
        id_generator: Arc<SnowflakeGenerator>,
        hashing: PasswordHashing,
        jwt_settings: JwtSettings,
        auth_settings: AuthSettings,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            reset_repo,
            mailer,
            id_generator,
            hashing,
            jwt_settings,
            auth_settings,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decode a token and require the given purpose
    fn decode_token(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 5;
        validation.set_issuer(&[self.jwt_settings.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        if token_data.claims.purpose != purpose {
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }

    fn refresh_lifetime(&self) -> Duration {
        Duration::days(self.jwt_settings.refresh_token_expiry_days)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: i64, role: UserRole) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let access_token = self.sign(&Claims {
            sub: user_id.to_string(),
            iss: self.jwt_settings.issuer.clone(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            purpose: TokenPurpose::Access,
            role: Some(role),
        })?;

        // Opaque refresh token, carries no user information
        let refresh_token = Alphanumeric.sample_string(&mut rand::rng(), REFRESH_TOKEN_LENGTH);

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            refresh_expires_in: self.refresh_lifetime().num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Issue tokens and persist a session for the refresh token
    async fn open_session(&self, user: &User, client: ClientInfo) -> Result<AuthTokens, AuthError> {
        let tokens = self.generate_tokens(user.id, user.role)?;

        let session = Session::new(
            user.id,
            hash_token(&tokens.refresh_token),
            Utc::now() + self.refresh_lifetime(),
        )
        .with_client(client.user_agent, client.ip_address);

        self.session_repo.create(&session).await?;

        Ok(tokens)
    }

    fn reset_url(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.auth_settings.frontend_url.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(
        &self,
        registration: Registration,
        client: ClientInfo,
    ) -> Result<(User, AuthTokens), AuthError> {
        let email = normalize_email(&registration.email);
        let username = registration.username.trim().to_string();

        if self.user_repo.email_exists(&email).await? {
            return Err(AuthError::EmailExists);
        }

        if self.user_repo.username_exists(&username).await? {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = self.hashing.hash(&registration.password)?;

        let role = if self.auth_settings.is_admin_email(&email) {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let now = Utc::now();
        let user = User {
            id: self.id_generator.generate(),
            username,
            email,
            password_hash,
            display_name: registration.display_name,
            avatar_url: None,
            bio: None,
            role,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.user_repo.create(&user).await?;
        let tokens = self.open_session(&created_user, client).await?;

        tracing::info!(user_id = created_user.id, role = %created_user.role, "User registered");

        Ok((created_user, tokens))
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<(User, AuthTokens), AuthError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hashing.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.open_session(&user, client).await?;

        Ok((user, tokens))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = hash_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if !session.is_active() {
            return Err(AuthError::SessionNotFound);
        }

        let user = self
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let new_tokens = self.generate_tokens(user.id, user.role)?;
        let rotated = self
            .session_repo
            .rotate(
                session.id,
                &token_hash,
                &hash_token(&new_tokens.refresh_token),
                Utc::now() + self.refresh_lifetime(),
            )
            .await?;

        if !rotated {
            // Lost a race against another refresh with the same token
            return Err(AuthError::SessionNotFound);
        }

        Ok(new_tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        if let Some(session) = self
            .session_repo
            .find_by_token_hash(&hash_token(refresh_token))
            .await?
        {
            self.session_repo.revoke(session.id).await?;
        }

        Ok(())
    }

    async fn validate_token(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode_token(access_token, TokenPurpose::Access)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id,
            role: claims.role.unwrap_or_default(),
        })
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let Some(user) = self.user_repo.find_by_email(&normalize_email(email)).await? else {
            tracing::debug!("Password reset requested for unknown e-mail");
            return Ok(());
        };

        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.jwt_settings.reset_token_expiry_minutes);

        let token = self.sign(&Claims {
            sub: user.id.to_string(),
            iss: self.jwt_settings.issuer.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            purpose: TokenPurpose::PasswordReset,
            role: None,
        })?;

        self.reset_repo
            .replace_for_user(&PasswordResetToken::new(
                user.id,
                hash_token(&token),
                expires_at,
            ))
            .await?;

        // Failing loudly here would reveal which addresses are registered
        if let Err(e) = self
            .mailer
            .send_password_reset(&user, &self.reset_url(&token))
            .await
        {
            tracing::error!(user_id = user.id, error = %e, "Failed to send password reset e-mail");
        }

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let claims = self
            .decode_token(token, TokenPurpose::PasswordReset)
            .map_err(|_| AuthError::InvalidResetToken)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidResetToken)?;

        let record = self
            .reset_repo
            .find_by_token_hash(&hash_token(token))
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if record.user_id != user_id || !record.is_usable() {
            return Err(AuthError::InvalidResetToken);
        }

        let password_hash = self.hashing.hash(new_password)?;

        // Token use and password write commit together; a concurrent reset
        // with the same token finds it used and changes nothing
        if !self.reset_repo.redeem(record.id, &password_hash).await? {
            return Err(AuthError::InvalidResetToken);
        }

        let revoked = self.session_repo.revoke_all_for_user(user_id, None).await?;
        tracing::info!(user_id, revoked_sessions = revoked, "Password reset completed");

        Ok(())
    }

    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.hashing.verify(current_password, &user.password_hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        let password_hash = self.hashing.hash(new_password)?;
        self.user_repo.update_password(user_id, &password_hash).await?;
        self.session_repo.revoke_all_for_user(user_id, None).await?;

        Ok(())
    }

    async fn list_sessions(&self, user_id: i64) -> Result<Vec<Session>, AuthError> {
        Ok(self.session_repo.find_active_by_user(user_id).await?)
    }

    async fn revoke_session(&self, user_id: i64, session_id: Uuid) -> Result<(), AuthError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(AuthError::UnknownSession)?;

        self.session_repo.revoke(session.id).await?;
        Ok(())
    }
}
