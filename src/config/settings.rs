//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Auth cookie attributes
    pub cookies: CookieSettings,

    /// Account policy (admins, links sent by e-mail)
    pub auth: AuthSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// Rate limiting configuration for the auth endpoints
    pub rate_limit: RateLimitSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Log output configuration
    pub logging: LoggingSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,

    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Enable only behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// `iss` claim written into and required from every token
    pub issuer: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,

    /// Password reset token expiry in minutes
    pub reset_token_expiry_minutes: i64,
}

/// Attributes of the `access_token` / `refresh_token` cookies.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieSettings {
    /// Only send cookies over HTTPS
    pub secure: bool,

    /// Optional cookie domain
    pub domain: Option<String>,
}

/// Account policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// E-mail addresses that receive the admin role on registration
    pub admin_emails: Vec<String>,

    /// Base URL of the web frontend, used to build password reset links
    pub frontend_url: String,

    /// Argon2id memory cost in KiB
    pub argon2_memory_kib: u32,

    /// Argon2id iteration count
    pub argon2_iterations: u32,
}

impl AuthSettings {
    /// Whether `email` is configured to receive the admin role.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-1023)
    pub machine_id: u16,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Requests allowed per client address per window, shared by the auth endpoints
    pub auth_requests_per_window: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`
    pub format: String,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::defaults(Config::builder(), &environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("auth.admin_emails")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "snowflake.machine_id",
                std::env::var("SNOWFLAKE_MACHINE_ID").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Built-in defaults for every optional key.
    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.trust_proxy_headers", false)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("jwt.issuer", "game-social")?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("jwt.reset_token_expiry_minutes", 30)?
            .set_default("cookies.secure", environment == "production")?
            .set_default("auth.admin_emails", Vec::<String>::new())?
            .set_default("auth.frontend_url", "http://localhost:4321")?
            .set_default("auth.argon2_memory_kib", 19 * 1024)?
            .set_default("auth.argon2_iterations", 2)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.epoch", crate::shared::snowflake::DEFAULT_EPOCH)?
            .set_default("rate_limit.auth_requests_per_window", 10)?
            .set_default("rate_limit.window_seconds", 60)?
            .set_default("cors.allowed_origins", vec!["http://localhost:4321"])?
            .set_default("logging.format", "pretty")
    }

    /// Reject configurations that would run insecurely.
    fn validate(settings: Self) -> Result<Self, ConfigError> {
        if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                settings.jwt.secret.len()
            )));
        }
        if settings.jwt.access_token_expiry_minutes <= 0
            || settings.jwt.refresh_token_expiry_days <= 0
            || settings.jwt.reset_token_expiry_minutes <= 0
        {
            return Err(ConfigError::Message(
                "JWT expiry settings must be positive".into(),
            ));
        }
        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether `email` is configured to receive the admin role.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.auth.is_admin_email(email)
    }
}
