//! # Game Social Library
//!
//! REST backend for a social network around video games: reviews and
//! ratings, follows and a feed, likes and comments, curated game lists and
//! notifications, on top of a JWT + refresh-session auth core.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, the rating value object and repository traits
//! - **Application Layer**: Business services and DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, mail, metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! game_social/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, mail and metrics implementations
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Common utilities (errors, snowflake IDs, pagination)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
