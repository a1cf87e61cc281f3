//! # Domain Layer
//!
//! The domain layer contains the core business rules of the game social
//! network. It is independent of web frameworks and SQL.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, Game, Review, GameList, etc.)
//! - **value_objects**: Immutable value types (Rating)
//! - **services**: Domain services and ports (slugs, Mailer)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
