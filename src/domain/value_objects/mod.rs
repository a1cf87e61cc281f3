//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **Rating**: A review score on the 1..=10 scale

mod rating;

pub use rating::*;
