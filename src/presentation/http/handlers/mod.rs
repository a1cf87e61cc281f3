//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod game;
pub mod health;
pub mod list;
pub mod notification;
pub mod review;
pub mod user;
