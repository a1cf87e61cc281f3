//! HTTP API
//!
//! Handlers are thin: they validate input, call one service and shape the
//! response DTO.

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
