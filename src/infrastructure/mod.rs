//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Mail delivery
//! - Prometheus metrics

pub mod database;
pub mod mail;
pub mod metrics;
pub mod repositories;
