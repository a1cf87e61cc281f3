//! REST API endpoint tests

mod auth_tests;
mod game_tests;
mod list_tests;
mod social_tests;
