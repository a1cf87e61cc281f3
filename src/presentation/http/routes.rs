//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::presentation::middleware::{
    auth_middleware, optional_auth_middleware, rate_limit_auth, track_metrics,
    SecurityHeadersLayer,
};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(handlers::health::metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(SecurityHeadersLayer::for_api(state.settings.cookies.secure))
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes())
        .nest("/games", game_routes())
        .nest("/reviews", review_routes())
        .nest("/comments", comment_routes())
        .nest("/lists", list_routes())
        .nest("/notifications", notification_routes())
        .route("/feed", get(handlers::review::get_feed))
        // Identifies the caller on every API route; handlers decide whether it is required
        .layer(middleware::from_fn_with_state(state, optional_auth_middleware))
}

/// Authentication routes; credential endpoints are rate limited per client
fn auth_routes(state: AppState) -> Router<AppState> {
    let credential_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth));

    Router::new()
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
        .route("/change-password", post(handlers::auth::change_password))
        .merge(credential_routes)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/@me",
            get(handlers::user::get_current_user)
                .patch(handlers::user::update_current_user)
                .delete(handlers::user::delete_current_user),
        )
        .route("/@me/sessions", get(handlers::user::list_sessions))
        .route(
            "/@me/sessions/{session_id}",
            delete(handlers::user::revoke_session),
        )
        .route("/{username}", get(handlers::user::get_profile))
        .route("/{username}/reviews", get(handlers::user::get_user_reviews))
        .route("/{username}/followers", get(handlers::user::get_followers))
        .route("/{username}/following", get(handlers::user::get_following))
        .route("/{username}/lists", get(handlers::user::get_user_lists))
        .route(
            "/{username}/follow",
            post(handlers::user::follow_user).delete(handlers::user::unfollow_user),
        )
}

/// Catalogue routes; writes check the admin role in the handler
fn game_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::game::list_games).post(handlers::game::create_game),
        )
        .route(
            "/{game}",
            get(handlers::game::get_game)
                .patch(handlers::game::update_game)
                .delete(handlers::game::delete_game),
        )
        .route(
            "/{game}/reviews",
            get(handlers::game::list_game_reviews).post(handlers::game::create_review),
        )
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{review_id}",
            get(handlers::review::get_review)
                .patch(handlers::review::update_review)
                .delete(handlers::review::delete_review),
        )
        .route(
            "/{review_id}/like",
            post(handlers::review::like_review).delete(handlers::review::unlike_review),
        )
        .route(
            "/{review_id}/comments",
            get(handlers::review::list_comments).post(handlers::review::create_comment),
        )
}

fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/{comment_id}",
        patch(handlers::review::update_comment)
            .delete(handlers::review::delete_comment),
    )
}

fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::list::create_list))
        .route(
            "/{list_id}",
            get(handlers::list::get_list)
                .patch(handlers::list::update_list)
                .delete(handlers::list::delete_list),
        )
        .route("/{list_id}/games", post(handlers::list::add_game))
        .route(
            "/{list_id}/games/{game_id}",
            delete(handlers::list::remove_game),
        )
}

/// Inbox routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::notification::list_notifications))
        .route("/unread-count", get(handlers::notification::unread_count))
        .route("/read-all", post(handlers::notification::mark_all_read))
        .route(
            "/{notification_id}/read",
            post(handlers::notification::mark_read),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
