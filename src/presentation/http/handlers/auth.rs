//! Authentication Handlers
//!
//! Token pairs are returned in the body and mirrored into HttpOnly cookies
//! so browser clients never have to touch them.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::dto::request::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RefreshTokenRequest,
    RegisterRequest, ResetPasswordRequest,
};
use crate::application::dto::response::{AuthResponse, MessageResponse, TokenResponse};
use crate::application::services::AuthTokens;
use crate::config::CookieSettings;
use crate::infrastructure::metrics::record_auth_event;
use crate::presentation::http::extractors::RequestClient;
use crate::presentation::middleware::{AuthUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::shared::error::AppError;
use crate::shared::validation::ValidatedJson;
use crate::startup::AppState;

fn token_cookie(name: &'static str, value: String, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(settings.secure);
    cookie.set_same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

fn with_token_cookies(jar: CookieJar, tokens: &AuthTokens, settings: &CookieSettings) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        settings,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        settings,
    ))
}

/// Removal cookies must carry the same path and domain as the originals
pub(crate) fn without_token_cookies(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.remove(token_cookie(ACCESS_TOKEN_COOKIE, String::new(), settings))
        .remove(token_cookie(REFRESH_TOKEN_COOKIE, String::new(), settings))
}

/// Refresh token from an optional JSON body, falling back to the cookie
fn refresh_token_from(body: &Bytes, jar: &CookieJar) -> Result<Option<String>, AppError> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<RefreshTokenRequest>(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
            .refresh_token
    };

    Ok(from_body
        .or_else(|| {
            jar.get(REFRESH_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
        })
        .filter(|token| !token.is_empty()))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let result = state.services.auth.register(body.into(), client).await;
    record_auth_event("register", result.is_ok());
    let (user, tokens) = result?;

    let jar = with_token_cookies(jar, &tokens, &state.settings.cookies);
    Ok((StatusCode::CREATED, jar, Json(AuthResponse::new(user, tokens))))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    RequestClient(client): RequestClient,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let result = state
        .services
        .auth
        .authenticate(&body.email, &body.password, client)
        .await;
    record_auth_event("login", result.is_ok());
    let (user, tokens) = result?;

    let jar = with_token_cookies(jar, &tokens, &state.settings.cookies);
    Ok((jar, Json(AuthResponse::new(user, tokens))))
}

/// Rotate the refresh token and issue a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let token = refresh_token_from(&body, &jar)?
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".into()))?;

    let result = state.services.auth.refresh_token(&token).await;
    record_auth_event("refresh", result.is_ok());
    let tokens = result?;

    let jar = with_token_cookies(jar, &tokens, &state.settings.cookies);
    Ok((jar, Json(TokenResponse::from(tokens))))
}

/// Logout (revoke refresh token, clear cookies)
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, StatusCode), AppError> {
    if let Some(token) = refresh_token_from(&body, &jar)? {
        // Logging out with a stale token still clears the cookies
        if let Err(e) = state.services.auth.revoke_token(&token).await {
            tracing::warn!(error = %e, "Failed to revoke session on logout");
        }
    }

    let jar = without_token_cookies(jar, &state.settings.cookies);
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Start a password reset; the answer never reveals whether the e-mail exists
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state
        .services
        .auth
        .request_password_reset(&body.email)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "If the address is registered, a password reset link has been sent",
        )),
    ))
}

/// Set a new password with a reset token
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = state
        .services
        .auth
        .reset_password(&body.token, &body.new_password)
        .await;
    record_auth_event("password_reset", result.is_ok());
    result?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// Change the password of the signed-in user; every session ends
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let result = state
        .services
        .auth
        .change_password(auth_user.user_id, &body.current_password, &body.new_password)
        .await;
    record_auth_event("change_password", result.is_ok());
    result?;

    let jar = without_token_cookies(jar, &state.settings.cookies);
    Ok((
        jar,
        Json(MessageResponse::new(
            "Password changed; please sign in again",
        )),
    ))
}
