//! Authentication API Tests
//!
//! Registration, login, token refresh/rotation, logout, password reset and
//! session management.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{bearer, cookie, TestApp, ADMIN_EMAIL, TEST_PASSWORD};

fn set_cookies(response: &axum_test::TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "link",
            "email": "Link@Hyrule.example",
            "password": TEST_PASSWORD,
            "display_name": "Link",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "link");
    assert_eq!(body["user"]["email"], "link@hyrule.example");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert!(body["access_token"].as_str().unwrap().len() > 20);
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert!(body["user"].get("password_hash").is_none());

    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("access_token=") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
}

#[tokio::test]
async fn test_register_admin_email_gets_admin_role() {
    let app = TestApp::new();

    let admin = app.register_admin().await;

    let response = app.get_as("/api/v1/users/@me", &admin).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "admin");
    assert_eq!(body["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_register_duplicate_email_and_username_conflict() {
    let app = TestApp::new();
    let user = app.register().await;

    let same_email = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "someone_else",
            "email": user.email.to_uppercase(),
            "password": TEST_PASSWORD,
        }))
        .await;
    same_email.assert_status(StatusCode::CONFLICT);
    assert_eq!(same_email.json::<Value>()["message"], "Email already exists");

    let same_username = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": user.username,
            "email": "fresh@example.com",
            "password": TEST_PASSWORD,
        }))
        .await;
    same_username.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        same_username.json::<Value>()["message"],
        "Username already exists"
    );
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "-bad-",
            "email": "not-an-email",
            "password": "short",
        }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], 10007);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = TestApp::new();

    let missing = app.server.post("/api/v1/auth/register").json(&json!({})).await;
    missing.assert_status_bad_request();
    let body: Value = missing.json();
    assert_eq!(body["code"], 10002);
    assert!(body["message"].as_str().unwrap().contains("username"));

    let wrong_type = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": 42, "password": TEST_PASSWORD }))
        .await;
    wrong_type.assert_status_bad_request();
    assert_eq!(wrong_type.json::<Value>()["code"], 10002);

    let not_json = app
        .server
        .post("/api/v1/auth/login")
        .text("email=a@example.com")
        .await;
    not_json.assert_status_bad_request();
    assert_eq!(not_json.json::<Value>()["code"], 10002);
}

#[tokio::test]
async fn test_login_with_valid_and_invalid_credentials() {
    let app = TestApp::new();
    let user = app.register().await;

    let ok = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email.to_uppercase(), "password": TEST_PASSWORD }))
        .await;
    ok.assert_status_ok();
    assert_eq!(ok.json::<Value>()["user"]["id"], user.id.as_str());

    let wrong_password = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": "not-the-password" }))
        .await;
    wrong_password.assert_status_unauthorized();

    let unknown = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .await;
    unknown.assert_status_unauthorized();

    // Same message either way
    assert_eq!(
        wrong_password.json::<Value>()["message"],
        unknown.json::<Value>()["message"]
    );
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new();

    let missing = app.server.get("/api/v1/users/@me").await;
    missing.assert_status_unauthorized();
    assert_eq!(missing.json::<Value>()["message"], "Missing access token");

    let garbage = app
        .server
        .get("/api/v1/users/@me")
        .add_header(header::AUTHORIZATION, bearer("not.a.jwt"))
        .await;
    garbage.assert_status_unauthorized();
}

#[tokio::test]
async fn test_access_token_cookie_authenticates() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .get("/api/v1/users/@me")
        .add_header(header::COOKIE, cookie("access_token", &user.access_token))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["username"], user.username.as_str());
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let rotated = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, user.refresh_token);

    // The previous token is dead once rotated
    let replay = app
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await;
    replay.assert_status_unauthorized();

    let next = app
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": rotated }))
        .await;
    next.assert_status_ok();
}

#[tokio::test]
async fn test_refresh_reads_cookie_when_body_is_empty() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .post("/api/v1/auth/refresh")
        .add_header(header::COOKIE, cookie("refresh_token", &user.refresh_token))
        .await;

    response.assert_status_ok();
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("refresh_token=")));
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app.server.post("/api/v1/auth/refresh").await;

    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "Missing refresh token");
}

#[tokio::test]
async fn test_refresh_rejects_expired_session() {
    let app = TestApp::new();
    let user = app.register().await;
    app.store.expire_sessions_of(user.id.parse().unwrap());

    let response = app
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .post("/api/v1/auth/logout")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let refresh = app
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await;
    refresh.assert_status_unauthorized();
}

#[tokio::test]
async fn test_cookie_logout_clears_cookies() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .post("/api/v1/auth/logout")
        .add_header(header::COOKIE, cookie("refresh_token", &user.refresh_token))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("refresh_token=;") && c.contains("Max-Age=0")));
    app.server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_logout_with_unknown_token_still_succeeds() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/logout")
        .json(&json!({ "refresh_token": "never-issued" }))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let app = TestApp::new();
    let user = app.register().await;

    let unknown = app
        .server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": "ghost@example.com" }))
        .await;
    let known = app
        .server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await;

    unknown.assert_status(StatusCode::ACCEPTED);
    known.assert_status(StatusCode::ACCEPTED);
    assert_eq!(unknown.text(), known.text());
    assert_eq!(app.mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    let user = app.register().await;

    app.server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    let token = app.mailer.last_token_for(&user.id).unwrap();

    let reset = app
        .server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "a-brand-new-secret" }))
        .await;
    reset.assert_status_ok();
    assert_eq!(reset.json::<Value>()["message"], "Password has been reset");

    // Single use
    let again = app
        .server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "yet-another-secret" }))
        .await;
    again.assert_status_bad_request();

    // Existing sessions are revoked
    app.server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await
        .assert_status_unauthorized();

    app.server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await
        .assert_status_unauthorized();
    app.server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": "a-brand-new-secret" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_new_reset_request_replaces_previous_token() {
    let app = TestApp::new();
    let user = app.register().await;
    let request = json!({ "email": user.email });

    app.server
        .post("/api/v1/auth/forgot-password")
        .json(&request)
        .await
        .assert_status(StatusCode::ACCEPTED);
    let first = app.mailer.last_token_for(&user.id).unwrap();

    // jti differs even within the same second
    app.server
        .post("/api/v1/auth/forgot-password")
        .json(&request)
        .await
        .assert_status(StatusCode::ACCEPTED);
    let second = app.mailer.last_token_for(&user.id).unwrap();
    assert_ne!(first, second);
    assert_eq!(app.store.reset_tokens_for(user.id.parse().unwrap()).len(), 1);

    app.server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": first, "new_password": "a-brand-new-secret" }))
        .await
        .assert_status_bad_request();
    app.server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": second, "new_password": "a-brand-new-secret" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_expired_reset_token_changes_nothing() {
    let app = TestApp::new();
    let user = app.register().await;
    app.server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": user.email }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    let token = app.mailer.last_token_for(&user.id).unwrap();
    app.store.expire_reset_tokens_of(user.id.parse().unwrap());

    let response = app
        .server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "a-brand-new-secret" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid or expired reset token"
    );
    // Old password and sessions survive
    app.server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await
        .assert_status_ok();
    app.server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_reset_password_rejects_forged_token() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": "eyJhbGciOiJIUzI1NiJ9.e30.forged", "new_password": "a-brand-new-secret" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid or expired reset token"
    );
}

#[tokio::test]
async fn test_access_token_is_not_a_reset_token() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .post("/api/v1/auth/reset-password")
        .json(&json!({ "token": user.access_token, "new_password": "a-brand-new-secret" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let user = app.register().await;

    let wrong = app
        .post_as("/api/v1/auth/change-password", &user)
        .json(&json!({ "current_password": "guess-guess", "new_password": "a-brand-new-secret" }))
        .await;
    wrong.assert_status_unauthorized();

    let ok = app
        .post_as("/api/v1/auth/change-password", &user)
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "a-brand-new-secret" }))
        .await;
    ok.assert_status_ok();

    app.server
        .post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": user.refresh_token }))
        .await
        .assert_status_unauthorized();
    app.server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": "a-brand-new-secret" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_list_and_revoke_sessions() {
    let app = TestApp::new();
    let user = app.register().await;
    app.server
        .post("/api/v1/auth/login")
        .add_header(header::USER_AGENT, HeaderValue::from_static("integration-test"))
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await
        .assert_status_ok();

    let sessions: Vec<Value> = app.get_as("/api/v1/users/@me/sessions", &user).await.json();
    assert_eq!(sessions.len(), 2);
    assert!(sessions
        .iter()
        .any(|s| s["user_agent"] == "integration-test"));

    let session_id = sessions[0]["id"].as_str().unwrap();
    app.delete_as(&format!("/api/v1/users/@me/sessions/{}", session_id), &user)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let remaining: Vec<Value> = app.get_as("/api/v1/users/@me/sessions", &user).await.json();
    assert_eq!(remaining.len(), 1);

    app.delete_as(
        "/api/v1/users/@me/sessions/6f1c1a4e-0000-4000-8000-000000000000",
        &user,
    )
    .await
    .assert_status_not_found();
    app.delete_as("/api/v1/users/@me/sessions/not-a-uuid", &user)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_credential_endpoints_are_rate_limited() {
    let app = TestApp::with_settings(|s| s.rate_limit.auth_requests_per_window = 2);
    let attempt = json!({ "email": "nobody@example.com", "password": TEST_PASSWORD });

    let first = app.server.post("/api/v1/auth/login").json(&attempt).await;
    first.assert_status_unauthorized();
    assert_eq!(first.headers().get("x-ratelimit-limit").unwrap(), "2");

    app.server
        .post("/api/v1/auth/login")
        .json(&attempt)
        .await
        .assert_status_unauthorized();

    let limited = app.server.post("/api/v1/auth/login").json(&attempt).await;
    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().get(header::RETRY_AFTER).is_some());

    // Refresh is not a credential endpoint
    app.server
        .post("/api/v1/auth/refresh")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_forwarded_for_does_not_bypass_rate_limit() {
    let app = TestApp::with_settings(|s| s.rate_limit.auth_requests_per_window = 2);
    let attempt = json!({ "email": "nobody@example.com", "password": TEST_PASSWORD });

    let mut statuses = Vec::new();
    for hop in 1..=4 {
        let response = app
            .server
            .post("/api/v1/auth/login")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_str(&format!("203.0.113.{}", hop)).unwrap(),
            )
            .json(&attempt)
            .await;
        statuses.push(response.status_code());
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );

    // The budget covers every credential endpoint of the client
    app.server
        .post("/api/v1/auth/forgot-password")
        .json(&json!({ "email": "nobody@example.com" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_proxy_headers_identify_clients() {
    let app = TestApp::with_settings(|s| {
        s.rate_limit.auth_requests_per_window = 1;
        s.server.trust_proxy_headers = true;
    });
    let attempt = json!({ "email": "nobody@example.com", "password": TEST_PASSWORD });
    let from = |ip: &'static str| {
        (
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static(ip),
        )
    };

    for ip in ["198.51.100.1", "198.51.100.2"] {
        let (name, value) = from(ip);
        app.server
            .post("/api/v1/auth/login")
            .add_header(name, value)
            .json(&attempt)
            .await
            .assert_status_unauthorized();
    }

    let (name, value) = from("198.51.100.1");
    app.server
        .post("/api/v1/auth/login")
        .add_header(name, value)
        .json(&attempt)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
