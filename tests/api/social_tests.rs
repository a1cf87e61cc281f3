//! Profiles, follows and notifications

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_profile_is_public_and_hides_email() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .server
        .get(&format!("/api/v1/users/{}", user.username))
        .await;

    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["username"], user.username.as_str());
    assert!(profile.get("email").is_none());
    assert_eq!(profile["followers_count"], 0);
    assert_eq!(profile["is_following"], false);

    app.server
        .get("/api/v1/users/nobody_here")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let user = app.register().await;
    let other = app.register().await;

    let response = app
        .patch_as("/api/v1/users/@me", &user)
        .json(&json!({ "display_name": "Samus", "bio": "Bounty hunter" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["display_name"], "Samus");
    assert_eq!(body["bio"], "Bounty hunter");

    let taken = app
        .patch_as("/api/v1/users/@me", &user)
        .json(&json!({ "username": other.username }))
        .await;
    taken.assert_status(StatusCode::CONFLICT);
    assert_eq!(taken.json::<Value>()["message"], "Username already taken");
}

#[tokio::test]
async fn test_delete_account() {
    let app = TestApp::new();
    let user = app.register().await;

    app.delete_as("/api/v1/users/@me", &user)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/v1/users/{}", user.username))
        .await
        .assert_status_not_found();
    app.server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let app = TestApp::new();
    let fan = app.register().await;
    let star = app.register().await;
    let follow_path = format!("/api/v1/users/{}/follow", star.username);

    // Following twice is not an error
    for _ in 0..2 {
        app.post_as(&follow_path, &fan)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    let profile: Value = app
        .get_as(&format!("/api/v1/users/{}", star.username), &fan)
        .await
        .json();
    assert_eq!(profile["followers_count"], 1);
    assert_eq!(profile["is_following"], true);

    let followers: Value = app
        .server
        .get(&format!("/api/v1/users/{}/followers", star.username))
        .await
        .json();
    assert_eq!(followers["total"], 1);
    assert_eq!(followers["items"][0]["username"], fan.username.as_str());

    let following: Value = app
        .server
        .get(&format!("/api/v1/users/{}/following", fan.username))
        .await
        .json();
    assert_eq!(following["items"][0]["username"], star.username.as_str());

    app.delete_as(&follow_path, &fan)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let profile: Value = app
        .server
        .get(&format!("/api/v1/users/{}", star.username))
        .await
        .json();
    assert_eq!(profile["followers_count"], 0);
}

#[tokio::test]
async fn test_follow_rules() {
    let app = TestApp::new();
    let user = app.register().await;

    app.post_as(&format!("/api/v1/users/{}/follow", user.username), &user)
        .await
        .assert_status_bad_request();
    app.post_as("/api/v1/users/ghost_user/follow", &user)
        .await
        .assert_status_not_found();
    app.server
        .post(&format!("/api/v1/users/{}/follow", user.username))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_notifications_for_follow_like_and_comment() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let author = app.register().await;
    let fan = app.register().await;
    let game = app.create_game(&admin, "Tunic", &[]).await;
    let review = app
        .create_review(&author, game["id"].as_str().unwrap(), 9)
        .await;
    let review_path = format!("/api/v1/reviews/{}", review["id"].as_str().unwrap());

    app.post_as(&format!("/api/v1/users/{}/follow", author.username), &fan)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.post_as(&format!("{}/like", review_path), &fan)
        .await
        .assert_status_ok();
    app.post_as(&format!("{}/comments", review_path), &fan)
        .json(&json!({ "body": "Foxes rule" }))
        .await
        .assert_status(StatusCode::CREATED);

    // Acting on your own content does not notify you
    app.post_as(&format!("{}/like", review_path), &author)
        .await
        .assert_status_ok();

    let count: Value = app
        .get_as("/api/v1/notifications/unread-count", &author)
        .await
        .json();
    assert_eq!(count["count"], 3);

    let inbox: Value = app.get_as("/api/v1/notifications", &author).await.json();
    let kinds: Vec<&str> = inbox["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["comment", "like", "follow"]);
    assert_eq!(inbox["items"][0]["actor"]["username"], fan.username.as_str());
    assert_eq!(inbox["items"][1]["review_id"], review["id"]);

    let first_id = inbox["items"][0]["id"].as_str().unwrap();
    app.post_as(&format!("/api/v1/notifications/{}/read", first_id), &author)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let unread: Value = app
        .get_as("/api/v1/notifications", &author)
        .add_query_param("unread", true)
        .await
        .json();
    assert_eq!(unread["total"], 2);

    let marked: Value = app
        .post_as("/api/v1/notifications/read-all", &author)
        .await
        .json();
    assert_eq!(marked["updated"], 2);

    let count: Value = app
        .get_as("/api/v1/notifications/unread-count", &author)
        .await
        .json();
    assert_eq!(count["count"], 0);
    let fan_count: Value = app
        .get_as("/api/v1/notifications/unread-count", &fan)
        .await
        .json();
    assert_eq!(fan_count["count"], 0);
}

#[tokio::test]
async fn test_notifications_are_private() {
    let app = TestApp::new();
    let owner = app.register().await;
    let other = app.register().await;
    app.post_as(&format!("/api/v1/users/{}/follow", owner.username), &other)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let inbox: Value = app.get_as("/api/v1/notifications", &owner).await.json();
    let id = inbox["items"][0]["id"].as_str().unwrap();

    app.post_as(&format!("/api/v1/notifications/{}/read", id), &other)
        .await
        .assert_status_not_found();
    app.server
        .get("/api/v1/notifications")
        .await
        .assert_status_unauthorized();
}
