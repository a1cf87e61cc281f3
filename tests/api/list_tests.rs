//! Curated game list API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{TestApp, TestUser};

async fn create_list(app: &TestApp, owner: &TestUser, name: &str, is_public: bool) -> Value {
    let response = app
        .post_as("/api/v1/lists", owner)
        .json(&json!({ "name": name, "is_public": is_public }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_list_lifecycle() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let owner = app.register().await;
    let hades = app.create_game(&admin, "Hades", &[]).await;
    let celeste = app.create_game(&admin, "Celeste", &[]).await;

    let list = create_list(&app, &owner, "Roguelikes and friends", true).await;
    assert_eq!(list["owner_id"], owner.id.as_str());
    assert_eq!(list["is_public"], true);
    let list_path = format!("/api/v1/lists/{}", list["id"].as_str().unwrap());
    let games_path = format!("{}/games", list_path);

    let added = app
        .post_as(&games_path, &owner)
        .json(&json!({ "game_id": hades["id"], "note": "Start here" }))
        .await;
    added.assert_status(StatusCode::CREATED);
    app.post_as(&games_path, &owner)
        .json(&json!({ "game_id": celeste["id"] }))
        .await
        .assert_status(StatusCode::CREATED);

    let detail: Value = app.server.get(&list_path).await.json();
    assert_eq!(detail["name"], "Roguelikes and friends");
    assert_eq!(detail["games"][0]["slug"], "hades");
    assert_eq!(detail["games"][0]["position"], 1);
    assert_eq!(detail["games"][0]["note"], "Start here");
    assert_eq!(detail["games"][1]["slug"], "celeste");

    app.post_as(&games_path, &owner)
        .json(&json!({ "game_id": hades["id"] }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let hades_path = format!("{}/{}", games_path, hades["id"].as_str().unwrap());
    app.delete_as(&hades_path, &owner)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.delete_as(&hades_path, &owner)
        .await
        .assert_status_not_found();

    let renamed: Value = app
        .patch_as(&list_path, &owner)
        .json(&json!({ "name": "Platformers", "is_public": false }))
        .await
        .json();
    assert_eq!(renamed["name"], "Platformers");
    assert_eq!(renamed["is_public"], false);

    app.delete_as(&list_path, &owner)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.get_as(&list_path, &owner)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_adding_unknown_game_is_not_found() {
    let app = TestApp::new();
    let owner = app.register().await;
    let list = create_list(&app, &owner, "Backlog", true).await;

    app.post_as(
        &format!("/api/v1/lists/{}/games", list["id"].as_str().unwrap()),
        &owner,
    )
    .json(&json!({ "game_id": "987654321" }))
    .await
    .assert_status_not_found();
}

#[tokio::test]
async fn test_private_lists_are_hidden_from_others() {
    let app = TestApp::new();
    let owner = app.register().await;
    let other = app.register().await;
    let secret = create_list(&app, &owner, "Guilty pleasures", false).await;
    create_list(&app, &owner, "Favourites", true).await;
    let path = format!("/api/v1/lists/{}", secret["id"].as_str().unwrap());

    app.get_as(&path, &owner).await.assert_status_ok();
    app.get_as(&path, &other).await.assert_status_not_found();
    app.server.get(&path).await.assert_status_not_found();

    // Not even the existence leaks through writes
    app.patch_as(&path, &other)
        .json(&json!({ "name": "Mine now" }))
        .await
        .assert_status_not_found();

    let lists_path = format!("/api/v1/users/{}/lists", owner.username);
    let as_owner: Vec<Value> = app.get_as(&lists_path, &owner).await.json();
    let as_other: Vec<Value> = app.get_as(&lists_path, &other).await.json();
    assert_eq!(as_owner.len(), 2);
    assert_eq!(as_other.len(), 1);
    assert_eq!(as_other[0]["name"], "Favourites");
}

#[tokio::test]
async fn test_only_owner_modifies_public_list() {
    let app = TestApp::new();
    let owner = app.register().await;
    let other = app.register().await;
    let list = create_list(&app, &owner, "Co-op nights", true).await;
    let path = format!("/api/v1/lists/{}", list["id"].as_str().unwrap());

    app.patch_as(&path, &other)
        .json(&json!({ "name": "Solo nights" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.delete_as(&path, &other)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .delete(&path)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_list_names_are_unique_per_owner() {
    let app = TestApp::new();
    let owner = app.register().await;
    let other = app.register().await;
    create_list(&app, &owner, "Top 10", true).await;

    app.post_as("/api/v1/lists", &owner)
        .json(&json!({ "name": "Top 10" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    // Another user may reuse the name
    create_list(&app, &other, "Top 10", true).await;
}
