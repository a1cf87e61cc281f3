//! Game catalogue API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn test_only_admins_create_games() {
    let app = TestApp::new();
    let user = app.register().await;
    let body = json!({ "title": "Hades" });

    app.server
        .post("/api/v1/games")
        .json(&body)
        .await
        .assert_status_unauthorized();

    let forbidden = app.post_as("/api/v1/games", &user).json(&body).await;
    forbidden.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(forbidden.json::<Value>()["message"], "Admin role required");
}

#[tokio::test]
async fn test_create_game_derives_slug_and_normalizes_genres() {
    let app = TestApp::new();
    let admin = app.register_admin().await;

    let response = app
        .post_as("/api/v1/games", &admin)
        .json(&json!({
            "title": "Baldur's Gate 3",
            "developer": "Larian Studios",
            "release_date": "2023-08-03",
            "genres": ["RPG", " rpg ", "Strategy"],
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let game: Value = response.json();
    assert_eq!(game["slug"], "baldurs-gate-3");
    assert_eq!(game["release_date"], "2023-08-03");
    assert_eq!(game["genres"], json!(["rpg", "strategy"]));
    assert_eq!(game["review_count"], 0);
    assert!(game["average_rating"].is_null());
}

#[tokio::test]
async fn test_duplicate_title_conflicts() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    app.create_game(&admin, "Celeste", &[]).await;

    let response = app
        .post_as("/api/v1/games", &admin)
        .json(&json!({ "title": "CELESTE!" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_title_without_usable_characters_is_rejected() {
    let app = TestApp::new();
    let admin = app.register_admin().await;

    let response = app
        .post_as("/api/v1/games", &admin)
        .json(&json!({ "title": "???" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_get_game_by_slug_or_id() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let game = app.create_game(&admin, "Hollow Knight", &["metroidvania"]).await;
    let id = game["id"].as_str().unwrap();

    let by_slug: Value = app.server.get("/api/v1/games/hollow-knight").await.json();
    let by_id: Value = app.server.get(&format!("/api/v1/games/{}", id)).await.json();
    assert_eq!(by_slug["id"], id);
    assert_eq!(by_id["slug"], "hollow-knight");

    app.server
        .get("/api/v1/games/silksong")
        .await
        .assert_status_not_found();
    app.server
        .get("/api/v1/games/123456")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_get_game_with_numeric_title_by_slug() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let game = app.create_game(&admin, "1942", &["shooter"]).await;
    assert_eq!(game["slug"], "1942");

    let response = app.server.get("/api/v1/games/1942").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], game["id"]);
}

#[tokio::test]
async fn test_list_games_search_genre_and_pagination() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    app.create_game(&admin, "Dark Souls", &["action", "rpg"]).await;
    app.create_game(&admin, "Dark Souls III", &["action", "rpg"]).await;
    app.create_game(&admin, "Stardew Valley", &["simulation"]).await;

    let all: Value = app.server.get("/api/v1/games").await.json();
    assert_eq!(all["total"], 3);
    // Ordered by title
    assert_eq!(all["items"][0]["title"], "Dark Souls");
    assert_eq!(all["items"][2]["title"], "Stardew Valley");

    let search: Value = app
        .server
        .get("/api/v1/games")
        .add_query_param("q", "souls")
        .await
        .json();
    assert_eq!(search["total"], 2);

    let genre: Value = app
        .server
        .get("/api/v1/games")
        .add_query_param("genre", "Simulation")
        .await
        .json();
    assert_eq!(genre["total"], 1);
    assert_eq!(genre["items"][0]["slug"], "stardew-valley");

    let page: Value = app
        .server
        .get("/api/v1/games")
        .add_query_param("page", 2)
        .add_query_param("per_page", 2)
        .await
        .json();
    assert_eq!(page["page"], 2);
    assert_eq!(page["per_page"], 2);
    assert_eq!(page["total"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_game_keeps_slug() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let game = app.create_game(&admin, "Portal", &[]).await;
    let path = format!("/api/v1/games/{}", game["id"].as_str().unwrap());

    let response = app
        .patch_as(&path, &admin)
        .json(&json!({ "title": "Portal (2007)", "publisher": "Valve" }))
        .await;

    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["title"], "Portal (2007)");
    assert_eq!(updated["publisher"], "Valve");
    assert_eq!(updated["slug"], "portal");
}

#[tokio::test]
async fn test_delete_game_removes_its_reviews() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let reviewer = app.register().await;
    let game = app.create_game(&admin, "Inside", &[]).await;
    let game_id = game["id"].as_str().unwrap();
    let review = app.create_review(&reviewer, game_id, 8).await;

    let path = format!("/api/v1/games/{}", game_id);
    app.delete_as(&path, &reviewer)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.delete_as(&path, &admin)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server.get(&path).await.assert_status_not_found();
    app.server
        .get(&format!("/api/v1/reviews/{}", review["id"].as_str().unwrap()))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_rating_statistics_follow_reviews() {
    let app = TestApp::new();
    let admin = app.register_admin().await;
    let game = app.create_game(&admin, "Outer Wilds", &[]).await;
    let game_id = game["id"].as_str().unwrap();

    for rating in [10, 7] {
        let reviewer = app.register().await;
        app.create_review(&reviewer, game_id, rating).await;
    }

    let game: Value = app.server.get("/api/v1/games/outer-wilds").await.json();
    assert_eq!(game["review_count"], 2);
    assert_eq!(game["average_rating"], 8.5);
}

#[tokio::test]
async fn test_malformed_game_id_is_bad_request() {
    let app = TestApp::new();

    let response = app.server.get("/api/v1/games/not-a-number/reviews").await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["message"], "Invalid game ID");
}
