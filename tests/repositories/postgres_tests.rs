//! PostgreSQL repository tests
//!
//! These need a disposable database and are ignored by default:
//! `TEST_DATABASE_URL=postgres://... cargo test --test integration_tests -- --ignored`

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use sqlx::PgPool;
use uuid::Uuid;

use game_social::application::services::Repositories;
use game_social::domain::{Game, GameList, PasswordResetToken, Session, User};
use game_social::infrastructure::database::run_migrations;
use game_social::infrastructure::repositories;
use game_social::shared::snowflake::{SnowflakeGenerator, DEFAULT_EPOCH};

static IDS: Lazy<SnowflakeGenerator> = Lazy::new(|| SnowflakeGenerator::new(9, DEFAULT_EPOCH));

async fn repos() -> Repositories {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect to test database");
    run_migrations(&pool).await.expect("run migrations");
    repositories::postgres(pool)
}

async fn create_user(repos: &Repositories) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    repos
        .users
        .create(&User {
            id: IDS.generate(),
            username: format!("u_{}", &tag[..12]),
            email: format!("{}@example.com", tag),
            password_hash: "original-hash".into(),
            ..User::default()
        })
        .await
        .unwrap()
}

async fn create_game(repos: &Repositories) -> Game {
    let now = Utc::now();
    let slug = format!("game-{}", Uuid::new_v4().simple());
    repos
        .games
        .create(&Game {
            id: IDS.generate(),
            title: slug.clone(),
            slug,
            description: None,
            developer: None,
            publisher: None,
            release_date: None,
            cover_url: None,
            genres: vec!["indie".into()],
            created_at: now,
            updated_at: now,
            average_rating: None,
            review_count: 0,
        })
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_rotate_swaps_hash_once() {
    let repos = repos().await;
    let user = create_user(&repos).await;
    let session = repos
        .sessions
        .create(&Session::new(user.id, "hash-a".into(), Utc::now() + Duration::days(7)))
        .await
        .unwrap();
    let expires = Utc::now() + Duration::days(7);

    assert!(repos
        .sessions
        .rotate(session.id, "hash-a", "hash-b", expires)
        .await
        .unwrap());
    // The old hash no longer matches
    assert!(!repos
        .sessions
        .rotate(session.id, "hash-a", "hash-c", expires)
        .await
        .unwrap());

    let current = repos.sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(current.refresh_token_hash, "hash-b");

    repos.sessions.revoke(session.id).await.unwrap();
    assert!(!repos
        .sessions
        .rotate(session.id, "hash-b", "hash-d", expires)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_add_game_appends_positions() {
    let repos = repos().await;
    let owner = create_user(&repos).await;
    let (first, second, third) = (
        create_game(&repos).await,
        create_game(&repos).await,
        create_game(&repos).await,
    );
    let now = Utc::now();
    let list = repos
        .lists
        .create(&GameList {
            id: IDS.generate(),
            user_id: owner.id,
            name: "Backlog".into(),
            description: None,
            is_public: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    assert!(repos.lists.add_game(list.id, first.id, Some("first".into())).await.unwrap());
    assert!(repos.lists.add_game(list.id, second.id, None).await.unwrap());
    assert!(!repos.lists.add_game(list.id, first.id, None).await.unwrap());

    assert!(repos.lists.remove_game(list.id, first.id).await.unwrap());
    assert!(repos.lists.add_game(list.id, third.id, None).await.unwrap());

    let entries = repos.lists.entries(list.id).await.unwrap();
    let positions: Vec<(i64, i32)> = entries.iter().map(|e| (e.game_id, e.position)).collect();
    assert_eq!(positions, vec![(second.id, 2), (third.id, 3)]);
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_redeem_reset_token_sets_password_once() {
    let repos = repos().await;
    let user = create_user(&repos).await;
    let token = repos
        .password_resets
        .replace_for_user(&PasswordResetToken::new(
            user.id,
            format!("reset-{}", Uuid::new_v4()),
            Utc::now() + Duration::minutes(30),
        ))
        .await
        .unwrap();

    assert!(repos.password_resets.redeem(token.id, "new-hash").await.unwrap());
    assert!(!repos.password_resets.redeem(token.id, "other-hash").await.unwrap());

    let stored = repos.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "new-hash");
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_expired_reset_token_leaves_password() {
    let repos = repos().await;
    let user = create_user(&repos).await;
    let token = repos
        .password_resets
        .replace_for_user(&PasswordResetToken::new(
            user.id,
            format!("reset-{}", Uuid::new_v4()),
            Utc::now() - Duration::minutes(1),
        ))
        .await
        .unwrap();

    assert!(!repos.password_resets.redeem(token.id, "new-hash").await.unwrap());

    let stored = repos.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "original-hash");
}
