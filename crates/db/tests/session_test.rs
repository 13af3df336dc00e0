//! Integration tests for Session repository.

mod common;

use chrono::{Duration, Utc};
use tanzia_db::SessionRepository;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_session_create_and_find() {
    let db = common::setup().await;
    let user = common::create_test_user(&db).await;
    let repo = SessionRepository::new(db.clone());

    let (session, token) = repo
        .create(user.id, Utc::now() + Duration::hours(24))
        .await
        .expect("Failed to create session");

    assert_eq!(session.user_id, user.id);
    assert_eq!(session.token_hash, SessionRepository::hash_token(&token));
    assert!(session.revoked_at.is_none());

    let found = repo.find_active(&token).await.unwrap().unwrap();
    assert_eq!(found.id, session.id);
    assert_eq!(found.user_id, user.id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_revoked_session_is_not_active() {
    let db = common::setup().await;
    let user = common::create_test_user(&db).await;
    let repo = SessionRepository::new(db.clone());
    let (_, token) = repo
        .create(user.id, Utc::now() + Duration::hours(24))
        .await
        .unwrap();

    assert!(repo.revoke_by_token(&token).await.unwrap());
    assert!(!repo.revoke_by_token(&token).await.unwrap());

    assert!(repo.find_active(&token).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_unknown_token_is_not_active() {
    let db = common::setup().await;
    let repo = SessionRepository::new(db.clone());

    assert!(repo.find_active("not-a-token").await.unwrap().is_none());
}
