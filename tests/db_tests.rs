//! Database integration tests
//!
//! These tests verify the TursoClient functionality using in-memory and
//! file-backed SQLite.

use postvote::db::{migrations, DatabaseProvider, TursoClient};
use postvote::types::{AppError, PostCreate};
use tempfile::TempDir;

/// Test helper to create a TursoClient with in-memory database
async fn create_test_client() -> TursoClient {
    TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database")
}

fn post(title: &str) -> PostCreate {
    PostCreate {
        title: title.to_string(),
        content: format!("{} content", title),
        published: true,
    }
}

#[tokio::test]
async fn test_create_memory_client() {
    let client = create_test_client().await;
    // Schema is in place as soon as the client exists
    let conn = client.connection().expect("connection");
    let applied = migrations::applied_versions(&conn).await.unwrap();
    assert_eq!(applied.len(), migrations::MIGRATIONS.len());
}

#[tokio::test]
async fn test_create_local_client_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("postvote.db");
    let provider = DatabaseProvider::SQLite {
        path: path.to_string_lossy().to_string(),
    };

    let user_id = {
        let client = provider.create_client().await.expect("open local database");
        client.create_user("persist@example.com", "hash").await.unwrap().id
    };

    assert!(path.exists());

    let reopened = provider.create_client().await.expect("reopen local database");
    let user = reopened.get_user(user_id).await.unwrap().expect("user persisted");
    assert_eq!(user.email, "persist@example.com");
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let client = create_test_client().await;

    assert!(client.migrate().await.unwrap().is_empty());
    assert!(client.migrate().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_and_get_user() {
    let client = create_test_client().await;

    let created = client
        .create_user("test@example.com", "$argon2id$v=19$stored")
        .await
        .unwrap();
    assert!(created.id > 0);

    let by_id = client.get_user(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "test@example.com");
    assert_eq!(by_id.password_hash, "$argon2id$v=19$stored");

    let by_email = client
        .get_user_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, created.id);

    assert!(client.get_user(created.id + 1).await.unwrap().is_none());
    assert!(client
        .get_user_by_email("missing@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_create_duplicate_user_fails() {
    let client = create_test_client().await;

    client.create_user("test@example.com", "hash").await.unwrap();
    let result = client.create_user("test@example.com", "other-hash").await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(client.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_crud() {
    let client = create_test_client().await;
    let owner = client.create_user("owner@example.com", "hash").await.unwrap();

    let created = client.create_post(owner.id, &post("First")).await.unwrap();
    assert_eq!(created.owner_id, owner.id);
    assert_eq!(created.owner.email, "owner@example.com");

    let changed = PostCreate {
        title: "Renamed".to_string(),
        content: "new".to_string(),
        published: false,
    };
    assert!(client.update_post(created.id, &changed).await.unwrap());
    let fetched = client.get_post(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.post.title, "Renamed");
    assert!(!fetched.post.published);

    assert!(!client.update_post(9999, &changed).await.unwrap());

    assert!(client.delete_post(created.id).await.unwrap());
    assert!(client.get_post(created.id).await.unwrap().is_none());
    assert!(!client.delete_post(created.id).await.unwrap());
}

#[tokio::test]
async fn test_list_posts_counts_votes() {
    let client = create_test_client().await;
    let a = client.create_user("a@example.com", "hash").await.unwrap();
    let b = client.create_user("b@example.com", "hash").await.unwrap();

    let first = client.create_post(a.id, &post("Alpha")).await.unwrap();
    let second = client.create_post(a.id, &post("Beta")).await.unwrap();

    client.add_vote(a.id, first.id).await.unwrap();
    client.add_vote(b.id, first.id).await.unwrap();
    client.add_vote(b.id, second.id).await.unwrap();

    let posts = client.list_posts(10, 0, "").await.unwrap();
    let votes: Vec<(i64, i64)> = posts.iter().map(|p| (p.post.id, p.votes)).collect();
    assert_eq!(votes, vec![(first.id, 2), (second.id, 1)]);

    let searched = client.list_posts(10, 0, "alp").await.unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].post.title, "Alpha");

    let paged = client.list_posts(1, 1, "").await.unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].post.id, second.id);
}

#[tokio::test]
async fn test_votes() {
    let client = create_test_client().await;
    let user = client.create_user("voter@example.com", "hash").await.unwrap();
    let target = client.create_post(user.id, &post("Target")).await.unwrap();

    assert!(!client.vote_exists(user.id, target.id).await.unwrap());
    client.add_vote(user.id, target.id).await.unwrap();
    assert!(client.vote_exists(user.id, target.id).await.unwrap());
    assert_eq!(client.count_votes(target.id).await.unwrap(), 1);

    let again = client.add_vote(user.id, target.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    assert!(client.remove_vote(user.id, target.id).await.unwrap());
    assert!(!client.remove_vote(user.id, target.id).await.unwrap());
    assert_eq!(client.count_votes(target.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_post_cascades_to_votes() {
    let client = create_test_client().await;
    let user = client.create_user("cascade@example.com", "hash").await.unwrap();
    let target = client.create_post(user.id, &post("Gone")).await.unwrap();

    client.add_vote(user.id, target.id).await.unwrap();
    client.delete_post(target.id).await.unwrap();

    assert!(!client.vote_exists(user.id, target.id).await.unwrap());
    assert_eq!(client.count_votes(target.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_vote_requires_existing_post() {
    let client = create_test_client().await;
    let user = client.create_user("orphan@example.com", "hash").await.unwrap();

    let result = client.add_vote(user.id, 9999).await;
    assert!(matches!(result, Err(AppError::Database(_))));
}
