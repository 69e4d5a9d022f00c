//! Integration tests for the retention sweep.

mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::TestServer;
use serde_json::{Value, json};
use stash_server::run_sweep;
use stash_storage::{
    FilesystemRepository, ItemRepository, ItemStore, StorageError, StorageResult,
};
use std::time::Duration;
use tower::ServiceExt;

const SEVEN_DAYS: Duration = Duration::from_secs(7 * 86_400);

/// Create an item through the API and return its ID.
async fn create_item(server: &TestServer, body: Value) -> String {
    let secret = server.auth_secret();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/json")
        .header("Authorization", secret)
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn sweep_purges_items_older_than_threshold() {
    let server = TestServer::new().await;

    let id = create_item(&server, json!({"title": "t"})).await;
    server.write_item_file("disk-only", &json!({"title": "old"}));
    assert!(server.state.items.contains(&id).await);

    // Give the files a measurable age, then sweep with a zero threshold so
    // everything on disk qualifies as expired.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stats = run_sweep(
        &server.state.items,
        server.state.repository.as_ref(),
        Duration::ZERO,
    )
    .await;

    assert_eq!(stats.scanned, 2);
    assert_eq!(stats.deleted, 2);
    assert_eq!(stats.errors, 0);

    // Both stores are reconciled.
    assert!(!server.item_file(&id).exists());
    assert!(!server.item_file("disk-only").exists());
    assert!(server.state.items.is_empty().await);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri(format!("/json/{id}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sweep_retains_items_younger_than_threshold() {
    let server = TestServer::new().await;

    let id = create_item(&server, json!({"title": "t"})).await;

    let stats = run_sweep(
        &server.state.items,
        server.state.repository.as_ref(),
        SEVEN_DAYS,
    )
    .await;

    assert_eq!(stats.scanned, 1);
    assert_eq!(stats.deleted, 0);
    assert!(server.item_file(&id).exists());
    assert!(server.state.items.contains(&id).await);
}

#[tokio::test]
async fn sweep_of_empty_repository_is_a_no_op() {
    let server = TestServer::new().await;

    let stats = run_sweep(
        &server.state.items,
        server.state.repository.as_ref(),
        Duration::ZERO,
    )
    .await;

    assert_eq!(stats.scanned, 0);
    assert_eq!(stats.deleted, 0);
    assert_eq!(stats.errors, 0);
}

/// Repository wrapper that refuses to delete one designated item.
struct StubbornRepository {
    inner: FilesystemRepository,
    fail_id: String,
}

#[async_trait]
impl ItemRepository for StubbornRepository {
    async fn write(&self, id: &str, value: &Value) -> StorageResult<()> {
        self.inner.write(id, value).await
    }

    async fn read(&self, id: &str) -> StorageResult<Value> {
        self.inner.read(id).await
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        if id == self.fail_id {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "deletion refused",
            )));
        }
        self.inner.delete(id).await
    }

    async fn list_ids(&self) -> StorageResult<Vec<String>> {
        self.inner.list_ids().await
    }

    async fn stat_age(&self, id: &str) -> StorageResult<Duration> {
        self.inner.stat_age(id).await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn sweep_continues_past_individual_failures() {
    let dir = tempfile::tempdir().unwrap();
    let repository = StubbornRepository {
        inner: FilesystemRepository::new(dir.path()).await.unwrap(),
        fail_id: "immortal".to_string(),
    };

    repository.write("immortal", &json!(1)).await.unwrap();
    repository.write("doomed-a", &json!(2)).await.unwrap();
    repository.write("doomed-b", &json!(3)).await.unwrap();

    let items = ItemStore::new();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stats = run_sweep(&items, &repository, Duration::ZERO).await;

    // One failure, and the sweep still processed every other file.
    assert_eq!(stats.scanned, 3);
    assert_eq!(stats.deleted, 2);
    assert_eq!(stats.errors, 1);
    assert!(dir.path().join("immortal.json").exists());
    assert!(!dir.path().join("doomed-a.json").exists());
    assert!(!dir.path().join("doomed-b.json").exists());
}
