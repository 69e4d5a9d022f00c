//! Server test utilities.

use stash_core::AppConfig;
use stash_server::{AppState, create_router};
use stash_storage::{FilesystemRepository, ItemRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let storage_path = temp_dir.path().join("items");

        let mut config = AppConfig::for_testing();
        config.storage.path = storage_path.clone();
        modifier(&mut config);

        let repository: Arc<dyn ItemRepository> = Arc::new(
            FilesystemRepository::new(&config.storage.path)
                .await
                .expect("Failed to create item repository"),
        );

        let state = AppState::new(config, repository);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// The configured auth secret.
    pub fn auth_secret(&self) -> String {
        self.state.config.auth.secret.clone()
    }

    /// Directory holding the item files.
    pub fn storage_path(&self) -> PathBuf {
        self.state.config.storage.path.clone()
    }

    /// Path of the file backing one item.
    pub fn item_file(&self, id: &str) -> PathBuf {
        self.storage_path().join(format!("{id}.json"))
    }

    /// Drop an item file directly into the storage directory, bypassing the
    /// in-memory store — simulates state left over from a previous process.
    pub fn write_item_file(&self, id: &str, value: &serde_json::Value) {
        std::fs::write(
            self.item_file(id),
            serde_json::to_vec_pretty(value).unwrap(),
        )
        .expect("Failed to write item file");
    }
}
