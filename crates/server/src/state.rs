//! Application state shared across handlers.

use stash_core::AppConfig;
use stash_storage::{ItemRepository, ItemStore};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// In-memory item store. Starts empty on every process start; it is
    /// never hydrated from the repository.
    pub items: Arc<ItemStore>,
    /// Durable item repository.
    pub repository: Arc<dyn ItemRepository>,
}

impl AppState {
    /// Create a new application state with a fresh, empty item store.
    pub fn new(config: AppConfig, repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            config: Arc::new(config),
            items: Arc::new(ItemStore::new()),
            repository,
        }
    }
}
