//! In-memory item store.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-memory mapping from item ID to JSON value.
///
/// Primary read source for the handlers. A single owned instance lives in
/// the application state; it starts empty on process start and is never
/// hydrated from disk. The mutex keeps the map internally consistent under
/// concurrent request handling; it is never held across a disk write, so
/// cross-store consistency is not its job.
pub struct ItemStore {
    items: Mutex<HashMap<String, Value>>,
}

impl ItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }

    /// Look up an item by ID.
    pub async fn get(&self, id: &str) -> Option<Value> {
        self.items.lock().await.get(id).cloned()
    }

    /// Insert or replace an item.
    pub async fn put(&self, id: impl Into<String>, value: Value) {
        self.items.lock().await.insert(id.into(), value);
    }

    /// Remove an item, returning the previous value if there was one.
    pub async fn remove(&self, id: &str) -> Option<Value> {
        self.items.lock().await.remove(id)
    }

    /// Whether an item is present.
    pub async fn contains(&self, id: &str) -> bool {
        self.items.lock().await.contains_key(id)
    }

    /// Clone the full mapping.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.items.lock().await.clone()
    }

    /// Number of items currently held.
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Whether the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
