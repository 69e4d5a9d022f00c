//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Durable item repository: one file per item, named by ID.
///
/// Secondary/fallback read source and the only state surviving a process
/// restart. Implementations must treat a missing file as `NotFound` on
/// `read` but as success on `delete`; whether a missing *item* is an error
/// is the handlers' decision, not the repository's.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Serialize and write an item, overwriting any previous file.
    async fn write(&self, id: &str, value: &Value) -> StorageResult<()>;

    /// Read and deserialize an item. A missing file is `NotFound`.
    async fn read(&self, id: &str) -> StorageResult<Value>;

    /// Remove an item file. Removing a missing file is success.
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Enumerate the IDs of all stored items.
    async fn list_ids(&self) -> StorageResult<Vec<String>>;

    /// Duration since the item file was last modified.
    async fn stat_age(&self, id: &str) -> StorageResult<Duration>;

    /// Verify the backing storage is usable.
    async fn health_check(&self) -> StorageResult<()>;
}
