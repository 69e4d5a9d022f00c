//! Filesystem-backed item repository.

use crate::error::{StorageError, StorageResult};
use crate::traits::ItemRepository;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// File suffix for item files.
const ITEM_FILE_SUFFIX: &str = ".json";

/// Maximum accepted ID length. Server-generated IDs are 36 characters;
/// the headroom is for files dropped into the directory by hand.
const MAX_ID_LEN: usize = 128;

/// Item repository storing one pretty-printed JSON file per item.
pub struct FilesystemRepository {
    root: PathBuf,
}

impl FilesystemRepository {
    /// Create a new repository, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the file path for an ID, rejecting unsafe IDs first.
    fn item_path(&self, id: &str) -> StorageResult<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}{ITEM_FILE_SUFFIX}")))
    }
}

/// Reject IDs that are not a single safe path segment.
///
/// IDs reach this layer straight from the URL, so anything that could name
/// a file outside the storage directory must be refused before a path join.
fn validate_id(id: &str) -> StorageResult<()> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(StorageError::InvalidId(format!(
            "id must be 1..={MAX_ID_LEN} characters"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StorageError::InvalidId(format!(
            "id contains unsafe characters: {id}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ItemRepository for FilesystemRepository {
    #[instrument(skip(self, value))]
    async fn write(&self, id: &str, value: &Value) -> StorageResult<()> {
        let path = self.item_path(id)?;
        let data = serde_json::to_vec_pretty(value)?;

        // Write to a uniquely named temp file, then rename, so readers and
        // the sweeper never observe a half-written item file.
        let temp_path = self.root.join(format!(".tmp.{}", Uuid::new_v4()));
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
        }
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn read(&self, id: &str) -> StorageResult<Value> {
        let path = self.item_path(id)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(id.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.item_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone is success here; the handler layer decides
            // whether a missing item is an error for the caller.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self))]
    async fn list_ids(&self) -> StorageResult<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            // Only `<id>.json` files count as items; temp files and
            // anything else in the directory are ignored.
            if let Some(id) = name.strip_suffix(ITEM_FILE_SUFFIX) {
                if validate_id(id).is_ok() {
                    ids.push(id.to_string());
                }
            }
        }
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn stat_age(&self, id: &str) -> StorageResult<Duration> {
        let path = self.item_path(id)?;
        let metadata = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(id.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        let modified = metadata.modified()?;
        // A modification time in the future (clock skew) counts as age zero.
        Ok(modified.elapsed().unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("storage root not accessible: {e}"),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("storage root is not a directory: {:?}", self.root),
            )));
        }

        Ok(())
    }
}
