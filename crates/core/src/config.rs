//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use time::UtcOffset;
use time::macros::format_description;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1" or "0.0.0.0").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Get the full socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<id>.json` file per item.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/items")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Authentication configuration.
///
/// Mutating routes require the `Authorization` header to match `secret`
/// exactly. There is no token scheme beyond this shared secret.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret compared against the raw `Authorization` header value.
    pub secret: String,
}

impl AuthConfig {
    /// Create a test configuration with a dummy secret.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            secret: "test-secret-token".to_string(),
        }
    }
}

/// Retention sweep configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Items whose file is older than this many days are purged.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
    /// Fixed UTC offset the daily sweep is scheduled in (e.g., "+02:00").
    /// The host timezone is never consulted.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_max_age_days() -> u64 {
    7
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl RetentionConfig {
    /// Get the retention threshold as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(86_400))
    }

    /// Parse the configured sweep timezone.
    pub fn sweep_offset(&self) -> crate::Result<UtcOffset> {
        let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
        UtcOffset::parse(&self.utc_offset, format)
            .map_err(|e| crate::Error::InvalidUtcOffset(format!("{}: {e}", self.utc_offset)))
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication configuration (required).
    pub auth: AuthConfig,
    /// Retention sweep configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses a dummy auth secret and the default
    /// storage path; tests normally point `storage.path` at a temp dir.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::for_testing(),
            retention: RetentionConfig::default(),
        }
    }
}
