//! Core domain types and shared logic for the stash document server.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Item identifiers
//! - Creation-timestamp stamping and top-level merge rules
//! - Application configuration
//! - Domain error type

pub mod config;
pub mod error;
pub mod item;

pub use config::{AppConfig, AuthConfig, RetentionConfig, ServerConfig, StorageConfig};
pub use error::{Error, Result};
pub use item::{
    CREATED_AT_FIELD, ItemId, created_at_stamp, merge_top_level, preserve_created_at,
    stamp_created_at,
};
