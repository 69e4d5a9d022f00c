//! Item storage for the stash document server.
//!
//! This crate provides the two stores behind the HTTP surface:
//! - `ItemStore`: the in-memory mapping, primary read source
//! - `ItemRepository` / `FilesystemRepository`: one JSON file per item on
//!   disk, the only state surviving a restart
//!
//! The two are deliberately not transactional: handlers write memory first,
//! then disk, and the narrow inconsistency window is part of the contract.

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use filesystem::FilesystemRepository;
pub use memory::ItemStore;
pub use traits::ItemRepository;
