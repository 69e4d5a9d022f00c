//! HTTP API server for the stash JSON document store.
//!
//! This crate provides the HTTP surface and the lifecycle logic around the
//! two stores:
//! - CRUD endpoints over arbitrary JSON documents
//! - Shared-secret auth on mutating routes
//! - The daily retention sweeper
//! - API error mapping

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use sweeper::{SweepStats, run_sweep, spawn_retention_sweeper};
