//! Item CRUD handlers.
//!
//! These encode the dual-store consistency contract. Reads consult the
//! in-memory store first and fall back to the repository; mutations decide
//! existence from the in-memory store alone, so an item that exists only on
//! disk (e.g. after a restart) is readable but answers 404 to
//! PUT/PATCH/DELETE. Writes go memory first, then disk, with no rollback:
//! success is acknowledged only once the file write returns.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use stash_core::item::{
    ItemId, created_at_stamp, merge_top_level, preserve_created_at, stamp_created_at,
};
use stash_storage::StorageError;
use std::collections::HashMap;
use time::OffsetDateTime;

/// Response for a created item.
#[derive(Debug, Serialize)]
pub struct CreateItemResponse {
    /// The assigned item ID.
    pub id: String,
    /// Location of the new item.
    pub url: String,
    /// The stored value, including the `createdAt` stamp.
    pub data: Value,
}

/// Response for a deleted item.
#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    /// ID of the removed item.
    pub deleted: String,
}

/// Unwrap a JSON body, mapping extraction failures to 400.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /json - All items, keyed by ID.
///
/// Starts from a snapshot of the in-memory store, then adds repository
/// files the snapshot is missing. Memory wins on conflict; fallback hits
/// are NOT written back into the store.
pub async fn list_items(
    State(state): State<AppState>,
) -> ApiResult<Json<HashMap<String, Value>>> {
    let mut items = state.items.snapshot().await;

    for id in state.repository.list_ids().await? {
        if items.contains_key(&id) {
            continue;
        }
        match state.repository.read(&id).await {
            Ok(value) => {
                items.insert(id, value);
            }
            // Deleted between listing and reading; skip it.
            Err(StorageError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Json(items))
}

/// GET /json/{id} - One item.
///
/// In-memory lookup first; on a miss the repository is consulted. A
/// fallback hit is served without repopulating the store.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if let Some(value) = state.items.get(&id).await {
        return Ok(Json(value));
    }

    let value = state.repository.read(&id).await?;
    Ok(Json(value))
}

/// POST /json - Create an item.
pub async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateItemResponse>)> {
    let mut value = json_body(body)?;

    let stamp = created_at_stamp(OffsetDateTime::now_utc())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    stamp_created_at(&mut value, &stamp);

    let id = ItemId::generate().to_string();
    state.items.put(id.clone(), value.clone()).await;
    state.repository.write(&id, &value).await?;

    tracing::info!(%id, "item created");

    let url = format!("/json/{id}");
    Ok((
        StatusCode::CREATED,
        Json(CreateItemResponse {
            id,
            url,
            data: value,
        }),
    ))
}

/// PUT /json/{id} - Replace an item.
pub async fn replace_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let mut value = json_body(body)?;

    // Existence is decided by the in-memory store alone; a file on disk
    // with no store entry still answers 404 here.
    let Some(previous) = state.items.get(&id).await else {
        return Err(ApiError::NotFound);
    };

    preserve_created_at(&mut value, &previous);

    state.items.put(id.clone(), value.clone()).await;
    state.repository.write(&id, &value).await?;

    tracing::info!(%id, "item replaced");
    Ok(Json(value))
}

/// PATCH /json/{id} - Merge top-level fields into an item.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let patch = json_body(body)?;
    let Value::Object(patch) = patch else {
        return Err(ApiError::BadRequest(
            "patch body must be a JSON object".to_string(),
        ));
    };

    let Some(existing) = state.items.get(&id).await else {
        return Err(ApiError::NotFound);
    };

    let merged = merge_top_level(&existing, &patch);

    state.items.put(id.clone(), merged.clone()).await;
    state.repository.write(&id, &merged).await?;

    tracing::info!(%id, "item updated");
    Ok(Json(merged))
}

/// DELETE /json/{id} - Remove an item from both stores.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteItemResponse>> {
    if state.items.remove(&id).await.is_none() {
        return Err(ApiError::NotFound);
    }

    // The repository swallows "already gone", so the delete below cannot
    // re-introduce a 404 after the store entry is removed.
    state.repository.delete(&id).await?;

    tracing::info!(%id, "item deleted");
    Ok(Json(DeleteItemResponse { deleted: id }))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
