//! Daily retention sweeper.
//!
//! A long-lived background task that purges item files older than the
//! configured retention threshold. It fires once per calendar day at
//! midnight in a fixed, configured UTC offset — never the host timezone —
//! and computes the delay to the next midnight after each run, so sweep
//! duration does not accumulate drift. It never runs immediately at
//! process start.

use crate::state::AppState;
use serde::Serialize;
use stash_storage::{ItemRepository, ItemStore, StorageError};
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset};
use tokio::task::JoinHandle;

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepStats {
    /// Item files examined.
    pub scanned: u64,
    /// Item files removed (and reconciled out of the in-memory store).
    pub deleted: u64,
    /// Per-file failures; these never abort the sweep.
    pub errors: u64,
}

/// The next midnight in the given offset, strictly after `now`.
pub fn next_midnight(now: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    let local = now.to_offset(offset);
    match local.date().next_day() {
        Some(next) => next.midnight().assume_offset(offset),
        // Calendar overflow at Date::MAX; fall back to a plain 24h step.
        None => now + time::Duration::DAY,
    }
}

/// Spawn the retention sweeper as a process-wide background task.
///
/// The returned handle can be aborted to stop the task; dropping it leaves
/// the task running for the life of the process.
pub fn spawn_retention_sweeper(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let offset = match state.config.retention.sweep_offset() {
            Ok(offset) => offset,
            Err(e) => {
                tracing::error!(error = %e, "invalid retention offset, sweeper disabled");
                return;
            }
        };
        let max_age = state.config.retention.max_age();

        loop {
            let now = OffsetDateTime::now_utc();
            let fire_at = next_midnight(now, offset);
            let delay: Duration = (fire_at - now).try_into().unwrap_or(Duration::ZERO);

            tracing::info!(
                delay_secs = delay.as_secs(),
                fire_at = %fire_at,
                "retention sweep scheduled"
            );
            tokio::time::sleep(delay).await;

            let stats = run_sweep(&state.items, state.repository.as_ref(), max_age).await;
            tracing::info!(
                scanned = stats.scanned,
                deleted = stats.deleted,
                errors = stats.errors,
                "retention sweep finished"
            );
        }
    })
}

/// Run a single sweep over the repository.
///
/// Every file older than `max_age` is deleted from the repository and, if
/// present, removed from the in-memory store. Individual failures are
/// logged and counted; the sweep always continues to the next file.
pub async fn run_sweep(
    items: &ItemStore,
    repository: &dyn ItemRepository,
    max_age: Duration,
) -> SweepStats {
    let mut stats = SweepStats::default();

    let ids = match repository.list_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "retention sweep could not list items");
            stats.errors += 1;
            return stats;
        }
    };

    for id in ids {
        stats.scanned += 1;

        let age = match repository.stat_age(&id).await {
            Ok(age) => age,
            // Deleted between listing and stat; nothing left to purge.
            Err(StorageError::NotFound(_)) => continue,
            Err(e) => {
                tracing::warn!(%id, error = %e, "could not stat item file");
                stats.errors += 1;
                continue;
            }
        };

        if age <= max_age {
            continue;
        }

        match repository.delete(&id).await {
            Ok(()) => {
                items.remove(&id).await;
                stats.deleted += 1;
                tracing::debug!(%id, age_secs = age.as_secs(), "expired item purged");
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to delete expired item");
                stats.errors += 1;
            }
        }
    }

    stats
}
