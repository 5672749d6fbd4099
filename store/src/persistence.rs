//! Session state file read/write.
//!
//! One small JSON document per session, exclusively owned by this component.
//! Reads are tolerant: a missing, unreadable, or unparseable file simply
//! yields the empty store. Writes happen only at clean shutdown, through the
//! atomic writer.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, warn};

use markset_types::PathAliaser;

use crate::MarkerStore;
use crate::atomic_write::atomic_write;

/// Read persisted marker state.
///
/// Any failure short of a bug yields an empty store: an absent file means
/// "no persisted state", and an unreadable or corrupt one is logged and
/// treated the same.
#[must_use]
pub fn read_markers(path: &Path, aliaser: &dyn PathAliaser) -> MarkerStore {
    let mut store = MarkerStore::new();

    if !path.exists() {
        return store;
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("failed to read marker state at {}: {err}", path.display());
            return store;
        }
    };

    let snapshot: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(err) => {
            warn!("invalid marker state json at {}: {err}", path.display());
            return store;
        }
    };

    match store.load_snapshot(&snapshot, aliaser) {
        Ok(report) if report.dropped_any() => {
            warn!(
                sets_dropped = report.sets_dropped,
                markers_dropped = report.markers_dropped,
                "loaded marker state with dropped entries"
            );
        }
        Ok(_) => {}
        Err(err) => error!("failed to load marker state: {err}"),
    }

    store
}

/// Write the full snapshot atomically.
///
/// Called only on clean shutdown; on failure the in-memory state is
/// unaffected and the next session simply loses unsaved changes.
pub fn write_markers(path: &Path, store: &MarkerStore, aliaser: &dyn PathAliaser) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&store.snapshot(aliaser))?;
    atomic_write(path, json.as_bytes())
        .with_context(|| format!("failed to write marker state to {}", path.display()))?;

    Ok(())
}
