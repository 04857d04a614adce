//! The owned table store shared by all request handlers.
//!
//! One [`TableStore`] is built at startup and handed to the HTTP layer
//! behind an `Arc`. A single async mutex serializes every
//! read-modify-write, including the file write that follows a
//! bounding-box edit, so concurrent edits cannot lose each other and an
//! upload cannot race an edit onto a discarded table.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::annotation::{BoundingBoxUpdate, TrackIdUpdate};
use crate::error::CoreError;
use crate::persist::write_atomic;
use crate::table::{RowFilter, RowMap, Table};
use crate::types::Timestamp;

/// The current table and the file it is written back to.
#[derive(Debug)]
struct LoadedTable {
    table: Table,
    path: PathBuf,
    loaded_at: Timestamp,
}

/// Overview of the loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub source: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub loaded_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct TableStore {
    inner: Mutex<Option<LoadedTable>>,
}

impl TableStore {
    /// An empty store; edits fail with [`CoreError::NotLoaded`] until a
    /// table is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the CSV at `path`, which also becomes the write-back target.
    pub async fn load_file(&self, path: impl Into<PathBuf>) -> Result<usize, CoreError> {
        let path = path.into();
        let bytes = tokio::fs::read(&path).await?;
        let table = Table::parse(&bytes)?;

        let mut guard = self.inner.lock().await;
        Ok(install(&mut guard, table, path))
    }

    /// Replace the table with an uploaded CSV and store the upload at `dest`.
    ///
    /// The bytes are parsed before anything touches disk, so a malformed
    /// upload leaves both the previous table and the previous file intact.
    /// The file write and the swap happen under the store lock, so an edit
    /// writing back to the same file cannot interleave with them.
    pub async fn load_upload(
        &self,
        bytes: &[u8],
        dest: impl Into<PathBuf>,
    ) -> Result<usize, CoreError> {
        let dest = dest.into();
        let table = Table::parse(bytes)?;

        let mut guard = self.inner.lock().await;
        write_atomic(&dest, bytes).await?;
        Ok(install(&mut guard, table, dest))
    }

    pub async fn is_loaded(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    pub async fn summary(&self) -> Result<TableSummary, CoreError> {
        let guard = self.inner.lock().await;
        let loaded = guard.as_ref().ok_or(CoreError::NotLoaded)?;
        Ok(TableSummary {
            source: loaded.path.display().to_string(),
            columns: loaded.table.headers().to_vec(),
            row_count: loaded.table.len(),
            loaded_at: loaded.loaded_at,
        })
    }

    pub async fn select(&self, filter: &RowFilter) -> Result<Vec<RowMap>, CoreError> {
        let guard = self.inner.lock().await;
        let loaded = guard.as_ref().ok_or(CoreError::NotLoaded)?;
        Ok(loaded.table.select(filter))
    }

    /// Apply a bounding-box edit and write the table back to its file.
    ///
    /// The edit is applied to a copy that only replaces the live table once
    /// the file write succeeded, so memory and disk never disagree.
    pub async fn update_bounding_box(&self, update: &BoundingBoxUpdate) -> Result<usize, CoreError> {
        let mut guard = self.inner.lock().await;
        let loaded = guard.as_mut().ok_or(CoreError::NotLoaded)?;

        let mut table = loaded.table.clone();
        let changed = table.update_bounding_box(update)?;
        write_atomic(&loaded.path, &table.to_csv_bytes()?).await?;
        loaded.table = table;

        tracing::info!(
            frame = %update.key.frame,
            track_id = %update.key.track_id,
            class_id = %update.key.class_id,
            rows = changed,
            path = %loaded.path.display(),
            "Bounding box updated",
        );
        Ok(changed)
    }

    /// Reassign a track id within one frame. Not written to disk; use
    /// [`TableStore::export_to`] to persist.
    pub async fn update_track_id(&self, update: &TrackIdUpdate) -> Result<usize, CoreError> {
        let mut guard = self.inner.lock().await;
        let loaded = guard.as_mut().ok_or(CoreError::NotLoaded)?;

        let changed = loaded.table.reassign_track_id(update)?;
        if changed == 0 {
            tracing::warn!(
                current_id = %update.current_id,
                frame = %update.frame,
                "Track id update matched no rows",
            );
        } else {
            tracing::info!(
                current_id = %update.current_id,
                new_id = %update.new_id,
                frame = %update.frame,
                rows = changed,
                "Track id updated",
            );
        }
        Ok(changed)
    }

    /// Write the current table to `dest` and return the written bytes.
    pub async fn export_to(&self, dest: &Path) -> Result<Vec<u8>, CoreError> {
        let guard = self.inner.lock().await;
        let loaded = guard.as_ref().ok_or(CoreError::NotLoaded)?;

        let bytes = loaded.table.to_csv_bytes()?;
        write_atomic(dest, &bytes).await?;
        tracing::info!(path = %dest.display(), rows = loaded.table.len(), "Table exported");
        Ok(bytes)
    }
}

fn install(slot: &mut Option<LoadedTable>, table: Table, path: PathBuf) -> usize {
    let rows = table.len();
    tracing::info!(path = %path.display(), rows, "Table loaded");
    *slot = Some(LoadedTable {
        table,
        path,
        loaded_at: chrono::Utc::now(),
    });
    rows
}
