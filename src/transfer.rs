// Backup export and import

use crate::error::TaskError;
use crate::models::Task;
use crate::storage::Storage;
use crate::store::TaskStore;
use chrono::NaiveDate;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name for a backup taken on `date`: `taskhub-backup-<YYYY-MM-DD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("taskhub-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Serialize tasks as a pretty-printed JSON array
pub fn export_json(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).context("Failed to serialize tasks for export")
}

/// Write a backup of the whole store into `dir`, returning the file written
pub fn export_to_dir<S: Storage>(store: &TaskStore<S>, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory {:?}", dir))?;

    let path = dir.join(backup_file_name(date));
    let json = export_json(store.list())?;
    fs::write(&path, json).with_context(|| format!("Failed to write backup {:?}", path))?;

    info!(path = ?path, count = store.len(), "Exported tasks");
    Ok(path)
}

/// Parse an import document; anything that is not a task array is rejected
pub fn parse_import(text: &str) -> Result<Vec<Task>> {
    serde_json::from_str(text).map_err(|e| TaskError::InvalidImport(e.to_string()).into())
}

/// Replace the store's tasks with those in `text`
///
/// On any error the store is left untouched. Returns the number of tasks imported.
pub fn import_str<S: Storage>(store: &mut TaskStore<S>, text: &str) -> Result<usize> {
    let tasks = match parse_import(text) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "Rejected import document");
            return Err(e);
        }
    };

    let count = tasks.len();
    store.replace_all(tasks)?;
    info!(count, "Imported tasks");
    Ok(count)
}

/// Replace the store's tasks with those in the backup file at `path`
pub fn import_file<S: Storage>(store: &mut TaskStore<S>, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read import file {:?}", path))?;
    import_str(store, &text)
}
