//! JSON category stores (`domains.json`, `fault_injections.json`).
//!
//! Each store is a flat JSON array of display labels.

use std::path::Path;

use slrkit_shared::{CategoryEntry, CategoryList, Result, SlrError};
use tracing::{debug, instrument, warn};

use crate::write_atomic;

/// Read the labels stored at `path`. A missing file is an empty list.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!("category store not found, starting from an empty list");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| SlrError::io(path, e))?;
    let labels: Vec<String> = serde_json::from_str(&content).map_err(|e| {
        SlrError::Storage(format!(
            "{} is not a JSON array of strings: {e}",
            path.display()
        ))
    })?;

    debug!(count = labels.len(), "category store loaded");
    Ok(labels)
}

/// Write `labels` to `path` as a pretty-printed JSON array.
pub fn save_labels(path: &Path, labels: &[String]) -> Result<()> {
    let json = serde_json::to_string_pretty(labels)
        .map_err(|e| SlrError::Serialization(format!("JSON serialization failed: {e}")))?;
    write_atomic(path, json.as_bytes())
}

/// Load a category list at version 0.
pub fn load_list<T: CategoryEntry>(path: &Path) -> Result<CategoryList<T>> {
    Ok(CategoryList::from_labels(load_labels(path)?))
}

/// Persist a category list's labels.
pub fn save_list<T: CategoryEntry>(path: &Path, list: &CategoryList<T>) -> Result<()> {
    save_labels(path, &list.labels())
}
