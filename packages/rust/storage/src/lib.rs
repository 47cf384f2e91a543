//! Flat-file storage for the SLR dataset and its taxonomies.
//!
//! - [`Dataset`] wraps the CSV table of reviewed studies.
//! - [`load_list`] / [`save_list`] read and write the JSON category stores.
//!
//! Every store is read fully and rewritten fully. Writes go to a sibling
//! temp file that is then renamed over the target, so a failed run never
//! leaves a half-written file behind. There is no locking: concurrent runs
//! against the same files are last-writer-wins.

mod categories;
mod dataset;

use std::path::{Path, PathBuf};

use slrkit_shared::{Result, SlrError};
use tracing::debug;

pub use categories::{load_labels, load_list, save_labels, save_list};
pub use dataset::{Dataset, YearTally};

/// Write `contents` to `path` atomically (temp file, then rename).
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SlrError::io(parent, e))?;
    }

    let temp = temp_path(path)?;
    std::fs::write(&temp, contents).map_err(|e| SlrError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| SlrError::io(path, e))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// `<dir>/.<file>.tmp` next to `path`.
fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| SlrError::Storage(format!("{} has no file name", path.display())))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

#[cfg(test)]
pub(crate) fn test_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("slrkit-{tag}-test-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
