//! On-disk staging of pipeline images.

use crate::error::{RuntimeError, RuntimeResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A pipeline image written to disk for the duration of a load.
///
/// The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct StagedObject {
    path: PathBuf,
}

impl StagedObject {
    pub fn write(path: &Path, image: &[u8]) -> RuntimeResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| RuntimeError::staging(path, e.to_string()))?;
            }
        }
        fs::write(path, image).map_err(|e| RuntimeError::staging(path, e.to_string()))?;
        debug!(path = %path.display(), bytes = image.len(), "Staged pipeline object");

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedObject {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), "Failed to remove staged pipeline object: {}", e);
        }
    }
}
