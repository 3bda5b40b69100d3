//! Per-item staging directories.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::Result;
use crate::hls::diagnostics::Diagnostics;

/// Scratch directory holding one video's playlists, keys and segments.
///
/// [`StagingDir::cleanup`] consumes the value, so a staging directory is
/// removed at most once.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Create the directory, discarding leftovers from an earlier run.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if fs::try_exists(&path).await? {
            fs::remove_dir_all(&path).await?;
        }
        fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and everything in it. Failures are logged only.
    pub async fn cleanup(self, diagnostics: &dyn Diagnostics) {
        match fs::remove_dir_all(&self.path).await {
            Ok(()) => diagnostics.debug(&format!(
                "Removed staging directory {}",
                self.path.display()
            )),
            Err(e) => diagnostics.warn(&format!(
                "Failed to remove staging directory {}: {}",
                self.path.display(),
                e
            )),
        }
    }
}
