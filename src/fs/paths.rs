//! Output directory layout.
//!
//! ```text
//! <download_directory>/<profile>/Pictures/<date>_<id>.<ext>
//! <download_directory>/<profile>/Videos/<date>_<id>.mp4
//! <download_directory>/<profile>/Videos/<id>_temp/   (staging, removed after each video)
//! ```

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::{sanitize_filename, sanitize_path_component};
use crate::media::MediaItem;

/// Base folder for one profile.
pub fn profile_folder(base_dir: &Path, profile: &str) -> Result<PathBuf> {
    Ok(base_dir.join(sanitize_path_component(profile)?))
}

/// Folder holding items of the same kind as `item`.
pub fn media_folder(profile_dir: &Path, item: &MediaItem) -> PathBuf {
    profile_dir.join(item.kind.folder_name())
}

/// Final output file for `item`.
pub fn output_path(profile_dir: &Path, item: &MediaItem) -> Result<PathBuf> {
    let name = sanitize_filename(&item.generate_filename())?;
    Ok(media_folder(profile_dir, item).join(name))
}

/// Per-video staging directory, next to the final output.
pub fn staging_path(profile_dir: &Path, item: &MediaItem) -> Result<PathBuf> {
    let name = sanitize_filename(&item.staging_name())?;
    Ok(media_folder(profile_dir, item).join(name))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
