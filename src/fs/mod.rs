//! Filesystem module.
//!
//! Provides:
//! - Output directory layout
//! - File name validation

pub mod naming;
pub mod paths;

pub use naming::{sanitize_filename, sanitize_path_component};
pub use paths::{ensure_dir, media_folder, output_path, profile_folder, staging_path};
