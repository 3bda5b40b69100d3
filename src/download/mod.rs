//! Download module for profile content.
//!
//! This module provides:
//! - Download state tracking
//! - Feed pagination and the per-profile worker pool
//! - Single item download (photos directly, videos through the HLS pipeline)

pub mod media;
pub mod profile;
pub mod state;

pub use media::{download_media_item, ItemOutcome};
pub use profile::{collect_profile_items, download_profile};
pub use state::{DownloadState, GlobalState};
