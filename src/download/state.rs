//! Download state tracking.

use std::path::PathBuf;

use crate::download::media::ItemOutcome;
use crate::media::MediaKind;

/// Per-profile download state.
#[derive(Debug, Default)]
pub struct DownloadState {
    pub profile_name: String,

    /// `<download_directory>/<profile>`.
    pub base_path: PathBuf,

    /// Items selected for download after pagination.
    pub total_items: u64,

    // Statistics
    pub pic_count: u64,
    pub vid_count: u64,
    pub skipped_count: u64,
    pub failed_count: u64,
}

impl DownloadState {
    /// Create a new download state for a profile.
    pub fn new(profile_name: impl Into<String>, base_path: PathBuf) -> Self {
        Self {
            profile_name: profile_name.into(),
            base_path,
            ..Default::default()
        }
    }

    /// Count the result of one item.
    pub fn record(&mut self, kind: MediaKind, outcome: &ItemOutcome) {
        match (outcome, kind) {
            (ItemOutcome::Downloaded(_), MediaKind::Image) => self.pic_count += 1,
            (ItemOutcome::Downloaded(_), MediaKind::Video) => self.vid_count += 1,
            (ItemOutcome::Skipped(_), _) => self.skipped_count += 1,
            (ItemOutcome::Failed(_), _) => self.failed_count += 1,
        }
    }

    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.pic_count + self.vid_count
    }
}

/// Global statistics across all profiles.
#[derive(Debug, Default)]
pub struct GlobalState {
    pub pic_count: u64,
    pub vid_count: u64,
    pub skipped_count: u64,
    pub failed_count: u64,
    pub profiles_processed: u64,
    pub profiles_failed: u64,
}

impl GlobalState {
    /// Add statistics from a profile's download state.
    pub fn add_profile_stats(&mut self, state: &DownloadState) {
        self.pic_count += state.pic_count;
        self.vid_count += state.vid_count;
        self.skipped_count += state.skipped_count;
        self.failed_count += state.failed_count;
        self.profiles_processed += 1;
    }

    /// Mark a profile as failed.
    pub fn mark_profile_failed(&mut self) {
        self.profiles_failed += 1;
    }

    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.pic_count + self.vid_count
    }
}
