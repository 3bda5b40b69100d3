//! Media item representation.

use chrono::NaiveDateTime;

/// Date placeholder for posts whose date could not be read.
pub const UNKNOWN_DATE: &str = "unknown-date";

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Get the folder name for this media type.
    pub fn folder_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "Pictures",
            MediaKind::Video => "Videos",
        }
    }

    /// Parse the `type` field of a post file.
    pub fn from_api_type(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// A downloadable media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Unique media ID.
    pub media_id: String,

    pub kind: MediaKind,

    /// Download URL (image file, HLS master playlist or direct video file).
    pub url: String,

    /// When the owning post was published.
    pub posted_at: Option<NaiveDateTime>,

    /// File extension (without dot).
    pub file_extension: String,
}

impl MediaItem {
    /// Generate the filename for this media item.
    pub fn generate_filename(&self) -> String {
        format!(
            "{}_{}.{}",
            self.format_date(),
            self.media_id,
            self.file_extension
        )
    }

    /// Name of the scratch directory used while assembling this item.
    pub fn staging_name(&self) -> String {
        format!("{}_temp", self.media_id)
    }

    fn format_date(&self) -> String {
        self.posted_at
            .map(|dt| dt.format("%Y-%m-%d_%H-%M-%S").to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string())
    }
}
