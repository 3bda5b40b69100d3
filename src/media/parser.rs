//! Media parsing utilities.

use chrono::NaiveDateTime;

use crate::api::types::{MosaicItem, PostFile};
use crate::media::item::{MediaItem, MediaKind};

/// Date format of `postDate` in the posts feed.
const POST_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Extensions fetched directly instead of through the HLS pipeline.
const DIRECT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv"];

/// Parse a `postDate` value.
pub fn parse_post_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), POST_DATE_FORMAT).ok()
}

/// Turn every unlocked file of a feed item into a [`MediaItem`].
pub fn parse_mosaic_item(item: &MosaicItem) -> Vec<MediaItem> {
    let posted_at = item.post_date.as_deref().and_then(|raw| {
        let parsed = parse_post_date(raw);
        if parsed.is_none() {
            tracing::debug!("Could not parse post date '{}'", raw);
        }
        parsed
    });

    item.files
        .iter()
        .filter_map(|file| parse_post_file(file, posted_at))
        .collect()
}

/// Parse a single post file. Locked files and unknown types are skipped.
pub fn parse_post_file(file: &PostFile, posted_at: Option<NaiveDateTime>) -> Option<MediaItem> {
    if file.is_locked || file.url.is_empty() || file.media_id.is_empty() {
        return None;
    }

    let kind = MediaKind::from_api_type(&file.file_type)?;
    let file_extension = match kind {
        MediaKind::Image => extract_extension_from_url(&file.url).unwrap_or_else(|| "jpg".into()),
        MediaKind::Video => "mp4".to_string(),
    };

    Some(MediaItem {
        media_id: file.media_id.clone(),
        kind,
        url: file.url.clone(),
        posted_at,
        file_extension,
    })
}

/// Extract extension from URL path.
pub fn extract_extension_from_url(url: &str) -> Option<String> {
    // Remove query string and fragment
    let path = url.split(['?', '#']).next()?;

    // Get the last segment
    let filename = path.rsplit('/').next()?;
    if !filename.contains('.') {
        return None;
    }

    // Get extension
    let ext = filename.rsplit('.').next()?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_lowercase())
    } else {
        None
    }
}

/// Whether a video URL points at a plain media file rather than a playlist.
pub fn is_direct_media_url(url: &str) -> bool {
    extract_extension_from_url(url)
        .map(|ext| DIRECT_VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// File ID used to request a video's content token: the path segment right
/// before `/hls/`, or the last path segment when there is no `/hls/`.
pub fn extract_file_id(url: &str) -> Option<String> {
    let head = url.split("/hls/").next()?;
    let id = head.rsplit('/').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
