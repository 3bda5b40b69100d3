//! Single media item download.

use std::path::{Path, PathBuf};

use crate::api::PrivacyApi;
use crate::error::{Error, Result};
use crate::fs::paths::{output_path, staging_path};
use crate::hls::{VideoJob, VideoPipeline};
use crate::media::{extract_file_id, MediaItem, MediaKind};

/// What happened to one media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The file was written to this path.
    Downloaded(PathBuf),
    /// The output already existed.
    Skipped(PathBuf),
    /// The item could not be produced.
    Failed(String),
}

/// Download one item below `profile_dir`.
///
/// Never fails the caller: any error becomes [`ItemOutcome::Failed`] and a
/// partially written output is removed.
pub async fn download_media_item(
    api: &PrivacyApi,
    pipeline: &VideoPipeline,
    profile_dir: &Path,
    item: &MediaItem,
) -> ItemOutcome {
    let output = match output_path(profile_dir, item) {
        Ok(path) => path,
        Err(e) => return ItemOutcome::Failed(e.to_string()),
    };

    if output.exists() {
        tracing::debug!("Skipping existing file: {}", output.display());
        return ItemOutcome::Skipped(output);
    }

    match produce(api, pipeline, profile_dir, item, &output).await {
        Ok(()) => ItemOutcome::Downloaded(output),
        Err(e) => {
            discard_partial(&output).await;
            ItemOutcome::Failed(e.to_string())
        }
    }
}

/// Remove a partially written output so the next run retries the item.
async fn discard_partial(output: &Path) {
    if !output.exists() {
        return;
    }

    if let Err(e) = tokio::fs::remove_file(output).await {
        tracing::warn!(
            "Could not remove partial file {}: {} (it will be skipped on the next run)",
            output.display(),
            e
        );
    }
}

async fn produce(
    api: &PrivacyApi,
    pipeline: &VideoPipeline,
    profile_dir: &Path,
    item: &MediaItem,
    output: &Path,
) -> Result<()> {
    match item.kind {
        MediaKind::Image => {
            if pipeline.fetcher().fetch(&item.url, output, None).await {
                Ok(())
            } else {
                Err(Error::Download(format!("Image {} not fetched", item.media_id)))
            }
        }
        MediaKind::Video => {
            let file_id = extract_file_id(&item.url).ok_or_else(|| {
                Error::Download(format!("No file id in video URL {}", item.url))
            })?;
            let token = api.get_video_token(&file_id).await?;

            let job = VideoJob {
                media_id: item.media_id.clone(),
                url: item.url.clone(),
                token,
                output: output.to_path_buf(),
                staging: staging_path(profile_dir, item)?,
            };

            if pipeline.process(&job).await {
                Ok(())
            } else {
                Err(Error::Download(format!("Video {} not produced", item.media_id)))
            }
        }
    }
}
