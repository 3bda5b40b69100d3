//! Single-video pipeline: variant selection, localization, transcode, cleanup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;

use crate::error::{Error, Result};
use crate::hls::decode::decode_playlist;
use crate::hls::diagnostics::Diagnostics;
use crate::hls::fetch::{ContentToken, ResourceFetcher};
use crate::hls::localize::PlaylistLocalizer;
use crate::hls::staging::StagingDir;
use crate::hls::transcode::{convert_playlist, TranscodeMode, Transcoder};
use crate::hls::variant::select_best_variant;
use crate::media::parser::is_direct_media_url;

/// File name of the downloaded master playlist inside the staging directory.
pub const MASTER_PLAYLIST_NAME: &str = "main.m3u8";

/// One video to produce.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub media_id: String,
    /// Master playlist URL, or a direct media file URL.
    pub url: String,
    pub token: ContentToken,
    /// Final media file.
    pub output: PathBuf,
    /// Scratch directory, removed once the job ends.
    pub staging: PathBuf,
}

/// Runs [`VideoJob`]s one step after another.
#[derive(Clone)]
pub struct VideoPipeline {
    fetcher: ResourceFetcher,
    localizer: PlaylistLocalizer,
    transcoder: Arc<dyn Transcoder>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl VideoPipeline {
    pub fn new(
        fetcher: ResourceFetcher,
        transcoder: Arc<dyn Transcoder>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let localizer = PlaylistLocalizer::new(fetcher.clone(), diagnostics.clone());
        Self {
            fetcher,
            localizer,
            transcoder,
            diagnostics,
        }
    }

    pub fn fetcher(&self) -> &ResourceFetcher {
        &self.fetcher
    }

    /// Produce `job.output`. Returns whether the file was produced.
    ///
    /// Direct media URLs are fetched as-is. HLS jobs always remove their
    /// staging directory before returning, whatever the outcome.
    pub async fn process(&self, job: &VideoJob) -> bool {
        if is_direct_media_url(&job.url) {
            self.diagnostics
                .debug(&format!("Direct media link for {}: {}", job.media_id, job.url));
            return self.fetcher.fetch(&job.url, &job.output, Some(&job.token)).await;
        }

        let staging = match StagingDir::create(&job.staging).await {
            Ok(staging) => staging,
            Err(e) => {
                self.diagnostics.error(&format!(
                    "Cannot create staging directory {}: {}",
                    job.staging.display(),
                    e
                ));
                return false;
            }
        };

        let result = self.run_hls(job, staging.path()).await;
        staging.cleanup(self.diagnostics.as_ref()).await;

        match result {
            Ok(mode) => {
                self.diagnostics.debug(&format!(
                    "Video {} ready via {}: {}",
                    job.media_id,
                    mode,
                    job.output.display()
                ));
                true
            }
            Err(e) => {
                self.diagnostics
                    .error(&format!("Video {} failed: {}", job.media_id, e));
                false
            }
        }
    }

    async fn run_hls(&self, job: &VideoJob, staging: &Path) -> Result<TranscodeMode> {
        let master_path = staging.join(MASTER_PLAYLIST_NAME);
        if !self
            .fetcher
            .fetch(&job.url, &master_path, Some(&job.token))
            .await
        {
            return Err(Error::M3U8(format!(
                "Failed to fetch master playlist {}",
                job.url
            )));
        }

        let raw = fs::read(&master_path).await?;
        let content = decode_playlist(&raw);

        let variant_url = match select_best_variant(&job.url, &content) {
            Some(url) => url,
            None if is_media_playlist(&content) => {
                self.diagnostics.debug(&format!(
                    "{} is already a media playlist, localizing it directly",
                    job.url
                ));
                job.url.clone()
            }
            None => {
                return Err(Error::M3U8(format!(
                    "No variant stream in master playlist {}",
                    job.url
                )))
            }
        };
        self.diagnostics
            .debug(&format!("Selected variant {}", variant_url));

        let local_playlist = self
            .localizer
            .localize(&variant_url, staging, Some(&job.token))
            .await
            .ok_or_else(|| {
                Error::M3U8(format!("Failed to localize variant playlist {}", variant_url))
            })?;

        convert_playlist(
            self.transcoder.as_ref(),
            &local_playlist,
            &job.output,
            self.diagnostics.as_ref(),
        )
        .await
    }
}

/// Whether `content` parses as a media (segment-bearing) playlist.
fn is_media_playlist(content: &str) -> bool {
    matches!(
        m3u8_rs::parse_playlist_res(content.as_bytes()),
        Ok(m3u8_rs::Playlist::MediaPlaylist(_))
    )
}
