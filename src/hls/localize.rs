//! Variant playlist localization.
//!
//! Downloads a variant playlist into a staging directory together with every
//! key and segment it references, then rewrites the playlist so each fetched
//! reference points at its local file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use url::Url;

use crate::fs::naming::sanitize_filename;
use crate::hls::decode::decode_playlist;
use crate::hls::diagnostics::Diagnostics;
use crate::hls::fetch::{ContentToken, ResourceFetcher};
use crate::hls::playlist::{classify, KeyDirective, PlaylistLine};

/// File name of the localized variant playlist inside the staging directory.
pub const LOCAL_PLAYLIST_NAME: &str = "playlist.m3u8";

/// Suffix keeping key files apart from segments with the same basename.
pub const KEY_SUFFIX: &str = ".key";

/// Local name for a key: its URL basename plus [`KEY_SUFFIX`].
pub fn key_file_name(key_url: &Url) -> String {
    let base = url_basename(key_url)
        .and_then(|name| sanitize_filename(name).ok())
        .unwrap_or_else(|| "key".to_string());
    format!("{}{}", base, KEY_SUFFIX)
}

/// Local name for a segment: its URL basename, or a numbered fallback when
/// the basename is unusable as a file name.
pub fn segment_file_name(segment_url: &Url, index: usize) -> String {
    url_basename(segment_url)
        .and_then(|name| sanitize_filename(name).ok())
        .unwrap_or_else(|| format!("segment_{:05}.ts", index))
}

fn url_basename(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
}

/// Rewrites a remote variant playlist into a self-contained local one.
#[derive(Clone)]
pub struct PlaylistLocalizer {
    fetcher: ResourceFetcher,
    diagnostics: Arc<dyn Diagnostics>,
}

impl PlaylistLocalizer {
    pub fn new(fetcher: ResourceFetcher, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            fetcher,
            diagnostics,
        }
    }

    /// Localize `variant_url` into `staging`.
    ///
    /// Returns the path of the rewritten playlist, or `None` when the playlist
    /// itself could not be fetched, read or written. A key or segment that
    /// fails to download keeps its remote reference; it never aborts the pass.
    pub async fn localize(
        &self,
        variant_url: &str,
        staging: &Path,
        token: Option<&ContentToken>,
    ) -> Option<PathBuf> {
        let playlist_path = staging.join(LOCAL_PLAYLIST_NAME);

        let base = match Url::parse(variant_url) {
            Ok(url) => url,
            Err(e) => {
                self.diagnostics
                    .error(&format!("Invalid variant URL {}: {}", variant_url, e));
                return None;
            }
        };

        if !self.fetcher.fetch(variant_url, &playlist_path, token).await {
            return None;
        }

        let raw = match fs::read(&playlist_path).await {
            Ok(raw) => raw,
            Err(e) => {
                self.diagnostics.error(&format!(
                    "Failed to read {}: {}",
                    playlist_path.display(),
                    e
                ));
                return None;
            }
        };
        let content = decode_playlist(&raw);

        let mut rewritten = Vec::new();
        let mut references = 0usize;
        let mut segments = 0usize;
        let mut failures = 0usize;

        for line in content.split('\n') {
            let output = match classify(line) {
                PlaylistLine::Key(key) => {
                    references += 1;
                    match self.localize_key(&base, &key, staging, token).await {
                        Some(local) => local,
                        None => {
                            failures += 1;
                            line.to_string()
                        }
                    }
                }
                PlaylistLine::Uri(uri) => {
                    references += 1;
                    segments += 1;
                    match self
                        .localize_segment(&base, uri, segments, staging, token)
                        .await
                    {
                        Some(local) => local,
                        None => {
                            failures += 1;
                            line.to_string()
                        }
                    }
                }
                PlaylistLine::StreamInfo { .. } | PlaylistLine::Passthrough => line.to_string(),
            };
            rewritten.push(output);
        }

        if let Err(e) = fs::write(&playlist_path, rewritten.join("\n")).await {
            self.diagnostics.error(&format!(
                "Failed to write {}: {}",
                playlist_path.display(),
                e
            ));
            return None;
        }

        if failures > 0 {
            self.diagnostics.warn(&format!(
                "{} of {} references in {} remain remote",
                failures, references, variant_url
            ));
        } else {
            self.diagnostics.debug(&format!(
                "Localized {} references from {}",
                references, variant_url
            ));
        }

        Some(playlist_path)
    }

    /// Fetch a key and return the directive rewritten to its local name.
    async fn localize_key(
        &self,
        base: &Url,
        key: &KeyDirective<'_>,
        staging: &Path,
        token: Option<&ContentToken>,
    ) -> Option<String> {
        let key_url = match base.join(key.uri()) {
            Ok(url) => url,
            Err(e) => {
                self.diagnostics
                    .warn(&format!("Could not resolve key URI {}: {}", key.uri(), e));
                return None;
            }
        };

        let local_name = key_file_name(&key_url);
        let key_path = staging.join(&local_name);

        if self.fetcher.fetch_key(key_url.as_str(), &key_path, token).await
            && fs::try_exists(&key_path).await.unwrap_or(false)
        {
            Some(key.with_uri(&local_name))
        } else {
            self.diagnostics
                .warn(&format!("Key not available locally: {}", key_url));
            None
        }
    }

    /// Fetch a segment and return its local name.
    async fn localize_segment(
        &self,
        base: &Url,
        uri: &str,
        index: usize,
        staging: &Path,
        token: Option<&ContentToken>,
    ) -> Option<String> {
        let segment_url = match base.join(uri) {
            Ok(url) => url,
            Err(e) => {
                self.diagnostics
                    .warn(&format!("Could not resolve segment URI {}: {}", uri, e));
                return None;
            }
        };

        let local_name = segment_file_name(&segment_url, index);
        if self
            .fetcher
            .fetch(segment_url.as_str(), &staging.join(&local_name), token)
            .await
        {
            Some(local_name)
        } else {
            self.diagnostics
                .warn(&format!("Segment kept remote: {}", segment_url));
            None
        }
    }
}
