//! Single-resource fetching for the video pipeline.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{Error, Result};
use crate::hls::diagnostics::Diagnostics;

/// Bodies are written to disk in pieces of at most this many bytes.
pub const CHUNK_SIZE: usize = 8192;

/// Marker preceding the content URI in media URLs.
const CONTENT_URI_MARKER: &str = "hls/";

/// Header carrying the per-video content authorization.
const CONTENT_HEADER: &str = "Content";

/// Header carrying the content URI derived from the request URL.
const CONTENT_URI_HEADER: &str = "X-Content-Uri";

/// Per-video authorization value issued by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentToken(String);

impl ContentToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentToken(..)")
    }
}

/// Content URI for a playlist, segment or direct media URL: everything after
/// the first `hls/`, or the whole URL when the marker is absent.
pub fn content_uri(url: &str) -> &str {
    url.split_once(CONTENT_URI_MARKER)
        .map(|(_, rest)| rest)
        .unwrap_or(url)
}

/// Content URI for a key URL: the basename of its path.
pub fn key_content_uri(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or("")
            .to_string(),
    }
}

/// Downloads one remote resource to one local path.
///
/// Failures never propagate: every fetch reports `true` or `false` and logs
/// the reason through the injected diagnostics.
#[derive(Clone)]
pub struct ResourceFetcher {
    client: Client,
    referer: String,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ResourceFetcher {
    /// Create a fetcher sharing `client`'s connection pool and cookies.
    pub fn new(client: Client, referer: impl Into<String>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            client,
            referer: referer.into(),
            diagnostics,
        }
    }

    /// Fetch a playlist, segment or media file.
    pub async fn fetch(&self, url: &str, dest: &Path, token: Option<&ContentToken>) -> bool {
        self.fetch_with_uri(url, dest, token, content_uri(url)).await
    }

    /// Fetch an encryption key.
    pub async fn fetch_key(&self, url: &str, dest: &Path, token: Option<&ContentToken>) -> bool {
        let uri = key_content_uri(url);
        self.fetch_with_uri(url, dest, token, &uri).await
    }

    async fn fetch_with_uri(
        &self,
        url: &str,
        dest: &Path,
        token: Option<&ContentToken>,
        uri: &str,
    ) -> bool {
        self.diagnostics
            .debug(&format!("Fetching {} -> {}", url, dest.display()));

        match self.try_fetch(url, dest, token, uri).await {
            Ok(bytes) => {
                self.diagnostics
                    .debug(&format!("Fetched {} ({} bytes)", dest.display(), bytes));
                true
            }
            Err(e) => {
                self.diagnostics
                    .warn(&format!("Failed to fetch {}: {}", url, e));
                false
            }
        }
    }

    async fn try_fetch(
        &self,
        url: &str,
        dest: &Path,
        token: Option<&ContentToken>,
        uri: &str,
    ) -> Result<u64> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut request = self.client.get(url).header(header::REFERER, &self.referer);
        if let Some(token) = token {
            request = request
                .header(CONTENT_HEADER, token.as_str())
                .header(CONTENT_URI_HEADER, uri);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Download(format!("HTTP {}", status)));
        }

        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, File::create(dest).await?);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                writer.write_all(piece).await?;
            }
            written += chunk.len() as u64;
        }

        writer.flush().await?;

        Ok(written)
    }
}
