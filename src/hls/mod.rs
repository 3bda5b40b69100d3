//! HLS video pipeline.
//!
//! This module provides:
//! - Resource fetching with per-video content authorization
//! - Playlist line classification
//! - Best-variant selection from master playlists
//! - Variant playlist localization (keys and segments)
//! - Stream-copy transcoding with a re-encode fallback
//! - Staging directory lifecycle

pub mod decode;
pub mod diagnostics;
pub mod fetch;
pub mod localize;
pub mod pipeline;
pub mod playlist;
pub mod staging;
pub mod transcode;
pub mod variant;

pub use diagnostics::{Diagnostics, Severity, SilentDiagnostics, TracingDiagnostics};
pub use fetch::{ContentToken, ResourceFetcher};
pub use localize::PlaylistLocalizer;
pub use pipeline::{VideoJob, VideoPipeline};
pub use staging::StagingDir;
pub use transcode::{convert_playlist, FfmpegTranscoder, ReencodeSettings, TranscodeMode, Transcoder};
pub use variant::select_best_variant;
