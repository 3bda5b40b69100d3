//! Conversion of a localized playlist into a single media file.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::hls::diagnostics::Diagnostics;

/// How a transcode attempt treats the input streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeMode {
    /// Copy audio and video bit-for-bit into the output container.
    StreamCopy,
    /// Re-encode both streams with [`ReencodeSettings`].
    Reencode,
}

impl fmt::Display for TranscodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscodeMode::StreamCopy => write!(f, "stream copy"),
            TranscodeMode::Reencode => write!(f, "re-encode"),
        }
    }
}

/// Encoder parameters for the re-encode fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReencodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u8,
}

impl Default for ReencodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "ultrafast".to_string(),
            crf: 23,
        }
    }
}

/// A media tool able to turn a local playlist into one output file.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path, mode: TranscodeMode) -> Result<()>;
}

/// [`Transcoder`] backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    settings: ReencodeSettings,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>, settings: ReencodeSettings) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }

    /// Locate `ffmpeg` on `PATH`.
    pub fn locate(settings: ReencodeSettings) -> Result<Self> {
        let program = which::which("ffmpeg").map_err(|_| Error::FFmpegNotFound)?;
        Ok(Self::new(program, settings))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one attempt.
    pub fn build_args(&self, input: &Path, output: &Path, mode: TranscodeMode) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y"]
            .iter()
            .map(OsString::from)
            .collect();

        args.push("-allowed_extensions".into());
        args.push("ALL".into());
        args.push("-i".into());
        args.push(input.as_os_str().to_owned());

        match mode {
            TranscodeMode::StreamCopy => {
                args.extend(["-c:v", "copy", "-c:a", "copy"].map(OsString::from));
            }
            TranscodeMode::Reencode => {
                args.push("-c:v".into());
                args.push(self.settings.video_codec.as_str().into());
                args.push("-preset".into());
                args.push(self.settings.preset.as_str().into());
                args.push("-crf".into());
                args.push(self.settings.crf.to_string().into());
                args.push("-c:a".into());
                args.push(self.settings.audio_codec.as_str().into());
            }
        }

        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path, mode: TranscodeMode) -> Result<()> {
        let result = Command::new(&self.program)
            .args(self.build_args(input, output, mode))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::FFmpegNotFound
                } else {
                    Error::FFmpeg(format!("Failed to run ffmpeg: {}", e))
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::FFmpeg(format!(
                "{} exited with {}: {}",
                mode,
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Convert a self-contained local playlist into `output`.
///
/// Stream copy is tried first; re-encoding runs only when it fails, and only
/// a failed re-encode is reported. A missing `input` fails with
/// [`Error::MissingManifest`] before any tool runs. Returns the mode that
/// produced the file.
pub async fn convert_playlist(
    transcoder: &dyn Transcoder,
    input: &Path,
    output: &Path,
    diagnostics: &dyn Diagnostics,
) -> Result<TranscodeMode> {
    if !fs::try_exists(input).await.unwrap_or(false) {
        return Err(Error::MissingManifest(input.to_path_buf()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    match transcoder
        .transcode(input, output, TranscodeMode::StreamCopy)
        .await
    {
        Ok(()) => {
            diagnostics.debug(&format!("Stream copy finished: {}", output.display()));
            return Ok(TranscodeMode::StreamCopy);
        }
        Err(e) => {
            diagnostics.warn(&format!("Stream copy failed, re-encoding: {}", e));
        }
    }

    transcoder
        .transcode(input, output, TranscodeMode::Reencode)
        .await?;
    diagnostics.debug(&format!("Re-encode finished: {}", output.display()));

    Ok(TranscodeMode::Reencode)
}
