//! Configuration structures and loading logic.

use crate::config::modes::MediaSelection;
use crate::error::{Error, Result};
use crate::hls::ReencodeSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub profiles: ProfilesConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,
}

/// Account credentials configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Login email.
    #[serde(default)]
    pub email: String,

    /// Login password.
    #[serde(default)]
    pub password: String,

    /// Pre-issued bearer token. Skips the login exchange when set.
    #[serde(default)]
    pub token: Option<String>,
}

/// Profile targeting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesConfig {
    /// Profiles to download. Empty means every followed profile.
    #[serde(default)]
    pub names: Vec<String>,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Which media types to download.
    #[serde(default)]
    pub media: MediaSelection,

    /// Number of items downloaded concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Whether to show download progress.
    #[serde(default = "default_true")]
    pub show_downloads: bool,

    /// Whether to emit pipeline debug diagnostics.
    #[serde(default)]
    pub debug: bool,

    /// File that receives a copy of the log while `debug` is set.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            media: MediaSelection::default(),
            workers: default_workers(),
            show_downloads: true,
            debug: false,
            log_file: default_log_file(),
        }
    }
}

/// Browser identity sent with every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: default_referer(),
            origin: default_origin(),
        }
    }
}

/// Video transcoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// Explicit ffmpeg binary. Looked up on PATH when unset.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Video encoder for the re-encode fallback.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio encoder for the re-encode fallback.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Encoder preset for the re-encode fallback.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant rate factor for the re-encode fallback.
    #[serde(default = "default_crf")]
    pub crf: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            crf: default_crf(),
        }
    }
}

impl TranscodeConfig {
    /// Re-encode parameters for the transcoder.
    pub fn reencode_settings(&self) -> ReencodeSettings {
        ReencodeSettings {
            video_codec: self.video_codec.clone(),
            audio_codec: self.audio_codec.clone(),
            preset: self.preset.clone(),
            crf: self.crf,
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36".to_string()
}

fn default_referer() -> String {
    "https://privacy.com.br/".to_string()
}

fn default_origin() -> String {
    "https://privacy.com.br".to_string()
}

fn default_true() -> bool {
    true
}

fn default_workers() -> usize {
    4
}

fn default_log_file() -> PathBuf {
    PathBuf::from("debug.log")
}

fn default_video_codec() -> String {
    ReencodeSettings::default().video_codec
}

fn default_audio_codec() -> String {
    ReencodeSettings::default().audio_codec
}

fn default_preset() -> String {
    ReencodeSettings::default().preset
}

fn default_crf() -> u8 {
    ReencodeSettings::default().crf
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
