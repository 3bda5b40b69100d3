//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, MediaSelection};

/// Privacy content downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "privacy-downloader",
    version,
    about = "Download photos and videos from followed Privacy profiles",
    long_about = "A CLI tool to download photos and HLS videos from Privacy profiles.\n\n\
                  Videos are fetched as adaptive streams, localized and muxed to MP4 with ffmpeg."
)]
pub struct Args {
    /// Profile name(s) to download from.
    /// Defaults to every followed profile.
    #[arg(short, long, value_delimiter = ' ', num_args = 1..)]
    pub profile: Option<Vec<String>>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Login email.
    #[arg(short, long, env = "PRIVACY_EMAIL")]
    pub email: Option<String>,

    /// Login password.
    #[arg(long, env = "PRIVACY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Pre-issued bearer token, used instead of logging in.
    #[arg(short, long, env = "PRIVACY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Which media types to download.
    #[arg(short, long, value_enum)]
    pub media: Option<MediaArg>,

    /// Number of items downloaded concurrently.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Path to the ffmpeg binary.
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Constant rate factor for the re-encode fallback.
    #[arg(long)]
    pub crf: Option<u8>,

    /// Encoder preset for the re-encode fallback.
    #[arg(long)]
    pub preset: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging and pipeline diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// File receiving the debug log (default: debug.log).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// CLI media selection argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MediaArg {
    /// Download only photos.
    Photos,
    /// Download only videos.
    Videos,
    /// Download photos and videos.
    Both,
}

impl From<MediaArg> for MediaSelection {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Photos => MediaSelection::Photos,
            MediaArg::Videos => MediaSelection::Videos,
            MediaArg::Both => MediaSelection::Both,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(profiles) = self.profile {
            config.profiles.names = profiles
                .into_iter()
                .map(|p| p.trim_start_matches('@').to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }

        if let Some(email) = self.email {
            config.account.email = email;
        }

        if let Some(password) = self.password {
            config.account.password = password;
        }

        if let Some(token) = self.token {
            config.account.token = Some(token);
        }

        if let Some(dir) = self.download_directory {
            config.options.download_directory = Some(dir);
        }

        if let Some(media) = self.media {
            config.options.media = media.into();
        }

        if let Some(workers) = self.workers {
            config.options.workers = workers;
        }

        if let Some(ffmpeg) = self.ffmpeg {
            config.transcode.ffmpeg_path = Some(ffmpeg);
        }

        if let Some(crf) = self.crf {
            config.transcode.crf = crf;
        }

        if let Some(preset) = self.preset {
            config.transcode.preset = preset;
        }

        // Boolean flags (only override if set to non-default)
        if self.quiet {
            config.options.show_downloads = false;
        }

        if self.debug {
            config.options.debug = true;
        }

        if let Some(log_file) = self.log_file {
            config.options.log_file = log_file;
        }
    }
}
