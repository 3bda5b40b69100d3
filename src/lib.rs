//! Privacy Downloader - photos and HLS videos from followed Privacy profiles.
//!
//! # Features
//!
//! - Login with email/password or a pre-issued bearer token
//! - Feed pagination for every followed (or selected) profile
//! - Concurrent per-profile worker pool
//! - HLS video pipeline: best-variant selection, key and segment
//!   localization, ffmpeg stream copy with a re-encode fallback
//! - Charset detection for playlists served in legacy encodings
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use privacy_downloader::{Config, PrivacyApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let client = PrivacyApi::build_client(&config.http)?;
//!     let api = PrivacyApi::login(client, &config.account.email, &config.account.password).await?;
//!
//!     for profile in api.get_profiles().await? {
//!         println!("{}", profile);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod hls;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::PrivacyApi;
pub use config::{Config, MediaSelection};
pub use download::{download_profile, DownloadState, GlobalState};
pub use error::{Error, Result};
pub use hls::{VideoJob, VideoPipeline};
pub use media::{MediaItem, MediaKind};
