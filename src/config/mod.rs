//! Configuration module for the privacy-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Media selection modes
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{AccountConfig, Config, HttpConfig, OptionsConfig, ProfilesConfig, TranscodeConfig};
pub use modes::MediaSelection;
pub use validation::{validate_config, validate_profiles, MAX_WORKERS};
