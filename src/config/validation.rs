//! Configuration validation logic.

use std::sync::LazyLock;

use crate::config::loader::Config;
use crate::error::{Error, Result};
use regex::Regex;

/// Maximum concurrent workers.
pub const MAX_WORKERS: usize = 32;

/// Highest constant rate factor x264 accepts.
const MAX_CRF: u8 = 51;

/// x264 encoder presets, fastest first.
const X264_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

static PROFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]{2,40}$").expect("profile pattern is valid"));

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_credentials(config)?;
    validate_profiles(&config.profiles.names)?;
    validate_workers(config.options.workers)?;
    validate_transcode(&config.transcode.preset, config.transcode.crf)?;

    Ok(())
}

/// Either a bearer token or an email/password pair must be present.
pub fn validate_credentials(config: &Config) -> Result<()> {
    let account = &config.account;

    if account.token.as_deref().is_some_and(|t| !t.trim().is_empty()) {
        return Ok(());
    }

    if account.email.is_empty() {
        return Err(Error::MissingConfig(
            "email (or a pre-issued token)".to_string(),
        ));
    }

    if !EMAIL_RE.is_match(&account.email) {
        return Err(Error::ConfigValidation {
            field: "email".to_string(),
            message: format!("'{}' is not a valid email address", account.email),
        });
    }

    if account.password.is_empty() {
        return Err(Error::MissingConfig("password".to_string()));
    }

    Ok(())
}

/// Validate profile names.
pub fn validate_profiles<S: AsRef<str>>(names: &[S]) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        let clean = name.trim_start_matches('@');

        if !PROFILE_RE.is_match(clean) {
            return Err(Error::ConfigValidation {
                field: "profiles".to_string(),
                message: format!(
                    "Profile '{}' is invalid. Use 2-40 letters, digits, dots, hyphens or underscores.",
                    name
                ),
            });
        }
    }

    Ok(())
}

/// Validate the worker count.
pub fn validate_workers(workers: usize) -> Result<()> {
    if workers == 0 || workers > MAX_WORKERS {
        return Err(Error::ConfigValidation {
            field: "workers".to_string(),
            message: format!("Must be between 1 and {} (got {})", MAX_WORKERS, workers),
        });
    }

    Ok(())
}

/// Validate the re-encode fallback parameters.
pub fn validate_transcode(preset: &str, crf: u8) -> Result<()> {
    if !X264_PRESETS.contains(&preset) {
        return Err(Error::ConfigValidation {
            field: "preset".to_string(),
            message: format!(
                "Unknown preset '{}'. Expected one of: {}",
                preset,
                X264_PRESETS.join(", ")
            ),
        });
    }

    if crf > MAX_CRF {
        return Err(Error::ConfigValidation {
            field: "crf".to_string(),
            message: format!("Must be between 0 and {} (got {})", MAX_CRF, crf),
        });
    }

    Ok(())
}
