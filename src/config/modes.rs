//! Media selection definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::media::MediaKind;

/// Which media types to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSelection {
    /// Download only photos.
    Photos,
    /// Download only videos.
    Videos,
    /// Download photos and videos (default).
    #[default]
    Both,
}

impl MediaSelection {
    /// Whether items of `kind` are selected.
    pub fn includes(&self, kind: MediaKind) -> bool {
        matches!(
            (self, kind),
            (MediaSelection::Both, _)
                | (MediaSelection::Photos, MediaKind::Image)
                | (MediaSelection::Videos, MediaKind::Video)
        )
    }
}

impl fmt::Display for MediaSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSelection::Photos => write!(f, "photos"),
            MediaSelection::Videos => write!(f, "videos"),
            MediaSelection::Both => write!(f, "both"),
        }
    }
}

impl FromStr for MediaSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "photos" | "1" => Ok(MediaSelection::Photos),
            "videos" | "2" => Ok(MediaSelection::Videos),
            "both" | "3" => Ok(MediaSelection::Both),
            _ => Err(format!("Unknown media selection: {}", s)),
        }
    }
}
