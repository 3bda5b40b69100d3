//! Line classification for HLS playlists.
//!
//! Every playlist line falls into exactly one [`PlaylistLine`] variant, so the
//! variant selector and the localizer dispatch on a tag instead of repeating
//! prefix checks.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Stream-info directive of a master playlist.
pub const STREAM_INF_TAG: &str = "#EXT-X-STREAM-INF";

/// Segment key directive.
pub const KEY_TAG: &str = "#EXT-X-KEY";

/// Session key directive of a master playlist.
pub const SESSION_KEY_TAG: &str = "#EXT-X-SESSION-KEY";

static BANDWIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:,]BANDWIDTH=(\d+)").expect("bandwidth pattern is valid"));

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"URI="([^"]+)""#).expect("uri pattern is valid"));

/// One classified playlist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistLine<'a> {
    /// `#EXT-X-STREAM-INF` with its `BANDWIDTH`, when present.
    StreamInfo { bandwidth: Option<u64> },
    /// `#EXT-X-KEY` / `#EXT-X-SESSION-KEY` carrying a `URI="..."` attribute.
    Key(KeyDirective<'a>),
    /// A URI line (segment or variant playlist), trimmed.
    Uri(&'a str),
    /// Blank lines, comments and directives without a URI.
    Passthrough,
}

/// A key directive and the location of its `URI="..."` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirective<'a> {
    line: &'a str,
    attribute: Range<usize>,
    uri: Range<usize>,
}

impl<'a> KeyDirective<'a> {
    /// The key URI as written in the playlist.
    pub fn uri(&self) -> &'a str {
        &self.line[self.uri.clone()]
    }

    /// The directive with its `URI` attribute pointed at `local_name`.
    pub fn with_uri(&self, local_name: &str) -> String {
        format!(
            "{}URI=\"{}\"{}",
            &self.line[..self.attribute.start],
            local_name,
            &self.line[self.attribute.end..]
        )
    }
}

/// Classify a single playlist line.
pub fn classify(line: &str) -> PlaylistLine<'_> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return PlaylistLine::Passthrough;
    }

    if trimmed.starts_with(STREAM_INF_TAG) {
        let bandwidth = BANDWIDTH_RE
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());
        return PlaylistLine::StreamInfo { bandwidth };
    }

    if trimmed.starts_with(KEY_TAG) || trimmed.starts_with(SESSION_KEY_TAG) {
        return match URI_RE.captures(line) {
            Some(captures) => match (captures.get(0), captures.get(1)) {
                (Some(attribute), Some(uri)) => PlaylistLine::Key(KeyDirective {
                    line,
                    attribute: attribute.range(),
                    uri: uri.range(),
                }),
                _ => PlaylistLine::Passthrough,
            },
            None => PlaylistLine::Passthrough,
        };
    }

    if trimmed.starts_with('#') {
        return PlaylistLine::Passthrough;
    }

    PlaylistLine::Uri(trimmed)
}
