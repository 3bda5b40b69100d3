//! Best-quality variant selection from a master playlist.

use url::Url;

use crate::hls::playlist::{classify, PlaylistLine};

/// Pick the highest-bandwidth variant of a master playlist.
///
/// Each `#EXT-X-STREAM-INF` line arms a candidate which the next URI line
/// completes; the URI is resolved against `master_url`. Ties keep the first
/// variant seen. Returns `None` when the playlist holds no complete pair or
/// `master_url` cannot be parsed.
pub fn select_best_variant(master_url: &str, content: &str) -> Option<String> {
    let base = Url::parse(master_url).ok()?;

    let mut pending: Option<u64> = None;
    let mut best: Option<(u64, Url)> = None;

    for line in content.lines() {
        match classify(line) {
            PlaylistLine::StreamInfo { bandwidth } => pending = bandwidth,
            PlaylistLine::Uri(uri) => {
                let Some(bandwidth) = pending.take() else {
                    continue;
                };
                let Ok(resolved) = base.join(uri) else {
                    continue;
                };
                if best.as_ref().map_or(true, |(max, _)| bandwidth > *max) {
                    best = Some((bandwidth, resolved));
                }
            }
            PlaylistLine::Key(_) | PlaylistLine::Passthrough => {}
        }
    }

    best.map(|(_, url)| url.to_string())
}
