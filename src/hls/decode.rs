//! Playlist text decoding.
//!
//! Playlists are not guaranteed to be UTF-8. Decoding is two explicit steps:
//! guess the charset from the raw bytes, then decode with that charset,
//! replacing anything undecodable instead of failing.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Guess the character encoding of raw playlist bytes.
///
/// A byte-order mark wins; otherwise the guess comes from content heuristics.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode raw playlist bytes into text, never failing.
pub fn decode_playlist(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::trace!(
            "Playlist contained bytes invalid for {}, replaced",
            encoding.name()
        );
    }
    text.into_owned()
}
