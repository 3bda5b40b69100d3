//! Local file name validation.
//!
//! Names derived from remote data (URL basenames, profile names) are checked
//! before they touch the filesystem.

use crate::error::{Error, Result};

/// Characters most filesystems refuse in a name.
const RESERVED: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

fn reject_unsafe(name: &str) -> Result<()> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    Ok(())
}

fn replace_chars(name: &str, separators: bool) -> Result<String> {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() || (separators && (c == '/' || c == '\\'))
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Name cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a single file name.
///
/// Rejects traversal, separators and null bytes; replaces reserved and
/// control characters with `_`.
pub fn sanitize_filename(name: &str) -> Result<String> {
    reject_unsafe(name)?;

    if name.contains(['/', '\\']) {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    replace_chars(name, false)
}

/// Sanitize a folder name such as a profile name. Separators are replaced
/// rather than rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    reject_unsafe(name)?;
    replace_chars(name, true)
}
