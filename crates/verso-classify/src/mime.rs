use std::path::Path;

use verso_fs::{FileSystem, FsResult};

/// Number of leading bytes inspected when sniffing content.
pub const SNIFF_BYTES: usize = 8 * 1024;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain";

/// Non-`text/*` types whose content is line-oriented text.
const TEXTUAL_APPLICATION_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
];

/// Whether a MIME type names diffable text.
pub fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/") || TEXTUAL_APPLICATION_TYPES.contains(&mime)
}

/// Detect the MIME type of a file, content first.
///
/// A NUL byte or invalid UTF-8 in the first [`SNIFF_BYTES`] means binary.
/// Text content then takes the extension-based guess when that guess is
/// textual, and falls back to `text/plain` otherwise.
pub fn detect(fs: &dyn FileSystem, path: &Path) -> FsResult<String> {
    let prefix = fs.read_prefix(path, SNIFF_BYTES)?;
    if !looks_like_text(&prefix, prefix.len() == SNIFF_BYTES) {
        return Ok(OCTET_STREAM.to_string());
    }
    let guessed = mime_guess::from_path(path)
        .iter()
        .map(|m| m.essence_str().to_string())
        .find(|m| is_textual(m));
    Ok(guessed.unwrap_or_else(|| TEXT_PLAIN.to_string()))
}

/// `truncated` tells whether `prefix` may end inside a multi-byte sequence.
fn looks_like_text(prefix: &[u8], truncated: bool) -> bool {
    if prefix.contains(&0) {
        return false;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}
