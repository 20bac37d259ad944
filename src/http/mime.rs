//! MIME type detection based on file extensions.

use std::path::Path;

/// Fallback used when an extension has no registered type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Looks up the MIME type for an extension.
///
/// The extension may be given with or without its leading dot (`.html` or
/// `html`). Returns `None` for unknown or empty extensions.
pub fn type_by_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() {
        return None;
    }
    mime_guess::from_ext(ext).first_raw()
}

/// Content-Type to send for the file at `path`.
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(type_by_extension)
        .unwrap_or(OCTET_STREAM)
}
