//! Upload file naming and MIME type derivation

use std::path::Path;

/// Fallback used when an asset has no usable file name
const DEFAULT_FILE_NAME: &str = "creative.png";

/// MIME content type derived from a file extension
///
/// `jpg` normalizes to `image/jpeg`; unknown or absent extensions are
/// treated as PNG rather than rejected.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "image/png",
    }
}

/// File name sent with the upload credential request
pub fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}
