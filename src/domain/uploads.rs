//! Image attachment rules enforced before anything is sent.

use std::path::Path;

/// Extensions the backend's image endpoint accepts.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Lower-cased extension of `path` when it is an accepted image type.
#[must_use]
pub fn image_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// MIME type sent with the multipart `file` part.
#[must_use]
pub fn image_mime(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}
