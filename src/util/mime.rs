//! mime-type to file-extension mapping.
//!
//! The extension is used as a hint when handing an encoded image payload to
//! an external pixel decoder; gltfkit itself never decodes pixels.

/// Map an image mime type to the conventional file extension.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/bmp" => Some("bmp"),
        "image/gif" => Some("gif"),
        "image/ktx" => Some("ktx"),
        "image/ktx2" => Some("ktx2"),
        _ => None,
    }
}

/// Guess a mime type from a file path's extension.
pub fn mime_for_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "bmp" => Some("image/bmp"),
        "gif" => Some("image/gif"),
        "ktx" => Some("image/ktx"),
        "ktx2" => Some("image/ktx2"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mime_types() {
        assert_eq!(extension_for_mime("image/png"), Some("png"));
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("image/ktx2"), Some("ktx2"));
        assert_eq!(extension_for_mime("video/mp4"), None);
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path("textures/albedo.PNG"), Some("image/png"));
        assert_eq!(mime_for_path("albedo.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_path("notes.txt"), None);
    }
}
