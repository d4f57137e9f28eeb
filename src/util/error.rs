//! Error types for the gltfkit library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for gltfkit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of a binary container
    #[error("Invalid GLB container: expected glTF magic bytes")]
    InvalidMagic,

    /// Unsupported binary container version
    #[error("Unsupported GLB version: {0}")]
    UnsupportedVersion(u32),

    /// Container is truncated or corrupted
    #[error("Unexpected end of data at offset {0}")]
    UnexpectedEof(u64),

    /// Invalid binary container structure
    #[error("Invalid container structure: {0}")]
    InvalidContainer(String),

    /// The document is not valid JSON
    #[error("Document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but accumulated schema diagnostics
    #[error("Document parse failed with {count} diagnostic(s); first: {first}")]
    ParseFailed { count: usize, first: String },

    /// The document top level is not a JSON object
    #[error("Document root is not a JSON object")]
    NotAnObject,

    /// Malformed inline data URI
    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    /// Invalid base64 payload
    #[error("Invalid base64 character 0x{0:02x}")]
    InvalidBase64(u8),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid container error.
    pub fn container(msg: impl Into<String>) -> Self {
        Self::InvalidContainer(msg.into())
    }
}

/// Result type alias for gltfkit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::InvalidMagic;
        assert!(e.to_string().contains("magic"));

        let e = Error::UnsupportedVersion(3);
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
