//! Splitting and decoding of `data:` URIs.
//!
//! Grammar: `data:<mimeType>;<encoding>,<payload>`. Only `base64` is
//! recognized as an encoding; anything else fails the individual resource
//! without aborting its siblings.

use crate::util::{base64, Error, Result};

/// The dissected parts of a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Declared mime type, e.g. `image/png` or `application/octet-stream`.
    pub mime_type: &'a str,
    /// Declared payload encoding, e.g. `base64`.
    pub encoding: &'a str,
    /// The raw (still encoded) payload text.
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Check whether a URI string is a data URI at all.
    #[inline]
    pub fn matches(uri: &str) -> bool {
        uri.starts_with("data:")
    }

    /// Split a data URI into mime type, encoding and payload.
    pub fn parse(uri: &'a str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::MalformedDataUri("missing data: scheme".into()))?;
        let comma = rest
            .find(',')
            .ok_or_else(|| Error::MalformedDataUri("missing payload separator".into()))?;
        let (header, payload) = (&rest[..comma], &rest[comma + 1..]);

        let (mime_type, encoding) = match header.find(';') {
            Some(semi) => (&header[..semi], &header[semi + 1..]),
            None => (header, ""),
        };

        Ok(Self { mime_type, encoding, payload })
    }

    /// Decode the payload. Only base64 encoding is supported.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if self.encoding != "base64" {
            return Err(Error::MalformedDataUri(format!(
                "unsupported encoding \"{}\"",
                self.encoding
            )));
        }
        base64::decode(self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_decode() {
        let uri = "data:application/octet-stream;base64,AAECAw==";
        let parsed = DataUri::parse(uri).unwrap();
        assert_eq!(parsed.mime_type, "application/octet-stream");
        assert_eq!(parsed.encoding, "base64");
        assert_eq!(parsed.decode().unwrap(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_matches() {
        assert!(DataUri::matches("data:image/png;base64,xyz"));
        assert!(!DataUri::matches("scene.bin"));
    }

    #[test]
    fn test_unsupported_encoding() {
        let parsed = DataUri::parse("data:text/plain;charset=utf8,hi").unwrap();
        assert!(matches!(parsed.decode(), Err(Error::MalformedDataUri(_))));
    }

    #[test]
    fn test_missing_comma() {
        assert!(DataUri::parse("data:image/png;base64").is_err());
    }
}
