//! Binary container (GLB) parsing.
//!
//! A GLB file is a 12-byte header followed by length-prefixed chunks. The
//! first chunk is always the JSON document; an optional second chunk holds
//! the binary payload referenced by the document's first uri-less buffer.

use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

use crate::document::{Buffer, Document};
use crate::util::{Error, Result};

/// Magic bytes at the start of a GLB file, "glTF" little-endian.
pub const GLB_MAGIC: u32 = 0x46546C67;

/// Container version this reader accepts.
pub const GLB_VERSION: u32 = 2;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Size of each chunk header (length + type) in bytes.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Chunk type tag for the JSON document chunk, "JSON".
pub const CHUNK_JSON: u32 = 0x4E4F534A;

/// Chunk type tag for the binary payload chunk, "BIN\0".
pub const CHUNK_BIN: u32 = 0x004E4942;

/// A split GLB container: the JSON chunk plus the optional binary chunk.
#[derive(Debug)]
pub struct Glb<'a> {
    /// Declared total file length from the header.
    pub declared_length: u32,
    /// The JSON document chunk, unparsed.
    pub json: &'a [u8],
    /// The binary payload chunk, if present.
    pub binary: Option<&'a [u8]>,
}

/// Check whether a byte slice starts with the GLB magic.
#[inline]
pub fn is_glb(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4] == GLB_MAGIC.to_le_bytes()
}

impl<'a> Glb<'a> {
    /// Split a GLB byte stream into its chunks without copying.
    pub fn from_slice(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof(bytes.len() as u64));
        }
        let mut cursor = Cursor::new(bytes);
        let magic = cursor.read_u32::<LittleEndian>()?;
        if magic != GLB_MAGIC {
            return Err(Error::InvalidMagic);
        }
        let version = cursor.read_u32::<LittleEndian>()?;
        if version != GLB_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let declared_length = cursor.read_u32::<LittleEndian>()?;
        if (declared_length as usize) > bytes.len() {
            return Err(Error::UnexpectedEof(bytes.len() as u64));
        }

        let mut json: Option<&[u8]> = None;
        let mut binary: Option<&[u8]> = None;
        let mut offset = HEADER_SIZE;
        while offset + CHUNK_HEADER_SIZE <= declared_length as usize {
            let mut head = Cursor::new(&bytes[offset..]);
            let length = head.read_u32::<LittleEndian>()? as usize;
            let kind = head.read_u32::<LittleEndian>()?;
            let start = offset + CHUNK_HEADER_SIZE;
            let end = start + length;
            if end > bytes.len() {
                return Err(Error::UnexpectedEof(bytes.len() as u64));
            }
            match kind {
                CHUNK_JSON if json.is_none() => json = Some(&bytes[start..end]),
                CHUNK_BIN if binary.is_none() => binary = Some(&bytes[start..end]),
                other => {
                    // Unknown chunk types are skipped, per the container rules.
                    debug!(target: "gltfkit::glb", "skipping chunk type {other:#010x} ({length} bytes)");
                }
            }
            offset = end;
        }

        let json = json.ok_or_else(|| Error::container("missing JSON chunk"))?;
        Ok(Self {
            declared_length,
            json,
            binary,
        })
    }
}

/// Attach a GLB binary chunk to the document's buffer list.
///
/// The chunk belongs to the first uri-less buffer whose declared length
/// fits the chunk. When no such buffer exists a new one is synthesized so
/// the payload is never silently dropped.
pub fn bind_binary_chunk(doc: &mut Document, bin: &[u8]) {
    let data: Arc<[u8]> = Arc::from(bin);
    for (i, buffer) in doc.buffers.iter_mut().enumerate() {
        if buffer.uri.is_none() && buffer.data.is_none() {
            if buffer.byte_length > bin.len() {
                warn!(
                    target: "gltfkit::glb",
                    "buffer {i} declares {} bytes but the binary chunk holds {}",
                    buffer.byte_length,
                    bin.len()
                );
                continue;
            }
            buffer.data = Some(data);
            return;
        }
    }
    warn!(target: "gltfkit::glb", "no uri-less buffer for the binary chunk, synthesizing one");
    doc.buffers.push(Buffer {
        byte_length: bin.len(),
        data: Some(data),
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn build_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
        // Chunks are 4-byte aligned; JSON pads with spaces, BIN with zeros.
        let mut json = json.to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut out = Vec::new();
        out.extend(GLB_MAGIC.to_le_bytes());
        out.extend(GLB_VERSION.to_le_bytes());
        out.extend(0u32.to_le_bytes()); // patched below
        out.extend((json.len() as u32).to_le_bytes());
        out.extend(CHUNK_JSON.to_le_bytes());
        out.extend(&json);
        if let Some(bin) = bin {
            let mut bin = bin.to_vec();
            while bin.len() % 4 != 0 {
                bin.push(0);
            }
            out.extend((bin.len() as u32).to_le_bytes());
            out.extend(CHUNK_BIN.to_le_bytes());
            out.extend(&bin);
        }
        let total = out.len() as u32;
        out[8..12].copy_from_slice(&total.to_le_bytes());
        out
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut glb = build_glb(b"{}", None);
        glb[0] = b'X';
        assert!(matches!(Glb::from_slice(&glb), Err(Error::InvalidMagic)));
        assert!(!is_glb(&glb));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut glb = build_glb(b"{}", None);
        glb[4..8].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            Glb::from_slice(&glb),
            Err(Error::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_truncated_rejected() {
        let glb = build_glb(b"{}", Some(&[1, 2, 3, 4]));
        assert!(matches!(
            Glb::from_slice(&glb[..glb.len() - 2]),
            Err(Error::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_split_chunks() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        let bin = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let glb = build_glb(json, Some(&bin));
        assert!(is_glb(&glb));
        let split = Glb::from_slice(&glb).unwrap();
        assert!(split.json.starts_with(json));
        assert_eq!(split.binary.unwrap(), &bin);
    }

    #[test]
    fn test_bind_binary_chunk() {
        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            byte_length: 8,
            ..Default::default()
        });
        bind_binary_chunk(&mut doc, &[0u8; 8]);
        assert_eq!(doc.buffers.len(), 1);
        assert_eq!(doc.buffers[0].bytes().unwrap().len(), 8);
    }

    #[test]
    fn test_bind_without_matching_buffer_synthesizes() {
        let mut doc = Document::default();
        bind_binary_chunk(&mut doc, &[0u8; 4]);
        assert_eq!(doc.buffers.len(), 1);
        assert_eq!(doc.buffers[0].byte_length, 4);
    }
}
