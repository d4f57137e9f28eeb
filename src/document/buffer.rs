//! Buffers and buffer views.

use std::sync::Arc;

use serde_json::Value;

use super::json;
use super::sink::{ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// A raw byte blob, populated from exactly one of: an external path, an
/// inline data URI, or the binary container's BIN chunk.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    /// External path or data URI; None for a GLB-bound buffer.
    pub uri: Option<String>,
    /// Declared byte length. Resolution fails softly for this buffer if the
    /// obtained payload disagrees.
    pub byte_length: usize,
    /// Resolved payload; None until resolution, or after a soft failure.
    pub data: Option<Arc<[u8]>>,
    pub base: ElementBase,
}

impl Buffer {
    /// Payload bytes, if resolution succeeded.
    #[inline]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl PropertySink for Buffer {
    const KIND: &'static str = "buffers";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "uri" => {
                let parsed = json::as_str(value);
                cx.store_some(name, value, parsed, &mut self.uri);
            }
            "byteLength" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.byte_length);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// A byte sub-range of one [`Buffer`].
///
/// `byte_offset + byte_length` exceeding the owning buffer is a soft
/// failure at materialization time, not a parse error.
#[derive(Debug, Clone, Default)]
pub struct BufferView {
    pub buffer: ElementId,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Distance between elements for interleaved data; None means packed.
    pub byte_stride: Option<usize>,
    /// GPU binding hint (34962 array / 34963 element array), kept verbatim.
    pub target: Option<u32>,
    pub base: ElementBase,
}

impl BufferView {
    /// Slice this view out of resolved buffer data.
    /// Returns None if the buffer is unresolved or the range is out of bounds.
    pub fn slice<'a>(&self, buffers: &'a [Buffer]) -> Option<&'a [u8]> {
        let data = self.buffer.get(buffers)?.bytes()?;
        let end = self.byte_offset.checked_add(self.byte_length)?;
        data.get(self.byte_offset..end)
    }
}

impl PropertySink for BufferView {
    const KIND: &'static str = "bufferViews";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "buffer" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.buffer);
            }
            "byteOffset" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.byte_offset);
            }
            "byteLength" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.byte_length);
            }
            "byteStride" => {
                let parsed = json::as_usize(value);
                cx.store_some(name, value, parsed, &mut self.byte_stride);
            }
            "target" => {
                let parsed = json::as_u32(value);
                cx.store_some(name, value, parsed, &mut self.target);
            }
            _ => cx.unknown_property(name),
        }
    }
}
