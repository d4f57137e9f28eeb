//! Images, samplers and textures.

use std::sync::Arc;

use serde_json::Value;

use super::json;
use super::sink::{ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// An encoded pixel payload.
///
/// Sourced from exactly one of: an external path, an inline data URI, or a
/// buffer view plus mime type. Pixel decoding is an external collaborator's
/// job; this crate only carries the encoded bytes.
#[derive(Debug, Clone, Default)]
pub struct Image {
    /// External path or data URI.
    pub uri: Option<String>,
    /// Required when sourcing from a buffer view.
    pub mime_type: Option<String>,
    /// Buffer-view source; its buffer must be resolved first.
    pub buffer_view: ElementId,
    /// Resolved encoded payload; None until resolution or after failure.
    pub data: Option<Arc<[u8]>>,
    pub base: ElementBase,
}

impl Image {
    /// Payload bytes, if resolution succeeded.
    #[inline]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl PropertySink for Image {
    const KIND: &'static str = "images";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "uri" => {
                let parsed = json::as_str(value);
                cx.store_some(name, value, parsed, &mut self.uri);
            }
            "mimeType" => {
                let parsed = json::as_str(value);
                cx.store_some(name, value, parsed, &mut self.mime_type);
            }
            "bufferView" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.buffer_view);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// Default wrap mode (REPEAT).
pub const WRAP_REPEAT: u32 = 10497;

/// Filter and wrap enumerations for sampling a texture.
/// The numeric values are kept verbatim for the GPU layer to interpret.
#[derive(Debug, Clone)]
pub struct Sampler {
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: u32,
    pub wrap_t: u32,
    pub base: ElementBase,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            mag_filter: None,
            min_filter: None,
            wrap_s: WRAP_REPEAT,
            wrap_t: WRAP_REPEAT,
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for Sampler {
    const KIND: &'static str = "samplers";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "magFilter" => {
                let parsed = json::as_u32(value);
                cx.store_some(name, value, parsed, &mut self.mag_filter);
            }
            "minFilter" => {
                let parsed = json::as_u32(value);
                cx.store_some(name, value, parsed, &mut self.min_filter);
            }
            "wrapS" => {
                let parsed = json::as_u32(value);
                cx.store(name, value, parsed, &mut self.wrap_s);
            }
            "wrapT" => {
                let parsed = json::as_u32(value);
                cx.store(name, value, parsed, &mut self.wrap_t);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// Pairs an optional sampler with an optional image.
///
/// A texture with no image is a soft failure downstream: the material slot
/// stays empty and building continues.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub sampler: ElementId,
    pub source: ElementId,
    pub base: ElementBase,
}

impl PropertySink for Texture {
    const KIND: &'static str = "textures";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "sampler" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.sampler);
            }
            "source" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.source);
            }
            _ => cx.unknown_property(name),
        }
    }
}
