//! Accessors: typed, strided views over buffer views.

use serde_json::Value;

use crate::layout::{AccessorLayout, ComponentType, ElementType};

use super::json;
use super::sink::{parse_into, ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// A typed, strided view over one [`super::BufferView`].
///
/// An accessor with no buffer view is legal and denotes "no data" (unless a
/// sparse overlay supplies some), not an error.
#[derive(Debug, Clone, Default)]
pub struct Accessor {
    pub buffer_view: ElementId,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub count: usize,
    pub normalized: bool,
    pub min: Option<Vec<f32>>,
    pub max: Option<Vec<f32>>,
    pub sparse: Option<Sparse>,
    pub base: ElementBase,
}

impl Accessor {
    /// Combined component/shape layout.
    #[inline]
    pub fn layout(&self) -> AccessorLayout {
        AccessorLayout::new(self.component_type, self.element_type)
    }

    /// Min/max pair as glam Vec3, when both are 3-component (POSITION).
    pub fn bounds_vec3(&self) -> Option<(glam::Vec3, glam::Vec3)> {
        let min = self.min.as_deref()?;
        let max = self.max.as_deref()?;
        if min.len() == 3 && max.len() == 3 {
            Some((glam::Vec3::from_slice(min), glam::Vec3::from_slice(max)))
        } else {
            None
        }
    }
}

impl PropertySink for Accessor {
    const KIND: &'static str = "accessors";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "bufferView" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.buffer_view);
            }
            "byteOffset" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.byte_offset);
            }
            "componentType" => match json::as_u32(value).and_then(ComponentType::from_code) {
                Some(ct) => self.component_type = ct,
                None => cx.invalid(format!("unknown component type {value}")),
            },
            "type" => match value.as_str().and_then(ElementType::from_name) {
                Some(et) => self.element_type = et,
                None => cx.invalid(format!("unknown element type {value}")),
            },
            "count" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.count);
            }
            "normalized" => {
                let parsed = json::as_bool(value);
                cx.store(name, value, parsed, &mut self.normalized);
            }
            "min" => {
                let parsed = json::as_f32_vec(value);
                cx.store_some(name, value, parsed, &mut self.min);
            }
            "max" => {
                let parsed = json::as_f32_vec(value);
                cx.store_some(name, value, parsed, &mut self.max);
            }
            "sparse" => {
                cx.enter("sparse");
                let mut sparse = Sparse::default();
                parse_into(&mut sparse, value, cx);
                cx.leave();
                self.sparse = Some(sparse);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// Sparse overlay: k index/value pairs applied over the dense view.
#[derive(Debug, Clone, Default)]
pub struct Sparse {
    /// Number of overridden elements; must be <= the accessor count.
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
    pub base: ElementBase,
}

impl PropertySink for Sparse {
    const KIND: &'static str = "sparse";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "count" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.count);
            }
            "indices" => {
                cx.enter("indices");
                parse_into(&mut self.indices, value, cx);
                cx.leave();
            }
            "values" => {
                cx.enter("values");
                parse_into(&mut self.values, value, cx);
                cx.leave();
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// Where the sparse element indices live.
#[derive(Debug, Clone, Default)]
pub struct SparseIndices {
    pub buffer_view: ElementId,
    pub byte_offset: usize,
    /// One of the unsigned integer component types.
    pub component_type: ComponentType,
    pub base: ElementBase,
}

impl PropertySink for SparseIndices {
    const KIND: &'static str = "indices";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "bufferView" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.buffer_view);
            }
            "byteOffset" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.byte_offset);
            }
            "componentType" => match json::as_u32(value).and_then(ComponentType::from_code) {
                Some(ct) => self.component_type = ct,
                None => cx.invalid(format!("unknown component type {value}")),
            },
            _ => cx.unknown_property(name),
        }
    }
}

/// Where the sparse replacement values live.
#[derive(Debug, Clone, Default)]
pub struct SparseValues {
    pub buffer_view: ElementId,
    pub byte_offset: usize,
    pub base: ElementBase,
}

impl PropertySink for SparseValues {
    const KIND: &'static str = "values";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "bufferView" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.buffer_view);
            }
            "byteOffset" => {
                let parsed = json::as_usize(value);
                cx.store(name, value, parsed, &mut self.byte_offset);
            }
            _ => cx.unknown_property(name),
        }
    }
}
