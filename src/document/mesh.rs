//! Meshes, primitives, topology modes and attribute semantics.

use serde_json::Value;

use super::json;
use super::sink::{parse_into, ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// Primitive assembly type, keyed by the glTF mode code 0-6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopologyMode {
    Points,
    Lines,
    /// Flagged downstream: the closing segment back to the first vertex is
    /// not generated automatically.
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl TopologyMode {
    /// Map a glTF mode code (0-6) through the fixed table.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }

    /// True for line-loop, which needs an explicit closing segment.
    #[inline]
    pub const fn needs_closing_segment(self) -> bool {
        matches!(self, Self::LineLoop)
    }
}

/// A vertex attribute semantic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
    /// Instance-rate translation (`EXT_mesh_gpu_instancing`).
    InstanceTranslation,
    /// Instance-rate rotation.
    InstanceRotation,
    /// Instance-rate scale.
    InstanceScale,
    /// Anything else, preserved verbatim.
    Custom(String),
}

impl Semantic {
    /// Parse a semantic name. Unrecognized names become [`Semantic::Custom`].
    pub fn parse(name: &str) -> Self {
        fn set_index(name: &str, prefix: &str) -> Option<u32> {
            name.strip_prefix(prefix)?.parse().ok()
        }
        match name {
            "POSITION" => Self::Position,
            "NORMAL" => Self::Normal,
            "TANGENT" => Self::Tangent,
            "TRANSLATION" => Self::InstanceTranslation,
            "ROTATION" => Self::InstanceRotation,
            "SCALE" => Self::InstanceScale,
            _ => {
                if let Some(i) = set_index(name, "TEXCOORD_") {
                    Self::TexCoord(i)
                } else if let Some(i) = set_index(name, "COLOR_") {
                    Self::Color(i)
                } else if let Some(i) = set_index(name, "JOINTS_") {
                    Self::Joints(i)
                } else if let Some(i) = set_index(name, "WEIGHTS_") {
                    Self::Weights(i)
                } else {
                    Self::Custom(name.to_owned())
                }
            }
        }
    }
}

/// An attribute map: semantic names to accessor indices.
pub type AttributeMap = Vec<(Semantic, ElementId)>;

/// One drawable sub-unit of a mesh.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub attributes: AttributeMap,
    /// Optional index accessor.
    pub indices: ElementId,
    pub material: ElementId,
    pub mode: TopologyMode,
    /// Morph targets, each an attribute map of displacement streams.
    pub targets: Vec<AttributeMap>,
    pub base: ElementBase,
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            attributes: AttributeMap::new(),
            indices: ElementId::NONE,
            material: ElementId::NONE,
            mode: TopologyMode::Triangles,
            targets: Vec::new(),
            base: ElementBase::default(),
        }
    }
}

impl Primitive {
    /// The accessor bound to a semantic, if any.
    pub fn attribute(&self, semantic: &Semantic) -> ElementId {
        self.attributes
            .iter()
            .find(|(s, _)| s == semantic)
            .map(|&(_, id)| id)
            .unwrap_or(ElementId::NONE)
    }
}

fn parse_attribute_map(value: &Value, cx: &mut ParseCx) -> Option<AttributeMap> {
    let map = value.as_object()?;
    let mut out = AttributeMap::with_capacity(map.len());
    for (semantic, index) in map {
        match json::as_id(index) {
            Some(id) => out.push((Semantic::parse(semantic), id)),
            None => cx.type_mismatch(semantic, index),
        }
    }
    Some(out)
}

impl PropertySink for Primitive {
    const KIND: &'static str = "primitives";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "attributes" => match parse_attribute_map(value, cx) {
                Some(attrs) => self.attributes = attrs,
                None => cx.type_mismatch(name, value),
            },
            "indices" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.indices);
            }
            "material" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.material);
            }
            "mode" => match json::as_u32(value).and_then(TopologyMode::from_code) {
                Some(mode) => self.mode = mode,
                None => cx.invalid(format!("topology mode {value} out of range 0-6")),
            },
            "targets" => match value.as_array() {
                Some(targets) => {
                    for (i, target) in targets.iter().enumerate() {
                        cx.enter(format!("targets[{i}]"));
                        match parse_attribute_map(target, cx) {
                            Some(attrs) => self.targets.push(attrs),
                            None => cx.invalid("morph target is not an object"),
                        }
                        cx.leave();
                    }
                }
                None => cx.type_mismatch(name, value),
            },
            _ => cx.unknown_property(name),
        }
    }
}

/// An ordered list of primitives sharing one set of morph weights.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    /// Default morph target weights.
    pub weights: Vec<f32>,
    pub base: ElementBase,
}

impl PropertySink for Mesh {
    const KIND: &'static str = "meshes";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "primitives" => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        cx.enter(format!("primitives[{i}]"));
                        let mut prim = Primitive::default();
                        parse_into(&mut prim, item, cx);
                        self.primitives.push(prim);
                        cx.leave();
                    }
                }
                None => cx.type_mismatch(name, value),
            },
            "weights" => {
                let parsed = json::as_f32_vec(value);
                cx.store(name, value, parsed, &mut self.weights);
            }
            _ => cx.unknown_property(name),
        }
    }
}
