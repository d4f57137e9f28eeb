//! The typed in-memory document and its schema dispatch.
//!
//! Parsing walks an externally supplied [`serde_json::Value`] tree and
//! populates typed records for every element array through the
//! property-sink contract in [`sink`]. Unrecognized names and value-kind
//! mismatches become accumulated [`Diagnostics`] rather than hard errors;
//! the strict entry points apply the all-or-nothing policy afterwards.

mod accessor;
mod animation;
mod buffer;
mod camera;
mod diagnostics;
mod extensions;
mod id;
mod image;
mod json;
mod material;
mod mesh;
mod node;
mod sink;
mod skin;

pub use accessor::{Accessor, Sparse, SparseIndices, SparseValues};
pub use animation::{
    Animation, AnimationSampler, Channel, ChannelTarget, Interpolation, TargetPath,
};
pub use buffer::{Buffer, BufferView};
pub use camera::{Camera, Orthographic, Perspective};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use extensions::{
    CapturedExtension, EmissiveStrengthExt, Extension, ExtensionParser, ExtensionRegistry,
    InstancingExt, IorExt, SpecularExt, SpecularGlossinessExt,
};
pub use id::ElementId;
pub use image::{Image, Sampler, Texture, WRAP_REPEAT};
pub use material::{AlphaMode, Material, PbrMetallicRoughness, TextureSlot};
pub use mesh::{AttributeMap, Mesh, Primitive, Semantic, TopologyMode};
pub use node::{Node, Scene};
pub use sink::{ElementBase, ParseCx};
pub use skin::Skin;

use serde_json::Value;

use crate::util::{Error, Result};
use sink::{parse_array, parse_into, PropertySink};

/// The `asset` header block.
#[derive(Debug, Clone, Default)]
pub struct Asset {
    pub version: String,
    pub min_version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
    pub base: ElementBase,
}

impl PropertySink for Asset {
    const KIND: &'static str = "asset";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "version" => {
                let parsed = json::as_str(value);
                cx.store(name, value, parsed, &mut self.version);
            }
            "minVersion" => {
                let parsed = json::as_str(value);
                cx.store_some(name, value, parsed, &mut self.min_version);
            }
            "generator" => {
                let parsed = json::as_str(value);
                cx.store_some(name, value, parsed, &mut self.generator);
            }
            "copyright" => {
                let parsed = json::as_str(value);
                cx.store_some(name, value, parsed, &mut self.copyright);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// The whole parsed document: ordered collections of every element type.
///
/// Created once per parse and discarded after the scene graph is built;
/// nothing in the output graph holds back-references into it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub asset: Asset,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub accessors: Vec<Accessor>,
    pub images: Vec<Image>,
    pub samplers: Vec<Sampler>,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
    pub cameras: Vec<Camera>,
    pub nodes: Vec<Node>,
    pub scenes: Vec<Scene>,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
    /// Default scene index.
    pub scene: ElementId,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
    pub base: ElementBase,
}

impl PropertySink for Document {
    const KIND: &'static str = "document";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "asset" => {
                cx.enter("asset");
                parse_into(&mut self.asset, value, cx);
                cx.leave();
            }
            "buffers" => parse_array(value, &mut self.buffers, cx),
            "bufferViews" => parse_array(value, &mut self.buffer_views, cx),
            "accessors" => parse_array(value, &mut self.accessors, cx),
            "images" => parse_array(value, &mut self.images, cx),
            "samplers" => parse_array(value, &mut self.samplers, cx),
            "textures" => parse_array(value, &mut self.textures, cx),
            "materials" => parse_array(value, &mut self.materials, cx),
            "meshes" => parse_array(value, &mut self.meshes, cx),
            "cameras" => parse_array(value, &mut self.cameras, cx),
            "nodes" => parse_array(value, &mut self.nodes, cx),
            "scenes" => parse_array(value, &mut self.scenes, cx),
            "skins" => parse_array(value, &mut self.skins, cx),
            "animations" => parse_array(value, &mut self.animations, cx),
            "scene" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.scene);
            }
            "extensionsUsed" => {
                let parsed = json::as_string_vec(value);
                cx.store(name, value, parsed, &mut self.extensions_used);
            }
            "extensionsRequired" => {
                let parsed = json::as_string_vec(value);
                cx.store(name, value, parsed, &mut self.extensions_required);
            }
            _ => cx.unknown_property(name),
        }
    }
}

impl Document {
    /// Parse a JSON value tree, returning the document together with every
    /// accumulated diagnostic. The caller decides the pass/fail policy.
    pub fn parse_with_report(root: &Value, registry: &ExtensionRegistry) -> (Document, Diagnostics) {
        let mut doc = Document::default();
        let mut diags = Diagnostics::new();
        let mut cx = ParseCx::new(registry, &mut diags);
        parse_into(&mut doc, root, &mut cx);
        (doc, diags)
    }

    /// Parse a JSON value tree with the strict all-or-nothing policy: any
    /// accumulated diagnostic fails the whole parse.
    pub fn parse(root: &Value, registry: &ExtensionRegistry) -> Result<Document> {
        if !root.is_object() {
            return Err(Error::NotAnObject);
        }
        let (doc, diags) = Self::parse_with_report(root, registry);
        if diags.is_empty() {
            Ok(doc)
        } else {
            Err(Error::ParseFailed {
                count: diags.len(),
                first: diags.first().map(ToString::to_string).unwrap_or_default(),
            })
        }
    }

    /// Strict parse from JSON text.
    pub fn from_json_str(text: &str, registry: &ExtensionRegistry) -> Result<Document> {
        let root: Value = serde_json::from_str(text)?;
        Self::parse(&root, registry)
    }

    /// Strict parse from JSON bytes.
    pub fn from_json_slice(bytes: &[u8], registry: &ExtensionRegistry) -> Result<Document> {
        let root: Value = serde_json::from_slice(bytes)?;
        Self::parse(&root, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ExtensionRegistry {
        ExtensionRegistry::default()
    }

    #[test]
    fn test_minimal_document() {
        let root = json!({
            "asset": { "version": "2.0", "generator": "test" },
            "buffers": [{ "byteLength": 16 }],
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0 }],
            "scene": 0
        });
        let doc = Document::parse(&root, &registry()).unwrap();
        assert_eq!(doc.asset.version, "2.0");
        assert_eq!(doc.buffers.len(), 1);
        assert_eq!(doc.buffers[0].byte_length, 16);
        assert_eq!(doc.scene.index(), Some(0));
        assert_eq!(doc.nodes[0].mesh.index(), Some(0));
    }

    #[test]
    fn test_unknown_property_is_one_diagnostic_and_siblings_survive() {
        let root = json!({
            "asset": { "version": "2.0" },
            "nodes": [
                { "mesh": 0, "bogusField": true, "camera": 1 },
                { "mesh": 2 }
            ],
            "meshes": []
        });
        let (doc, diags) = Document::parse_with_report(&root, &registry());
        // One diagnostic for the unknown name, nothing else lost.
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.first().unwrap().kind, DiagnosticKind::UnknownProperty);
        assert!(diags.first().unwrap().path.contains("nodes[0]"));
        assert_eq!(doc.nodes[0].mesh.index(), Some(0));
        assert_eq!(doc.nodes[0].camera.index(), Some(1));
        assert_eq!(doc.nodes[1].mesh.index(), Some(2));
    }

    #[test]
    fn test_strict_policy_fails_on_any_diagnostic() {
        let root = json!({
            "asset": { "version": "2.0" },
            "nodes": [{ "bogusField": true }]
        });
        let err = Document::parse(&root, &registry()).unwrap_err();
        assert!(matches!(err, Error::ParseFailed { count: 1, .. }));
    }

    #[test]
    fn test_co_present_numeric_fields_both_consumed() {
        // Both fields of a pair must land; dispatch never skips the second.
        let root = json!({
            "asset": { "version": "2.0" },
            "samplers": [{ "magFilter": 9729, "minFilter": 9987, "wrapS": 33071, "wrapT": 33648 }]
        });
        let doc = Document::parse(&root, &registry()).unwrap();
        let s = &doc.samplers[0];
        assert_eq!(s.mag_filter, Some(9729));
        assert_eq!(s.min_filter, Some(9987));
        assert_eq!(s.wrap_s, 33071);
        assert_eq!(s.wrap_t, 33648);
    }

    #[test]
    fn test_material_with_extensions() {
        let root = json!({
            "asset": { "version": "2.0" },
            "materials": [{
                "pbrMetallicRoughness": {
                    "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
                    "metallicFactor": 0.0
                },
                "alphaMode": "MASK",
                "alphaCutoff": 0.25,
                "doubleSided": true,
                "extensions": {
                    "KHR_materials_ior": { "ior": 1.45 },
                    "KHR_materials_unlit": {},
                    "ACME_sparkle": { "amount": 11 }
                }
            }]
        });
        let doc = Document::parse(&root, &registry()).unwrap();
        let mat = &doc.materials[0];
        assert_eq!(mat.pbr.base_color_factor, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(mat.alpha_mode, AlphaMode::Mask);
        assert_eq!(mat.alpha_cutoff, 0.25);
        assert!(mat.double_sided);
        assert_eq!(mat.ior().unwrap().ior, 1.45);
        assert!(mat.unlit());
        // The unknown vendor extension survives as an opaque capture.
        let captured = mat
            .base
            .extensions
            .iter()
            .find_map(|e| match e {
                Extension::Captured(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(captured.name, "ACME_sparkle");
        assert_eq!(captured.get("amount"), Some(&json!(11)));
    }

    #[test]
    fn test_mesh_primitives_and_targets() {
        let root = json!({
            "asset": { "version": "2.0" },
            "meshes": [{
                "primitives": [{
                    "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 },
                    "indices": 3,
                    "material": 0,
                    "mode": 4,
                    "targets": [{ "POSITION": 4 }]
                }],
                "weights": [0.5]
            }]
        });
        let doc = Document::parse(&root, &registry()).unwrap();
        let prim = &doc.meshes[0].primitives[0];
        assert_eq!(prim.attribute(&Semantic::Position).index(), Some(0));
        assert_eq!(prim.attribute(&Semantic::TexCoord(0)).index(), Some(2));
        assert_eq!(prim.indices.index(), Some(3));
        assert_eq!(prim.mode, TopologyMode::Triangles);
        assert_eq!(prim.targets.len(), 1);
        assert_eq!(doc.meshes[0].weights, vec![0.5]);
    }
}
