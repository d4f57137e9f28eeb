//! Vendor extension parsing.
//!
//! Extensions dispatch through a name-keyed registry of parser functions,
//! each returning a variant of the tagged [`Extension`] enum. Names the
//! registry does not know fall back to a generic capture that preserves the
//! raw key/value pairs, so unknown vendor data survives the parse instead
//! of being discarded.

use std::collections::HashMap;

use serde_json::Value;
use smallvec::SmallVec;

use super::json;
use super::material::{parse_texture_slot, TextureSlot};
use super::mesh::Semantic;
use super::sink::{parse_into, ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// A parsed extension attached to a document element.
#[derive(Debug, Clone)]
pub enum Extension {
    /// `KHR_materials_specular`
    MaterialsSpecular(SpecularExt),
    /// `KHR_materials_ior`
    MaterialsIor(IorExt),
    /// `KHR_materials_unlit`
    MaterialsUnlit,
    /// `KHR_materials_pbrSpecularGlossiness`
    MaterialsSpecularGlossiness(SpecularGlossinessExt),
    /// `KHR_materials_emissive_strength`
    MaterialsEmissiveStrength(EmissiveStrengthExt),
    /// `EXT_mesh_gpu_instancing`
    MeshGpuInstancing(InstancingExt),
    /// Any extension the registry has no parser for.
    Captured(CapturedExtension),
}

impl Extension {
    /// The extension's registered name.
    pub fn name(&self) -> &str {
        match self {
            Self::MaterialsSpecular(_) => SpecularExt::NAME,
            Self::MaterialsIor(_) => IorExt::NAME,
            Self::MaterialsUnlit => "KHR_materials_unlit",
            Self::MaterialsSpecularGlossiness(_) => SpecularGlossinessExt::NAME,
            Self::MaterialsEmissiveStrength(_) => EmissiveStrengthExt::NAME,
            Self::MeshGpuInstancing(_) => InstancingExt::NAME,
            Self::Captured(c) => &c.name,
        }
    }
}

/// Generic capture of an unknown extension's members.
#[derive(Debug, Clone)]
pub struct CapturedExtension {
    pub name: String,
    /// Member key/value pairs; a non-object extension value is stored as a
    /// single entry with an empty key.
    pub entries: SmallVec<[(String, Value); 4]>,
}

impl CapturedExtension {
    fn capture(name: &str, value: &Value) -> Self {
        let mut entries = SmallVec::new();
        match value.as_object() {
            Some(map) => {
                for (k, v) in map {
                    entries.push((k.clone(), v.clone()));
                }
            }
            None => entries.push((String::new(), value.clone())),
        }
        Self { name: name.to_owned(), entries }
    }

    /// Look up a captured member by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// `KHR_materials_specular` parameters.
#[derive(Debug, Clone)]
pub struct SpecularExt {
    pub specular_factor: f32,
    pub specular_color_factor: [f32; 3],
    pub specular_texture: Option<TextureSlot>,
    pub specular_color_texture: Option<TextureSlot>,
    pub base: ElementBase,
}

impl SpecularExt {
    pub const NAME: &'static str = "KHR_materials_specular";
}

impl Default for SpecularExt {
    fn default() -> Self {
        Self {
            specular_factor: 1.0,
            specular_color_factor: [1.0; 3],
            specular_texture: None,
            specular_color_texture: None,
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for SpecularExt {
    const KIND: &'static str = "KHR_materials_specular";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "specularFactor" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.specular_factor);
            }
            "specularColorFactor" => {
                let parsed = json::as_f32_array::<3>(value);
                cx.store(name, value, parsed, &mut self.specular_color_factor);
            }
            "specularTexture" => {
                self.specular_texture = Some(parse_texture_slot(name, value, cx));
            }
            "specularColorTexture" => {
                self.specular_color_texture = Some(parse_texture_slot(name, value, cx));
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// `KHR_materials_ior` parameters.
#[derive(Debug, Clone)]
pub struct IorExt {
    pub ior: f32,
    pub base: ElementBase,
}

impl IorExt {
    pub const NAME: &'static str = "KHR_materials_ior";
}

impl Default for IorExt {
    fn default() -> Self {
        Self { ior: 1.5, base: ElementBase::default() }
    }
}

impl PropertySink for IorExt {
    const KIND: &'static str = "KHR_materials_ior";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "ior" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.ior);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// `KHR_materials_pbrSpecularGlossiness` parameters.
#[derive(Debug, Clone)]
pub struct SpecularGlossinessExt {
    pub diffuse_factor: [f32; 4],
    pub specular_factor: [f32; 3],
    pub glossiness_factor: f32,
    pub diffuse_texture: Option<TextureSlot>,
    pub specular_glossiness_texture: Option<TextureSlot>,
    pub base: ElementBase,
}

impl SpecularGlossinessExt {
    pub const NAME: &'static str = "KHR_materials_pbrSpecularGlossiness";
}

impl Default for SpecularGlossinessExt {
    fn default() -> Self {
        Self {
            diffuse_factor: [1.0; 4],
            specular_factor: [1.0; 3],
            glossiness_factor: 1.0,
            diffuse_texture: None,
            specular_glossiness_texture: None,
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for SpecularGlossinessExt {
    const KIND: &'static str = "KHR_materials_pbrSpecularGlossiness";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "diffuseFactor" => {
                let parsed = json::as_f32_array::<4>(value);
                cx.store(name, value, parsed, &mut self.diffuse_factor);
            }
            "specularFactor" => {
                let parsed = json::as_f32_array::<3>(value);
                cx.store(name, value, parsed, &mut self.specular_factor);
            }
            "glossinessFactor" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.glossiness_factor);
            }
            "diffuseTexture" => {
                self.diffuse_texture = Some(parse_texture_slot(name, value, cx));
            }
            "specularGlossinessTexture" => {
                self.specular_glossiness_texture = Some(parse_texture_slot(name, value, cx));
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// `KHR_materials_emissive_strength` parameters.
#[derive(Debug, Clone)]
pub struct EmissiveStrengthExt {
    pub emissive_strength: f32,
    pub base: ElementBase,
}

impl EmissiveStrengthExt {
    pub const NAME: &'static str = "KHR_materials_emissive_strength";
}

impl Default for EmissiveStrengthExt {
    fn default() -> Self {
        Self { emissive_strength: 1.0, base: ElementBase::default() }
    }
}

impl PropertySink for EmissiveStrengthExt {
    const KIND: &'static str = "KHR_materials_emissive_strength";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "emissiveStrength" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.emissive_strength);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// `EXT_mesh_gpu_instancing`: per-instance attribute streams on a node.
#[derive(Debug, Clone, Default)]
pub struct InstancingExt {
    /// Instance-rate attribute semantics mapped to accessor indices.
    pub attributes: Vec<(Semantic, ElementId)>,
    pub base: ElementBase,
}

impl InstancingExt {
    pub const NAME: &'static str = "EXT_mesh_gpu_instancing";
}

impl PropertySink for InstancingExt {
    const KIND: &'static str = "EXT_mesh_gpu_instancing";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "attributes" => match value.as_object() {
                Some(map) => {
                    for (semantic, index) in map {
                        match json::as_id(index) {
                            Some(id) => self.attributes.push((Semantic::parse(semantic), id)),
                            None => cx.type_mismatch(semantic, index),
                        }
                    }
                }
                None => cx.type_mismatch(name, value),
            },
            _ => cx.unknown_property(name),
        }
    }
}

/// Parser function signature for one extension name.
pub type ExtensionParser = fn(name: &str, value: &Value, cx: &mut ParseCx) -> Extension;

/// Name-keyed table of extension parsers.
///
/// The default registry knows the extensions this crate gives first-class
/// treatment; applications can register additional parsers before loading.
pub struct ExtensionRegistry {
    parsers: HashMap<String, ExtensionParser>,
}

impl ExtensionRegistry {
    /// Registry with no parsers at all; everything is captured generically.
    pub fn empty() -> Self {
        Self { parsers: HashMap::new() }
    }

    /// Register a parser for an extension name.
    pub fn register(&mut self, name: impl Into<String>, parser: ExtensionParser) {
        self.parsers.insert(name.into(), parser);
    }

    /// True if a parser is registered for this name.
    pub fn knows(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// Parse one extension value, falling back to generic capture.
    pub fn parse(&self, name: &str, value: &Value, cx: &mut ParseCx) -> Extension {
        match self.parsers.get(name) {
            Some(parser) => parser(name, value, cx),
            None => Extension::Captured(CapturedExtension::capture(name, value)),
        }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SpecularExt::NAME, |_, v, cx| {
            let mut ext = SpecularExt::default();
            parse_into(&mut ext, v, cx);
            Extension::MaterialsSpecular(ext)
        });
        registry.register(IorExt::NAME, |_, v, cx| {
            let mut ext = IorExt::default();
            parse_into(&mut ext, v, cx);
            Extension::MaterialsIor(ext)
        });
        registry.register("KHR_materials_unlit", |_, _, _| Extension::MaterialsUnlit);
        registry.register(SpecularGlossinessExt::NAME, |_, v, cx| {
            let mut ext = SpecularGlossinessExt::default();
            parse_into(&mut ext, v, cx);
            Extension::MaterialsSpecularGlossiness(ext)
        });
        registry.register(EmissiveStrengthExt::NAME, |_, v, cx| {
            let mut ext = EmissiveStrengthExt::default();
            parse_into(&mut ext, v, cx);
            Extension::MaterialsEmissiveStrength(ext)
        });
        registry.register(InstancingExt::NAME, |_, v, cx| {
            let mut ext = InstancingExt::default();
            parse_into(&mut ext, v, cx);
            Extension::MeshGpuInstancing(ext)
        });
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Diagnostics;
    use serde_json::json;

    fn cx_parse(registry: &ExtensionRegistry, name: &str, value: &Value) -> (Extension, Diagnostics) {
        let mut diags = Diagnostics::new();
        let mut cx = ParseCx::new(registry, &mut diags);
        let ext = registry.parse(name, value, &mut cx);
        (ext, diags)
    }

    #[test]
    fn test_known_extension_parses_typed() {
        let registry = ExtensionRegistry::default();
        let (ext, diags) = cx_parse(&registry, IorExt::NAME, &json!({ "ior": 1.33 }));
        assert!(diags.is_empty());
        match ext {
            Extension::MaterialsIor(ior) => assert_eq!(ior.ior, 1.33),
            other => panic!("unexpected variant {:?}", other.name()),
        }
    }

    #[test]
    fn test_unknown_extension_captured() {
        let registry = ExtensionRegistry::default();
        let value = json!({ "vendorField": 42, "other": "x" });
        let (ext, diags) = cx_parse(&registry, "ACME_custom_thing", &value);
        assert!(diags.is_empty());
        match ext {
            Extension::Captured(c) => {
                assert_eq!(c.name, "ACME_custom_thing");
                assert_eq!(c.get("vendorField"), Some(&json!(42)));
                assert_eq!(c.entries.len(), 2);
            }
            other => panic!("unexpected variant {:?}", other.name()),
        }
    }

    #[test]
    fn test_registered_parser_overrides_capture() {
        let mut registry = ExtensionRegistry::empty();
        assert!(!registry.knows(IorExt::NAME));
        registry.register(IorExt::NAME, |_, v, cx| {
            let mut ext = IorExt::default();
            parse_into(&mut ext, v, cx);
            Extension::MaterialsIor(ext)
        });
        assert!(registry.knows(IorExt::NAME));
    }
}
