//! Materials and texture references.

use serde_json::Value;

use super::extensions::{
    EmissiveStrengthExt, Extension, IorExt, SpecularExt, SpecularGlossinessExt,
};
use super::json;
use super::sink::{parse_into, ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// A texture reference as it appears inside a material.
///
/// `scale` doubles as the normal-map scale and the occlusion strength; both
/// spellings are accepted where they apply.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    /// Index into the texture array.
    pub texture: ElementId,
    /// Which TEXCOORD_n set to sample with.
    pub tex_coord: u32,
    pub scale: f32,
    pub base: ElementBase,
}

impl Default for TextureSlot {
    fn default() -> Self {
        Self {
            texture: ElementId::NONE,
            tex_coord: 0,
            scale: 1.0,
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for TextureSlot {
    const KIND: &'static str = "texture";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "index" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.texture);
            }
            "texCoord" => {
                let parsed = json::as_u32(value);
                cx.store(name, value, parsed, &mut self.tex_coord);
            }
            "scale" | "strength" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.scale);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// Alpha interpretation for a material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OPAQUE" => Some(Self::Opaque),
            "MASK" => Some(Self::Mask),
            "BLEND" => Some(Self::Blend),
            _ => None,
        }
    }
}

/// The metallic-roughness parameter block.
#[derive(Debug, Clone)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureSlot>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureSlot>,
    pub base: ElementBase,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for PbrMetallicRoughness {
    const KIND: &'static str = "pbrMetallicRoughness";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "baseColorFactor" => {
                let parsed = json::as_f32_array::<4>(value);
                cx.store(name, value, parsed, &mut self.base_color_factor);
            }
            "baseColorTexture" => {
                self.base_color_texture = Some(parse_texture_slot(name, value, cx));
            }
            "metallicFactor" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.metallic_factor);
            }
            "roughnessFactor" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.roughness_factor);
            }
            "metallicRoughnessTexture" => {
                self.metallic_roughness_texture = Some(parse_texture_slot(name, value, cx));
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// A material: metallic-roughness factors plus up to five texture slots and
/// vendor extension parameter blocks.
#[derive(Debug, Clone)]
pub struct Material {
    pub pbr: PbrMetallicRoughness,
    pub normal_texture: Option<TextureSlot>,
    pub occlusion_texture: Option<TextureSlot>,
    pub emissive_texture: Option<TextureSlot>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub base: ElementBase,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            pbr: PbrMetallicRoughness::default(),
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            base: ElementBase::default(),
        }
    }
}

impl Material {
    /// `KHR_materials_specular` parameters, if present.
    pub fn specular(&self) -> Option<&SpecularExt> {
        self.base.find_extension(|e| match e {
            Extension::MaterialsSpecular(ext) => Some(ext),
            _ => None,
        })
    }

    /// `KHR_materials_ior` parameters, if present.
    pub fn ior(&self) -> Option<&IorExt> {
        self.base.find_extension(|e| match e {
            Extension::MaterialsIor(ext) => Some(ext),
            _ => None,
        })
    }

    /// True if `KHR_materials_unlit` is attached.
    pub fn unlit(&self) -> bool {
        self.base
            .extensions
            .iter()
            .any(|e| matches!(e, Extension::MaterialsUnlit))
    }

    /// `KHR_materials_pbrSpecularGlossiness` parameters, if present.
    pub fn specular_glossiness(&self) -> Option<&SpecularGlossinessExt> {
        self.base.find_extension(|e| match e {
            Extension::MaterialsSpecularGlossiness(ext) => Some(ext),
            _ => None,
        })
    }

    /// `KHR_materials_emissive_strength` parameters, if present.
    pub fn emissive_strength(&self) -> Option<&EmissiveStrengthExt> {
        self.base.find_extension(|e| match e {
            Extension::MaterialsEmissiveStrength(ext) => Some(ext),
            _ => None,
        })
    }
}

impl PropertySink for Material {
    const KIND: &'static str = "materials";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "pbrMetallicRoughness" => {
                cx.enter("pbrMetallicRoughness");
                parse_into(&mut self.pbr, value, cx);
                cx.leave();
            }
            "normalTexture" => {
                self.normal_texture = Some(parse_texture_slot(name, value, cx));
            }
            "occlusionTexture" => {
                self.occlusion_texture = Some(parse_texture_slot(name, value, cx));
            }
            "emissiveTexture" => {
                self.emissive_texture = Some(parse_texture_slot(name, value, cx));
            }
            "emissiveFactor" => {
                let parsed = json::as_f32_array::<3>(value);
                cx.store(name, value, parsed, &mut self.emissive_factor);
            }
            "alphaMode" => match value.as_str().and_then(AlphaMode::from_name) {
                Some(mode) => self.alpha_mode = mode,
                None => cx.invalid(format!("unknown alpha mode {value}")),
            },
            "alphaCutoff" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.alpha_cutoff);
            }
            "doubleSided" => {
                let parsed = json::as_bool(value);
                cx.store(name, value, parsed, &mut self.double_sided);
            }
            _ => cx.unknown_property(name),
        }
    }
}

pub(crate) fn parse_texture_slot(name: &str, value: &Value, cx: &mut ParseCx) -> TextureSlot {
    cx.enter(name);
    let mut slot = TextureSlot::default();
    parse_into(&mut slot, value, cx);
    cx.leave();
    slot
}
