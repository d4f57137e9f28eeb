//! Resolved materials, texture bindings and image payloads.
//!
//! Unlike the document elements these carry no indices back into the
//! source arrays; every reference has been checked and either bound or
//! dropped with a warning during the build.

use std::sync::Arc;

use crate::document::{AlphaMode, Sampler, WRAP_REPEAT};

/// Encoded image bytes plus the mime type a pixel decoder needs.
///
/// Decoding stays outside this crate; consumers pick a decoder from the
/// mime type (or sniff the payload) and upload the result themselves.
#[derive(Debug, Clone, Default)]
pub struct ImageData {
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Option<Arc<[u8]>>,
}

/// Sampling state for one texture binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerState {
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: u32,
    pub wrap_t: u32,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            mag_filter: None,
            min_filter: None,
            wrap_s: WRAP_REPEAT,
            wrap_t: WRAP_REPEAT,
        }
    }
}

impl From<&Sampler> for SamplerState {
    fn from(s: &Sampler) -> Self {
        Self {
            mag_filter: s.mag_filter,
            min_filter: s.min_filter,
            wrap_s: s.wrap_s,
            wrap_t: s.wrap_t,
        }
    }
}

/// One bound texture slot on a material.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// Index into [`crate::graph::SceneGraph::images`].
    pub image: usize,
    pub sampler: SamplerState,
    /// Which TEXCOORD_n stream to sample with.
    pub tex_coord: u32,
    /// Normal-map scale or occlusion strength, 1.0 elsewhere.
    pub scale: f32,
}

/// `KHR_materials_specular` parameters carried onto the output material.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecularParams {
    pub factor: f32,
    pub color_factor: [f32; 3],
    pub texture: Option<TextureBinding>,
    pub color_texture: Option<TextureBinding>,
}

/// Fully resolved PBR material.
#[derive(Debug, Clone)]
pub struct PbrMaterial {
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub base_color: Option<TextureBinding>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness: Option<TextureBinding>,
    pub normal: Option<TextureBinding>,
    pub occlusion: Option<TextureBinding>,
    pub emissive: Option<TextureBinding>,
    pub emissive_factor: [f32; 3],
    /// `KHR_materials_emissive_strength`, 1.0 when absent.
    pub emissive_strength: f32,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    /// `KHR_materials_unlit`: skip lighting entirely.
    pub unlit: bool,
    /// `KHR_materials_ior`, 1.5 when absent.
    pub ior: f32,
    pub specular: Option<SpecularParams>,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0; 4],
            base_color: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness: None,
            normal: None,
            occlusion: None,
            emissive: None,
            emissive_factor: [0.0; 3],
            emissive_strength: 1.0,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            unlit: false,
            ior: 1.5,
            specular: None,
        }
    }
}

impl PbrMaterial {
    /// The five fixed texture slots in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = &TextureBinding> {
        [
            self.base_color.as_ref(),
            self.metallic_roughness.as_ref(),
            self.normal.as_ref(),
            self.occlusion.as_ref(),
            self.emissive.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}
