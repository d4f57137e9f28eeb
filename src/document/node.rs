//! Nodes and scenes.

use glam::{Mat4, Quat, Vec3};
use serde_json::Value;

use super::json;
use super::sink::{ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// One element of the node hierarchy.
///
/// The transform is given either as an explicit 4x4 matrix or as
/// translation/rotation/scale components. The source document treats them
/// as mutually exclusive; if both appear, the matrix takes precedence.
#[derive(Debug, Clone)]
pub struct Node {
    pub camera: ElementId,
    pub skin: ElementId,
    pub mesh: ElementId,
    /// Child node indices; children may be declared before they are
    /// defined, so these stay raw until the graph linking pass.
    pub children: Vec<u32>,
    /// Explicit column-major matrix, when given.
    pub matrix: Option<Mat4>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Morph weights overriding the mesh defaults.
    pub weights: Vec<f32>,
    pub base: ElementBase,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            camera: ElementId::NONE,
            skin: ElementId::NONE,
            mesh: ElementId::NONE,
            children: Vec::new(),
            matrix: None,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            weights: Vec::new(),
            base: ElementBase::default(),
        }
    }
}

impl Node {
    /// Local transform: the explicit matrix if given, else
    /// translate * rotate * scale composed in that order.
    pub fn local_transform(&self) -> Mat4 {
        match self.matrix {
            Some(m) => m,
            None => Mat4::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.translation,
            ),
        }
    }
}

impl PropertySink for Node {
    const KIND: &'static str = "nodes";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "camera" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.camera);
            }
            "skin" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.skin);
            }
            "mesh" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.mesh);
            }
            "children" => {
                let parsed = json::as_index_vec(value);
                cx.store(name, value, parsed, &mut self.children);
            }
            "matrix" => match json::as_f32_array::<16>(value) {
                Some(m) => self.matrix = Some(Mat4::from_cols_array(&m)),
                None => cx.type_mismatch(name, value),
            },
            "translation" => match json::as_f32_array::<3>(value) {
                Some(t) => self.translation = Vec3::from_array(t),
                None => cx.type_mismatch(name, value),
            },
            "rotation" => match json::as_f32_array::<4>(value) {
                Some(r) => self.rotation = Quat::from_array(r),
                None => cx.type_mismatch(name, value),
            },
            "scale" => match json::as_f32_array::<3>(value) {
                Some(s) => self.scale = Vec3::from_array(s),
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

/// An ordered list of root node indices.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: Vec<u32>,
    pub base: ElementBase,
}

impl PropertySink for Scene {
    const KIND: &'static str = "scenes";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "nodes" => {
                let parsed = json::as_index_vec(value);
                cx.store(name, value, parsed, &mut self.nodes);
            }
            _ => cx.unknown_property(name),
        }
    }
}
