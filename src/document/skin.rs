//! Skins: joint lists and inverse bind matrices.

use serde_json::Value;

use super::json;
use super::sink::{ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// A bone-style deformation rig.
#[derive(Debug, Clone)]
pub struct Skin {
    /// Accessor of MAT4 inverse bind matrices; absent means identity.
    pub inverse_bind_matrices: ElementId,
    /// Root node of the joint hierarchy, when declared.
    pub skeleton: ElementId,
    /// Node indices acting as joints, in bind order.
    pub joints: Vec<u32>,
    pub base: ElementBase,
}

impl Default for Skin {
    fn default() -> Self {
        Self {
            inverse_bind_matrices: ElementId::NONE,
            skeleton: ElementId::NONE,
            joints: Vec::new(),
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for Skin {
    const KIND: &'static str = "skins";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "inverseBindMatrices" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.inverse_bind_matrices);
            }
            "skeleton" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.skeleton);
            }
            "joints" => {
                let parsed = json::as_index_vec(value);
                cx.store(name, value, parsed, &mut self.joints);
            }
            _ => cx.unknown_property(name),
        }
    }
}
