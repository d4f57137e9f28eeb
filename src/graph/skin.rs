//! Skinning output: one joint palette shared by every skin.
//!
//! All bone-bearing nodes across the document are collected into a single
//! palette sized to the total joint count, so a renderer uploads one
//! matrix buffer regardless of how many skins the document declares.

use glam::Mat4;

use crate::graph::scene::NodeId;

/// Flat palette of joints across all skins.
#[derive(Debug, Clone, Default)]
pub struct JointPalette {
    /// Inverse bind matrix per slot; identity when a skin declared none.
    pub inverse_bind: Vec<Mat4>,
}

impl JointPalette {
    /// Total joint count across every skin.
    #[inline]
    pub fn len(&self) -> usize {
        self.inverse_bind.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inverse_bind.is_empty()
    }
}

/// One skin's region of the shared palette.
#[derive(Debug, Clone, Default)]
pub struct SkinBinding {
    pub name: Option<String>,
    /// First palette slot belonging to this skin.
    pub palette_offset: u32,
    /// Bone nodes in palette order, offset by `palette_offset`.
    pub joints: Vec<NodeId>,
}

impl SkinBinding {
    #[inline]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// Palette slot of this skin's i-th joint.
    #[inline]
    pub fn palette_index(&self, i: usize) -> u32 {
        self.palette_offset + i as u32
    }
}
