//! Renderable scene-graph output.
//!
//! The [`build`] entry point converts a parsed, resource-resolved
//! [`Document`](crate::document::Document) into a [`SceneGraph`]: a flat
//! node arena with drawables, resolved materials, a shared joint palette
//! and animation clips, ready for a renderer to consume.

pub mod animation;
mod build;
pub mod drawable;
pub mod material;
mod scene;
pub mod skin;

pub use animation::{AnimationClip, ChannelBinding};
pub use build::build;
pub use drawable::{
    Drawable, IndexStream, MorphTarget, PrimitiveTopology, StreamRate, Topology, VertexStream,
};
pub use material::{ImageData, PbrMaterial, SamplerState, SpecularParams, TextureBinding};
pub use scene::{BoundingSphere, CameraParams, GraphNode, NodeId, NodeKind, SceneGraph};
pub use skin::{JointPalette, SkinBinding};
