//! Drawable units: vertex/index streams produced from mesh primitives.

use std::sync::Arc;

use crate::document::{Semantic, TopologyMode};
use crate::graph::scene::BoundingSphere;
use crate::layout::AccessorData;

/// Primitive assembly type for the rasterizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

/// Assembly type plus the one quirk the table cannot express: line loops
/// become line strips that still need their closing segment appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Topology {
    pub primitive: PrimitiveTopology,
    pub needs_closing_segment: bool,
}

impl From<TopologyMode> for Topology {
    fn from(mode: TopologyMode) -> Self {
        let primitive = match mode {
            TopologyMode::Points => PrimitiveTopology::PointList,
            TopologyMode::Lines => PrimitiveTopology::LineList,
            TopologyMode::LineLoop | TopologyMode::LineStrip => PrimitiveTopology::LineStrip,
            TopologyMode::Triangles => PrimitiveTopology::TriangleList,
            TopologyMode::TriangleStrip => PrimitiveTopology::TriangleStrip,
            TopologyMode::TriangleFan => PrimitiveTopology::TriangleFan,
        };
        Self {
            primitive,
            needs_closing_segment: mode.needs_closing_segment(),
        }
    }
}

/// Whether a stream advances per vertex or per instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamRate {
    #[default]
    Vertex,
    Instance,
}

/// One attribute stream feeding a drawable.
#[derive(Debug, Clone)]
pub struct VertexStream {
    pub semantic: Semantic,
    pub rate: StreamRate,
    /// Materialized data, shared with other users of the same accessor
    /// unless the load requested private copies.
    pub data: Arc<AccessorData>,
}

impl VertexStream {
    pub fn vertex(semantic: Semantic, data: Arc<AccessorData>) -> Self {
        Self {
            semantic,
            rate: StreamRate::Vertex,
            data,
        }
    }

    pub fn instance(semantic: Semantic, data: Arc<AccessorData>) -> Self {
        Self {
            semantic,
            rate: StreamRate::Instance,
            data,
        }
    }
}

/// Index stream, widened to u32 regardless of storage width.
#[derive(Debug, Clone, Default)]
pub struct IndexStream {
    pub indices: Vec<u32>,
}

/// One morph target: sparse set of displacement streams plus its weight.
#[derive(Debug, Clone, Default)]
pub struct MorphTarget {
    pub streams: Vec<VertexStream>,
    pub weight: f32,
}

/// A single renderable unit: one primitive of one mesh, fully bound.
#[derive(Debug, Clone, Default)]
pub struct Drawable {
    pub name: Option<String>,
    pub topology: Topology,
    pub vertex_streams: Vec<VertexStream>,
    pub indices: Option<IndexStream>,
    /// Index into the graph's material table.
    pub material: Option<usize>,
    pub morph_targets: Vec<MorphTarget>,
    /// Set when instance-rate streams are attached.
    pub instance_count: Option<usize>,
    /// Object-space bounds from the position accessor, when declared.
    pub bounds: Option<BoundingSphere>,
}

impl Drawable {
    /// The stream bound to a semantic, if any.
    pub fn stream(&self, semantic: &Semantic) -> Option<&VertexStream> {
        self.vertex_streams.iter().find(|s| &s.semantic == semantic)
    }

    /// Vertex count from the position stream.
    pub fn num_vertices(&self) -> usize {
        self.stream(&Semantic::Position)
            .map_or(0, |s| s.data.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_table() {
        let expect = [
            (TopologyMode::Points, PrimitiveTopology::PointList, false),
            (TopologyMode::Lines, PrimitiveTopology::LineList, false),
            (TopologyMode::LineLoop, PrimitiveTopology::LineStrip, true),
            (TopologyMode::LineStrip, PrimitiveTopology::LineStrip, false),
            (TopologyMode::Triangles, PrimitiveTopology::TriangleList, false),
            (
                TopologyMode::TriangleStrip,
                PrimitiveTopology::TriangleStrip,
                false,
            ),
            (TopologyMode::TriangleFan, PrimitiveTopology::TriangleFan, false),
        ];
        for (mode, primitive, closing) in expect {
            let t = Topology::from(mode);
            assert_eq!(t.primitive, primitive, "{mode:?}");
            assert_eq!(t.needs_closing_segment, closing, "{mode:?}");
        }
    }
}
