//! Arena-based output scene graph.
//!
//! Nodes live in one flat vector and reference each other by [`NodeId`],
//! so the graph can be built before every link target exists and walked
//! without recursion hazards.

use glam::{Mat4, Vec3};

use crate::graph::animation::AnimationClip;
use crate::graph::drawable::Drawable;
use crate::graph::material::{ImageData, PbrMaterial};
use crate::graph::skin::{JointPalette, SkinBinding};

/// Index of a node in the graph arena.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sphere used to gate traversal of a subgraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Tightest sphere around an axis-aligned box.
    pub fn from_aabb(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        Self {
            center,
            radius: (max - center).length(),
        }
    }

    /// Smallest sphere containing both inputs' boxes, conservatively.
    pub fn merge(self, other: Self) -> Self {
        let min = (self.center - Vec3::splat(self.radius))
            .min(other.center - Vec3::splat(other.radius));
        let max = (self.center + Vec3::splat(self.radius))
            .max(other.center + Vec3::splat(other.radius));
        Self::from_aabb(min, max)
    }
}

/// What a graph node is, beyond its transform and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NodeKind {
    /// Plain grouping node.
    #[default]
    Group,
    /// Stand-in for an out-of-range reference; carries nothing.
    Placeholder,
    /// Bone node with its slot in the shared joint palette.
    Joint { palette_index: u32 },
    /// Camera node with projection parameters.
    Camera(CameraParams),
    /// Selector over its children; only the active branch is live.
    Switch { active: usize },
}

/// Projection parameters carried by a camera node.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraParams {
    Perspective {
        yfov: f32,
        aspect_ratio: Option<f32>,
        znear: f32,
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

/// One node of the output graph.
#[derive(Debug, Clone, Default)]
pub struct GraphNode {
    pub name: Option<String>,
    /// Local transform relative to the parent.
    pub transform: Mat4,
    pub kind: NodeKind,
    pub drawables: Vec<Drawable>,
    /// Index into [`SceneGraph::skins`] when this node drives a skinned mesh.
    pub skin: Option<usize>,
    pub children: Vec<NodeId>,
    /// Cull gate for this node's subgraph, when culling is enabled.
    pub cull: Option<BoundingSphere>,
}

impl GraphNode {
    pub fn group(name: Option<String>) -> Self {
        Self {
            name,
            transform: Mat4::IDENTITY,
            ..Default::default()
        }
    }
}

/// The complete build output: node arena plus the shared resources the
/// nodes index into.
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub nodes: Vec<GraphNode>,
    /// Entry point: a scene node, a scene selector, or an empty group.
    pub root: NodeId,
    pub materials: Vec<PbrMaterial>,
    pub images: Vec<ImageData>,
    pub skins: Vec<SkinBinding>,
    /// One palette shared by every skin in the document.
    pub palette: JointPalette,
    pub animations: Vec<AnimationClip>,
}

impl SceneGraph {
    #[inline]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        &mut self.nodes[id.index()]
    }

    pub fn push(&mut self, node: GraphNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn root(&self) -> &GraphNode {
        self.node(self.root)
    }

    /// Depth-first walk from a node, visiting each reachable node once
    /// with its accumulated world transform.
    ///
    /// A node referenced more than once (shared subgraph or a cyclic
    /// `children` link in the source document) is visited with the world
    /// transform of the first path that reaches it.
    pub fn visit(&self, from: NodeId, mut f: impl FnMut(NodeId, &GraphNode, Mat4)) {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![(from, Mat4::IDENTITY)];
        while let Some((id, parent)) = stack.pop() {
            let flag = &mut seen[id.index()];
            if *flag {
                continue;
            }
            *flag = true;
            let node = self.node(id);
            let world = parent * node.transform;
            f(id, node, world);
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Count of drawables reachable from the root.
    pub fn num_drawables(&self) -> usize {
        let mut n = 0;
        self.visit(self.root, |_, node, _| n += node.drawables.len());
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_visit_order() {
        let mut graph = SceneGraph::default();
        let leaf_a = graph.push(GraphNode::group(Some("a".into())));
        let leaf_b = graph.push(GraphNode::group(Some("b".into())));
        let mut root = GraphNode::group(Some("root".into()));
        root.transform = Mat4::from_translation(Vec3::X);
        root.children = vec![leaf_a, leaf_b];
        graph.root = graph.push(root);

        let mut names = Vec::new();
        graph.visit(graph.root, |_, node, world| {
            names.push(node.name.clone().unwrap());
            assert_eq!(world.w_axis.x, 1.0);
        });
        assert_eq!(names, vec!["root", "a", "b"]);
    }

    #[test]
    fn test_visit_terminates_on_cyclic_links() {
        let mut graph = SceneGraph::default();
        let a = graph.push(GraphNode::group(Some("a".into())));
        let b = graph.push(GraphNode::group(Some("b".into())));
        // a -> b -> a, and a also lists itself.
        graph.node_mut(a).children = vec![b, a];
        graph.node_mut(b).children = vec![a];
        graph.root = a;

        let mut visits = 0;
        graph.visit(graph.root, |_, _, _| visits += 1);
        assert_eq!(visits, 2);
        assert_eq!(graph.num_drawables(), 0);
    }

    #[test]
    fn test_sphere_merge_contains_both() {
        let a = BoundingSphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let b = BoundingSphere {
            center: Vec3::new(4.0, 0.0, 0.0),
            radius: 1.0,
        };
        let m = a.merge(b);
        assert!(m.center.distance(a.center) + a.radius <= m.radius + 1e-4);
        assert!(m.center.distance(b.center) + b.radius <= m.radius + 1e-4);
    }
}
