//! Document to scene-graph conversion.
//!
//! One pass per element array, in dependency order: accessors are
//! materialized first, then cameras, the joint palette, samplers, images,
//! textures, materials, meshes, nodes. Child links are wired in a second
//! pass over the nodes because children may be declared before they are
//! defined. Scenes come last, followed by root selection.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Mat4;
use tracing::{debug, warn};

use crate::config::{convention_correction, LoadSettings};
use crate::document::{
    Camera, Document, ElementId, Extension, Material, Primitive, Semantic, TextureSlot,
};
use crate::graph::drawable::{Drawable, IndexStream, MorphTarget, Topology, VertexStream};
use crate::graph::material::{ImageData, PbrMaterial, SamplerState, SpecularParams, TextureBinding};
use crate::graph::scene::{
    BoundingSphere, CameraParams, GraphNode, NodeId, NodeKind, SceneGraph,
};
use crate::graph::skin::{JointPalette, SkinBinding};
use crate::layout::{materialize, AccessorData};
use crate::util::mime;

/// Build the output graph from a parsed, resource-resolved document.
pub fn build(doc: &Document, settings: &LoadSettings) -> SceneGraph {
    Builder::new(doc, settings).run()
}

struct Builder<'a> {
    doc: &'a Document,
    settings: &'a LoadSettings,
    graph: SceneGraph,
    /// Materialized accessor per document index. None means no data.
    accessors: Vec<Option<Arc<AccessorData>>>,
    cameras: Vec<Option<CameraParams>>,
    samplers: Vec<SamplerState>,
    /// Texture index -> (image index, sampler state).
    textures: Vec<Option<(usize, SamplerState)>>,
    /// Drawable templates per mesh, cloned into each referencing node.
    meshes: Vec<Vec<Drawable>>,
    /// Document node index -> arena id, filled during the node pass.
    node_ids: Vec<NodeId>,
    /// Document node index -> palette slot for bone nodes.
    joint_slots: HashMap<u32, u32>,
}

impl<'a> Builder<'a> {
    fn new(doc: &'a Document, settings: &'a LoadSettings) -> Self {
        Self {
            doc,
            settings,
            graph: SceneGraph::default(),
            accessors: Vec::new(),
            cameras: Vec::new(),
            samplers: Vec::new(),
            textures: Vec::new(),
            meshes: Vec::new(),
            node_ids: Vec::new(),
            joint_slots: HashMap::new(),
        }
    }

    fn run(mut self) -> SceneGraph {
        self.materialize_accessors();
        self.convert_cameras();
        self.collect_joint_palette();
        self.convert_samplers();
        self.convert_images();
        self.convert_textures();
        self.convert_materials();
        self.convert_meshes();
        self.convert_nodes();
        self.bind_skins();
        self.link_children();
        self.convert_animations();
        let scene_ids = self.convert_scenes();
        self.graph.root = self.select_root(scene_ids);
        self.graph
    }

    /// A fresh placeholder node standing in for a broken reference.
    fn placeholder(&mut self, what: &str, index: usize) -> NodeId {
        warn!(target: "gltfkit::graph", "{what} index {index} is out of range, inserting placeholder");
        self.graph.push(GraphNode {
            kind: NodeKind::Placeholder,
            ..Default::default()
        })
    }

    fn node_for(&mut self, index: usize) -> NodeId {
        match self.node_ids.get(index) {
            Some(&id) => id,
            None => self.placeholder("node", index),
        }
    }

    /// Accessor data by document index. Honors the private-copy hint.
    fn accessor(&self, id: ElementId) -> Option<Arc<AccessorData>> {
        let index = id.index()?;
        let Some(slot) = self.accessors.get(index) else {
            warn!(target: "gltfkit::graph", "accessor index {index} is out of range");
            return None;
        };
        let data = slot.clone()?;
        if self.settings.clone_accessors {
            Some(Arc::new((*data).clone()))
        } else {
            Some(data)
        }
    }

    fn materialize_accessors(&mut self) {
        self.accessors = self
            .doc
            .accessors
            .iter()
            .map(|a| materialize(a, &self.doc.buffer_views, &self.doc.buffers).map(Arc::new))
            .collect();
    }

    fn convert_cameras(&mut self) {
        self.cameras = self.doc.cameras.iter().map(camera_params).collect();
    }

    /// Collect all skins' joints into one shared palette.
    ///
    /// Slot order is skin-declaration order; a node that appears in two
    /// skins keeps its first slot.
    fn collect_joint_palette(&mut self) {
        let mut palette = JointPalette::default();
        for (i, skin) in self.doc.skins.iter().enumerate() {
            let inverse = self
                .accessor(skin.inverse_bind_matrices)
                .map(|data| data.mat4s())
                .unwrap_or_default();
            if !inverse.is_empty() && inverse.len() != skin.joints.len() {
                warn!(
                    target: "gltfkit::graph",
                    "skin {i}: {} inverse bind matrices for {} joints",
                    inverse.len(),
                    skin.joints.len()
                );
            }
            for (j, &joint) in skin.joints.iter().enumerate() {
                let slot = palette.inverse_bind.len() as u32;
                self.joint_slots.entry(joint).or_insert(slot);
                palette
                    .inverse_bind
                    .push(inverse.get(j).copied().unwrap_or(Mat4::IDENTITY));
            }
        }
        self.graph.palette = palette;
    }

    fn convert_samplers(&mut self) {
        self.samplers = self.doc.samplers.iter().map(SamplerState::from).collect();
    }

    fn convert_images(&mut self) {
        self.graph.images = self
            .doc
            .images
            .iter()
            .map(|image| ImageData {
                name: image.base.name.clone(),
                mime_type: image.mime_type.clone().or_else(|| {
                    image
                        .uri
                        .as_deref()
                        .and_then(mime::mime_for_path)
                        .map(str::to_owned)
                }),
                bytes: image.data.clone(),
            })
            .collect();
    }

    fn convert_textures(&mut self) {
        self.textures = self
            .doc
            .textures
            .iter()
            .enumerate()
            .map(|(i, texture)| {
                let Some(image) = texture.source.index() else {
                    warn!(target: "gltfkit::graph", "texture {i} has no image source");
                    return None;
                };
                if image >= self.graph.images.len() {
                    warn!(target: "gltfkit::graph", "texture {i}: image index {image} is out of range");
                    return None;
                }
                let sampler = texture
                    .sampler
                    .index()
                    .and_then(|s| self.samplers.get(s).copied())
                    .unwrap_or_default();
                Some((image, sampler))
            })
            .collect();
    }

    /// Bind one of the five fixed texture slots.
    fn bind_slot(&self, slot: &TextureSlot) -> Option<TextureBinding> {
        let index = slot.texture.index()?;
        let Some(&entry) = self.textures.get(index) else {
            warn!(target: "gltfkit::graph", "texture index {index} is out of range");
            return None;
        };
        let (image, sampler) = entry?;
        Some(TextureBinding {
            image,
            sampler,
            tex_coord: slot.tex_coord,
            scale: slot.scale,
        })
    }

    fn convert_materials(&mut self) {
        self.graph.materials = self
            .doc
            .materials
            .iter()
            .map(|m| self.convert_material(m))
            .collect();
    }

    fn convert_material(&self, src: &Material) -> PbrMaterial {
        let mut out = PbrMaterial {
            name: src.base.name.clone(),
            base_color_factor: src.pbr.base_color_factor,
            base_color: src.pbr.base_color_texture.as_ref().and_then(|s| self.bind_slot(s)),
            metallic_factor: src.pbr.metallic_factor,
            roughness_factor: src.pbr.roughness_factor,
            metallic_roughness: src
                .pbr
                .metallic_roughness_texture
                .as_ref()
                .and_then(|s| self.bind_slot(s)),
            normal: src.normal_texture.as_ref().and_then(|s| self.bind_slot(s)),
            occlusion: src.occlusion_texture.as_ref().and_then(|s| self.bind_slot(s)),
            emissive: src.emissive_texture.as_ref().and_then(|s| self.bind_slot(s)),
            emissive_factor: src.emissive_factor,
            alpha_mode: src.alpha_mode,
            alpha_cutoff: src.alpha_cutoff,
            double_sided: src.double_sided,
            unlit: src.unlit(),
            ..Default::default()
        };
        if let Some(ior) = src.ior() {
            out.ior = ior.ior;
        }
        if let Some(strength) = src.emissive_strength() {
            out.emissive_strength = strength.emissive_strength;
        }
        if let Some(spec) = src.specular() {
            out.specular = Some(SpecularParams {
                factor: spec.specular_factor,
                color_factor: spec.specular_color_factor,
                texture: spec.specular_texture.as_ref().and_then(|s| self.bind_slot(s)),
                color_texture: spec
                    .specular_color_texture
                    .as_ref()
                    .and_then(|s| self.bind_slot(s)),
            });
        }
        // Legacy specular-glossiness assets: fold the diffuse channel into
        // the base color and approximate roughness as inverted glossiness.
        if let Some(sg) = src.specular_glossiness() {
            out.base_color_factor = sg.diffuse_factor;
            if let Some(binding) = sg.diffuse_texture.as_ref().and_then(|s| self.bind_slot(s)) {
                out.base_color = Some(binding);
            }
            out.metallic_factor = 0.0;
            out.roughness_factor = 1.0 - sg.glossiness_factor;
        }
        out
    }

    fn convert_meshes(&mut self) {
        self.meshes = self
            .doc
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .map(|p| self.convert_primitive(p, mesh.base.name.as_deref(), &mesh.weights))
                    .collect()
            })
            .collect();
    }

    fn convert_primitive(
        &self,
        primitive: &Primitive,
        mesh_name: Option<&str>,
        weights: &[f32],
    ) -> Drawable {
        let mut drawable = Drawable {
            name: mesh_name.map(str::to_owned),
            topology: Topology::from(primitive.mode),
            ..Default::default()
        };

        for (semantic, id) in &primitive.attributes {
            let Some(data) = self.accessor(*id) else {
                warn!(target: "gltfkit::graph", "primitive attribute {semantic:?} has no data");
                continue;
            };
            if *semantic == Semantic::Position {
                drawable.bounds = id
                    .get(&self.doc.accessors)
                    .and_then(|a| a.bounds_vec3())
                    .map(|(min, max)| BoundingSphere::from_aabb(min, max));
            }
            drawable
                .vertex_streams
                .push(VertexStream::vertex(semantic.clone(), data));
        }

        drawable.indices = self
            .accessor(primitive.indices)
            .and_then(|data| data.indices())
            .map(|indices| IndexStream { indices });

        drawable.material = primitive.material.index().and_then(|m| {
            if m < self.doc.materials.len() {
                Some(m)
            } else {
                warn!(target: "gltfkit::graph", "material index {m} is out of range");
                None
            }
        });

        for (t, target) in primitive.targets.iter().enumerate() {
            let streams: Vec<VertexStream> = target
                .iter()
                .filter_map(|(semantic, id)| {
                    self.accessor(*id)
                        .map(|data| VertexStream::vertex(semantic.clone(), data))
                })
                .collect();
            drawable.morph_targets.push(MorphTarget {
                streams,
                weight: weights.get(t).copied().unwrap_or(0.0),
            });
        }

        drawable
    }

    fn convert_nodes(&mut self) {
        let doc = self.doc;
        for (i, node) in doc.nodes.iter().enumerate() {
            let kind = if let Some(&slot) = self.joint_slots.get(&(i as u32)) {
                NodeKind::Joint {
                    palette_index: slot,
                }
            } else if let Some(camera) = node
                .camera
                .index()
                .and_then(|c| self.cameras.get(c).cloned().flatten())
            {
                NodeKind::Camera(camera)
            } else {
                NodeKind::Group
            };

            let mut drawables = node
                .mesh
                .index()
                .and_then(|m| self.meshes.get(m).cloned())
                .unwrap_or_default();
            if let Some(instancing) = node.base.find_extension(|e| match e {
                Extension::MeshGpuInstancing(ext) => Some(ext),
                _ => None,
            }) {
                self.fold_instancing(&mut drawables, &instancing.attributes);
            }
            // Per-node morph weights override the mesh defaults.
            if !node.weights.is_empty() {
                for drawable in &mut drawables {
                    for (t, target) in drawable.morph_targets.iter_mut().enumerate() {
                        if let Some(&w) = node.weights.get(t) {
                            target.weight = w;
                        }
                    }
                }
            }

            let skin = node.skin.index().and_then(|s| {
                if s < self.doc.skins.len() {
                    Some(s)
                } else {
                    warn!(target: "gltfkit::graph", "node {i}: skin index {s} is out of range");
                    None
                }
            });

            let id = self.graph.push(GraphNode {
                name: node.base.name.clone(),
                transform: node.local_transform(),
                kind,
                drawables,
                skin,
                children: Vec::new(),
                cull: None,
            });
            self.node_ids.push(id);
        }
    }

    /// Fold instance-rate attribute streams into the node's drawables.
    ///
    /// Instancing never duplicates subgraphs; every drawable of the mesh
    /// gains the same instance streams and count.
    fn fold_instancing(&self, drawables: &mut [Drawable], attributes: &[(Semantic, ElementId)]) {
        let mut streams = Vec::with_capacity(attributes.len());
        let mut count: Option<usize> = None;
        for (semantic, id) in attributes {
            let Some(data) = self.accessor(*id) else {
                warn!(target: "gltfkit::graph", "instance attribute {semantic:?} has no data");
                continue;
            };
            count = Some(count.map_or(data.count, |c| c.min(data.count)));
            streams.push(VertexStream::instance(semantic.clone(), data));
        }
        if streams.is_empty() {
            return;
        }
        debug!(target: "gltfkit::graph", "instancing: {} instances over {} streams", count.unwrap_or(0), streams.len());
        for drawable in drawables {
            drawable.vertex_streams.extend(streams.iter().cloned());
            drawable.instance_count = count;
        }
    }

    fn bind_skins(&mut self) {
        let doc = self.doc;
        let mut offset = 0u32;
        for skin in &doc.skins {
            let joints: Vec<NodeId> = skin
                .joints
                .iter()
                .map(|&j| self.node_for(j as usize))
                .collect();
            let num = joints.len() as u32;
            self.graph.skins.push(SkinBinding {
                name: skin.base.name.clone(),
                palette_offset: offset,
                joints,
            });
            offset += num;
        }
    }

    fn link_children(&mut self) {
        let doc = self.doc;
        for (i, node) in doc.nodes.iter().enumerate() {
            let children: Vec<NodeId> = node
                .children
                .iter()
                .map(|&c| self.node_for(c as usize))
                .collect();
            let id = self.node_ids[i];
            self.graph.node_mut(id).children = children;
        }
    }

    fn convert_animations(&mut self) {
        let doc = self.doc;
        for (i, animation) in doc.animations.iter().enumerate() {
            let mut clip = crate::graph::animation::AnimationClip {
                name: animation.base.name.clone(),
                channels: Vec::new(),
            };
            for channel in &animation.channels {
                let Some(sampler) = channel.sampler.get(&animation.samplers) else {
                    warn!(target: "gltfkit::graph", "animation {i}: sampler index is out of range");
                    continue;
                };
                let Some(node_index) = channel.target.node.index() else {
                    continue;
                };
                let Some(&target) = self.node_ids.get(node_index) else {
                    warn!(target: "gltfkit::graph", "animation {i}: target node {node_index} is out of range");
                    continue;
                };
                let Some(input) = self.accessor(sampler.input) else {
                    continue;
                };
                let Some(output) = self.accessor(sampler.output) else {
                    continue;
                };
                let times = input.floats();
                let values = output.floats();
                let components = if channel.target.path.is_transform() {
                    output.layout.num_components()
                } else if times.is_empty() {
                    0
                } else {
                    values.len() / times.len()
                };
                // Transform channels on bone nodes also feed the shared
                // joint palette.
                let joint = if channel.target.path.is_transform() {
                    self.joint_slots.get(&(node_index as u32)).copied()
                } else {
                    None
                };
                clip.channels.push(crate::graph::animation::ChannelBinding {
                    target,
                    joint,
                    path: channel.target.path,
                    interpolation: sampler.interpolation,
                    times,
                    values,
                    components,
                });
            }
            self.graph.animations.push(clip);
        }
    }

    fn convert_scenes(&mut self) -> Vec<NodeId> {
        let correction = convention_correction(self.settings.source_up, self.settings.target_up);
        let doc = self.doc;
        let mut scene_ids = Vec::with_capacity(doc.scenes.len());
        for scene in &doc.scenes {
            let roots: Vec<NodeId> = scene
                .nodes
                .iter()
                .map(|&n| self.node_for(n as usize))
                .collect();
            let mut node = GraphNode::group(scene.base.name.clone());
            match correction {
                // The correction transform is its own node so consumers can
                // tell authored transforms from the convention fix-up.
                Some(matrix) => {
                    let fixup = self.graph.push(GraphNode {
                        name: Some("axis_correction".into()),
                        transform: matrix,
                        children: roots,
                        ..Default::default()
                    });
                    node.children = vec![fixup];
                }
                None => node.children = roots,
            }
            let id = self.graph.push(node);
            if self.settings.culling {
                self.graph.node_mut(id).cull = self.subgraph_bounds(id);
            }
            scene_ids.push(id);
        }
        scene_ids
    }

    /// World-space bounding sphere over every drawable under a node.
    fn subgraph_bounds(&self, from: NodeId) -> Option<BoundingSphere> {
        let mut merged: Option<BoundingSphere> = None;
        self.graph.visit(from, |_, node, world| {
            for drawable in &node.drawables {
                if let Some(bounds) = drawable.bounds {
                    let sphere = transform_sphere(world, bounds);
                    merged = Some(match merged {
                        Some(m) => m.merge(sphere),
                        None => sphere,
                    });
                }
            }
        });
        merged
    }

    fn select_root(&mut self, scene_ids: Vec<NodeId>) -> NodeId {
        match scene_ids.len() {
            // No scenes: collect every node that is not someone's child.
            0 => {
                let mut is_child = vec![false; self.doc.nodes.len()];
                for node in &self.doc.nodes {
                    for &c in &node.children {
                        if let Some(flag) = is_child.get_mut(c as usize) {
                            *flag = true;
                        }
                    }
                }
                let roots: Vec<NodeId> = (0..self.doc.nodes.len())
                    .filter(|&i| !is_child[i])
                    .map(|i| self.node_ids[i])
                    .collect();
                self.graph.push(GraphNode {
                    children: roots,
                    ..Default::default()
                })
            }
            1 => scene_ids[0],
            n => {
                let active = self
                    .doc
                    .scene
                    .index()
                    .filter(|&s| s < n)
                    .unwrap_or(0);
                self.graph.push(GraphNode {
                    kind: NodeKind::Switch { active },
                    children: scene_ids,
                    ..Default::default()
                })
            }
        }
    }
}

fn camera_params(camera: &Camera) -> Option<CameraParams> {
    if camera.is_perspective() {
        let p = camera.perspective.as_ref()?;
        Some(CameraParams::Perspective {
            yfov: p.yfov,
            aspect_ratio: p.aspect_ratio,
            znear: p.znear,
            zfar: p.zfar,
        })
    } else {
        let o = camera.orthographic.as_ref()?;
        Some(CameraParams::Orthographic {
            xmag: o.xmag,
            ymag: o.ymag,
            znear: o.znear,
            zfar: o.zfar,
        })
    }
}

/// Conservative sphere transform: translate the center, scale the radius
/// by the largest axis scale of the matrix.
fn transform_sphere(m: Mat4, s: BoundingSphere) -> BoundingSphere {
    let scale = m
        .x_axis
        .truncate()
        .length()
        .max(m.y_axis.truncate().length())
        .max(m.z_axis.truncate().length());
    BoundingSphere {
        center: m.transform_point3(s.center),
        radius: s.radius * scale,
    }
}
