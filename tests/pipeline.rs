//! End-to-end pipeline tests over in-memory and on-disk assets.

use std::sync::Arc;

use gltfkit::document::Semantic;
use gltfkit::glb::{CHUNK_BIN, CHUNK_JSON, GLB_MAGIC, GLB_VERSION};
use gltfkit::graph::{NodeKind, PrimitiveTopology};
use gltfkit::prelude::*;

/// Route library log output through the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
fn init_logging() {
    use tracing_subscriber::prelude::*;
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn build_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
    let mut json = json.to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut out = Vec::new();
    out.extend(GLB_MAGIC.to_le_bytes());
    out.extend(GLB_VERSION.to_le_bytes());
    out.extend(0u32.to_le_bytes());
    out.extend((json.len() as u32).to_le_bytes());
    out.extend(CHUNK_JSON.to_le_bytes());
    out.extend(&json);
    if let Some(bin) = bin {
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        out.extend((bin.len() as u32).to_le_bytes());
        out.extend(CHUNK_BIN.to_le_bytes());
        out.extend(&bin);
    }
    let total = out.len() as u32;
    out[8..12].copy_from_slice(&total.to_le_bytes());
    out
}

/// One triangle: positions at offset 0, u16 indices after them.
fn triangle_payload() -> (Vec<u8>, usize, usize) {
    let positions = f32_bytes(&[
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0,
    ]);
    let indices = u16_bytes(&[0, 1, 2]);
    let index_offset = positions.len();
    let mut bin = positions;
    bin.extend(&indices);
    let total = bin.len();
    (bin, index_offset, total)
}

fn triangle_json(index_offset: usize, total: usize) -> String {
    format!(
        r#"{{
            "asset": {{"version": "2.0"}},
            "buffers": [{{"byteLength": {total}}}],
            "bufferViews": [
                {{"buffer": 0, "byteOffset": 0, "byteLength": {index_offset}}},
                {{"buffer": 0, "byteOffset": {index_offset}, "byteLength": 6}}
            ],
            "accessors": [
                {{
                    "bufferView": 0, "componentType": 5126, "count": 3,
                    "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0]
                }},
                {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
            ],
            "meshes": [{{
                "primitives": [{{
                    "attributes": {{"POSITION": 0}},
                    "indices": 1,
                    "mode": 4
                }}]
            }}],
            "nodes": [{{"name": "tri", "mesh": 0}}],
            "scenes": [{{"nodes": [0]}}]
        }}"#
    )
}

#[test]
fn glb_triangle_end_to_end() {
    init_logging();
    let (bin, index_offset, total) = triangle_payload();
    let glb = build_glb(triangle_json(index_offset, total).as_bytes(), Some(&bin));

    let graph = load_slice(&glb, &LoadContext::default()).unwrap();
    assert_eq!(graph.num_drawables(), 1);

    let node = graph.node(graph.root().children[0]);
    assert_eq!(node.name.as_deref(), Some("tri"));
    let drawable = &node.drawables[0];
    assert_eq!(drawable.topology.primitive, PrimitiveTopology::TriangleList);
    assert_eq!(drawable.num_vertices(), 3);
    assert_eq!(
        drawable.indices.as_ref().unwrap().indices,
        vec![0, 1, 2]
    );
    let positions = drawable.stream(&Semantic::Position).unwrap();
    assert_eq!(positions.data.floats()[3..6], [1.0, 0.0, 0.0]);

    // Bounds from the accessor min/max gate the scene when culling is on.
    assert!(graph.root().cull.is_some() || graph.node(graph.root().children[0]).cull.is_some());
}

#[test]
fn culling_disabled_leaves_no_gate() {
    init_logging();
    let (bin, index_offset, total) = triangle_payload();
    let glb = build_glb(triangle_json(index_offset, total).as_bytes(), Some(&bin));
    let cx = LoadContext::new(LoadSettings {
        culling: false,
        ..Default::default()
    });
    let graph = load_slice(&glb, &cx).unwrap();
    assert!(graph.nodes.iter().all(|n| n.cull.is_none()));
}

#[test]
fn external_buffer_resolves_from_asset_dir() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (bin, index_offset, total) = triangle_payload();
    std::fs::write(dir.path().join("tri.bin"), &bin).unwrap();

    let json = triangle_json(index_offset, total)
        .replace("\"buffers\": [{", "\"buffers\": [{\"uri\": \"tri.bin\", ");
    let path = dir.path().join("tri.gltf");
    std::fs::write(&path, json).unwrap();

    let graph = load_path(&path, &LoadContext::default()).unwrap();
    assert_eq!(graph.num_drawables(), 1);
}

#[test]
fn shared_cache_survives_across_loads() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (bin, index_offset, total) = triangle_payload();
    std::fs::write(dir.path().join("tri.bin"), &bin).unwrap();
    let json = triangle_json(index_offset, total)
        .replace("\"buffers\": [{", "\"buffers\": [{\"uri\": \"tri.bin\", ");
    let path = dir.path().join("tri.gltf");
    std::fs::write(&path, json).unwrap();

    let cx = LoadContext::default();
    load_path(&path, &cx).unwrap();
    load_path(&path, &cx).unwrap();
    assert_eq!(cx.cache.len(), 1);
}

#[test]
fn parallel_resolution_matches_serial() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (bin, index_offset, total) = triangle_payload();
    std::fs::write(dir.path().join("tri.bin"), &bin).unwrap();
    let json = triangle_json(index_offset, total)
        .replace("\"buffers\": [{", "\"buffers\": [{\"uri\": \"tri.bin\", ");
    let path = dir.path().join("tri.gltf");
    std::fs::write(&path, json).unwrap();

    let pool = Arc::new(
        rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap(),
    );
    let cx = LoadContext::default().with_pool(pool);
    let pooled = load_path(&path, &cx).unwrap();
    let serial = load_path(&path, &LoadContext::default()).unwrap();
    assert_eq!(pooled.num_drawables(), serial.num_drawables());
    assert_eq!(pooled.nodes.len(), serial.nodes.len());
}

#[test]
fn multi_scene_glb_selects_default() {
    init_logging();
    let json = br#"{
        "asset": {"version": "2.0"},
        "nodes": [{"name": "a"}, {"name": "b"}],
        "scenes": [{"nodes": [0]}, {"nodes": [1]}],
        "scene": 1
    }"#;
    let glb = build_glb(json, None);
    let graph = load_slice(&glb, &LoadContext::default()).unwrap();
    let NodeKind::Switch { active } = graph.root().kind else {
        panic!("expected a scene selector");
    };
    assert_eq!(active, 1);
}

#[test]
fn strict_parse_rejects_unknown_fields_in_glb() {
    init_logging();
    let json = br#"{"asset": {"version": "2.0"}, "wat": true}"#;
    let glb = build_glb(json, None);
    assert!(matches!(
        load_slice(&glb, &LoadContext::default()),
        Err(Error::ParseFailed { .. })
    ));
}
