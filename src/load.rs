//! The load pipeline: bytes in, scene graph out.
//!
//! `load_path` memory-maps the input; both entry points sniff the GLB
//! magic and fall back to plain JSON. Parse diagnostics are all-or-
//! nothing: any unknown property or type mismatch anywhere in the
//! document fails the whole load.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use tracing::info;

use crate::config::LoadContext;
use crate::document::Document;
use crate::glb::{self, Glb};
use crate::graph::{self, SceneGraph};
use crate::resolve::{resolve_resources, RootedIo};
use crate::util::{Error, Result};

/// Load an asset file (binary container or plain JSON).
///
/// The file's directory is appended to the resource search paths so
/// sibling buffer and image files resolve without configuration.
pub fn load_path(path: impl AsRef<Path>, cx: &LoadContext) -> Result<SceneGraph> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    // Safety: the mapping is read-only and dropped before return.
    let mmap = unsafe { Mmap::map(&file)? };

    match path.parent() {
        Some(dir) => {
            let rooted = RootedIo::new(dir, cx.io.clone());
            let cx = cx.clone().with_io(Arc::new(rooted));
            load_slice(&mmap, &cx)
        }
        None => load_slice(&mmap, cx),
    }
}

/// Load an asset already in memory.
pub fn load_slice(bytes: &[u8], cx: &LoadContext) -> Result<SceneGraph> {
    let mut doc = if glb::is_glb(bytes) {
        let glb = Glb::from_slice(bytes)?;
        let mut doc = parse_document(glb.json, cx)?;
        if let Some(bin) = glb.binary {
            glb::bind_binary_chunk(&mut doc, bin);
        }
        doc
    } else {
        parse_document(bytes, cx)?
    };

    let report = resolve_resources(
        &mut doc,
        cx.io.as_ref(),
        &cx.cache,
        cx.pool.as_deref(),
    );
    let graph = graph::build(&doc, &cx.settings);

    if cx.settings.verbose {
        info!(
            target: "gltfkit::load",
            "loaded {} ({} nodes, {} drawables, {} materials, {} clips; {} resources resolved, {} failed)",
            doc.asset.version,
            graph.nodes.len(),
            graph.num_drawables(),
            graph.materials.len(),
            graph.animations.len(),
            report.resolved,
            report.failed,
        );
    }
    Ok(graph)
}

/// Load from a JSON string, skipping the container sniff.
pub fn load_json_str(json: &str, cx: &LoadContext) -> Result<SceneGraph> {
    load_slice(json.as_bytes(), cx)
}

fn parse_document(json: &[u8], cx: &LoadContext) -> Result<Document> {
    let value: serde_json::Value = serde_json::from_slice(json)?;
    Document::parse(&value, &cx.registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_str() {
        let graph = load_json_str(
            r#"{
                "asset": {"version": "2.0"},
                "nodes": [{"name": "n"}],
                "scenes": [{"nodes": [0]}]
            }"#,
            &LoadContext::default(),
        )
        .unwrap();
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_unknown_property_fails_the_load() {
        let err = load_json_str(
            r#"{"asset": {"version": "2.0"}, "bogus": 1}"#,
            &LoadContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ParseFailed { count: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_path("/definitely/not/here.gltf", &LoadContext::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
