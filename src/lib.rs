//! # gltfkit
//!
//! Loader for glTF 2.0 assets: JSON and binary (.glb) containers are
//! parsed into a typed document, external and embedded resources are
//! resolved, and the result is converted into a renderable scene graph.
//!
//! ## Modules
//!
//! - [`util`] - Errors, base64, data uris, mime tables
//! - [`glb`] - Binary container splitting
//! - [`document`] - Typed document model and schema dispatch
//! - [`layout`] - Accessor layout tables and materialization
//! - [`resolve`] - Buffer/image resource resolution
//! - [`graph`] - Scene-graph construction
//! - [`config`] - Load settings and context
//! - [`load`] - The end-to-end pipeline
//!
//! ## Example
//!
//! ```ignore
//! use gltfkit::prelude::*;
//!
//! let graph = gltfkit::load_path("model.glb", &LoadContext::default())?;
//! println!("{} drawables", graph.num_drawables());
//! ```

pub mod config;
pub mod document;
pub mod glb;
pub mod graph;
pub mod layout;
pub mod load;
pub mod resolve;
pub mod util;

// Re-export the main entry points
pub use config::{LoadContext, LoadSettings, UpAxis};
pub use load::{load_json_str, load_path, load_slice};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{LoadContext, LoadSettings, UpAxis};
    pub use crate::document::{Document, ElementId};
    pub use crate::graph::{Drawable, GraphNode, NodeId, NodeKind, SceneGraph};
    pub use crate::load::{load_json_str, load_path, load_slice};
    pub use crate::util::{Error, Result};
}
