//! Utility types and functions for gltfkit.
//!
//! This module contains fundamental pieces used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`base64`] - Inline payload codec for data URIs
//! - [`data_uri`] - `data:` URI splitting
//! - [`mime`] - mime-type to decoder-hint mapping

mod error;

pub mod base64;
pub mod data_uri;
pub mod mime;

pub use data_uri::DataUri;
pub use error::*;
