//! External resource resolution.
//!
//! Buffers and images reference payloads by uri (file path or embedded
//! data uri) or through buffer views. Resolution runs in two phases:
//! everything uri-addressed first, then the view-backed images once the
//! buffers they slice are in memory. Phase one fans out over a rayon
//! pool when one is supplied.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::document::Document;
use crate::util::DataUri;

/// Source of bytes for uri-addressed resources.
///
/// Implementations must be shareable across resolver threads.
pub trait ResourceIo: Send + Sync {
    /// Fetch the full contents behind a (non-data) uri.
    fn read(&self, uri: &str) -> io::Result<Vec<u8>>;
}

/// Filesystem-backed resource reader with a list of search roots.
///
/// Each root is tried in order; the first path that exists wins. Relative
/// uris with no matching root fall through to the process working dir.
#[derive(Debug, Default, Clone)]
pub struct FsResourceIo {
    search_paths: Vec<PathBuf>,
}

impl FsResourceIo {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Reader rooted at a single directory, typically the asset's own.
    pub fn rooted(dir: impl AsRef<Path>) -> Self {
        Self {
            search_paths: vec![dir.as_ref().to_path_buf()],
        }
    }

    pub fn push_search_path(&mut self, dir: impl AsRef<Path>) {
        self.search_paths.push(dir.as_ref().to_path_buf());
    }
}

impl ResourceIo for FsResourceIo {
    fn read(&self, uri: &str) -> io::Result<Vec<u8>> {
        let relative = Path::new(uri);
        for root in &self.search_paths {
            let candidate = root.join(relative);
            if candidate.is_file() {
                return fs::read(candidate);
            }
        }
        fs::read(relative)
    }
}

/// Reader that tries a base directory before delegating.
///
/// `load_path` wraps the context's reader with the asset's own directory
/// so sibling files resolve without configuration, while custom readers
/// still see anything the directory does not hold.
pub struct RootedIo {
    base: PathBuf,
    inner: Arc<dyn ResourceIo>,
}

impl RootedIo {
    pub fn new(base: impl AsRef<Path>, inner: Arc<dyn ResourceIo>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            inner,
        }
    }
}

impl ResourceIo for RootedIo {
    fn read(&self, uri: &str) -> io::Result<Vec<u8>> {
        let candidate = self.base.join(uri);
        if candidate.is_file() {
            return fs::read(candidate);
        }
        self.inner.read(uri)
    }
}

/// Uri-keyed payload cache shared between loads.
///
/// Repeated references to the same external file (common for texture
/// atlases reused across assets) hit memory instead of the reader.
#[derive(Default, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl SharedCache {
    pub fn get(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.inner.lock().get(uri).cloned()
    }

    pub fn insert(&self, uri: &str, data: Arc<[u8]>) {
        self.inner.lock().insert(uri.to_owned(), data);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl fmt::Debug for SharedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache")
            .field("entries", &self.len())
            .finish()
    }
}

/// Outcome counts from one resolution run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveReport {
    /// Slots filled with payload bytes.
    pub resolved: usize,
    /// Slots left empty after a failed fetch or length mismatch.
    pub failed: usize,
}

/// One unresolved slot: the uri to fetch and the place the bytes go.
///
/// Each task owns a disjoint `&mut` into the document, so the batch can
/// run in parallel without locking the document itself.
struct Pending<'a> {
    label: String,
    uri: &'a str,
    declared_length: Option<usize>,
    slot: &'a mut Option<Arc<[u8]>>,
}

impl Pending<'_> {
    fn run(self, io: &dyn ResourceIo, cache: &SharedCache) -> bool {
        let Pending {
            label,
            uri,
            declared_length,
            slot,
        } = self;

        let data: Arc<[u8]> = if DataUri::matches(uri) {
            match DataUri::parse(uri).and_then(|d| d.decode()) {
                Ok(bytes) => Arc::from(bytes),
                Err(e) => {
                    warn!(target: "gltfkit::resolve", "{label}: embedded data rejected: {e}");
                    return false;
                }
            }
        } else if let Some(hit) = cache.get(uri) {
            debug!(target: "gltfkit::resolve", "{label}: cache hit for {uri}");
            hit
        } else {
            match io.read(uri) {
                Ok(bytes) => {
                    let data: Arc<[u8]> = Arc::from(bytes);
                    cache.insert(uri, data.clone());
                    data
                }
                Err(e) => {
                    warn!(target: "gltfkit::resolve", "{label}: cannot read {uri}: {e}");
                    return false;
                }
            }
        };

        let data = match declared_length {
            Some(declared) if data.len() < declared => {
                warn!(
                    target: "gltfkit::resolve",
                    "{label}: {uri} holds {} bytes, {declared} declared",
                    data.len()
                );
                return false;
            }
            // Views are sliced against the declared size, so trailing
            // bytes past it must not be addressable.
            Some(declared) if data.len() > declared => {
                debug!(
                    target: "gltfkit::resolve",
                    "{label}: {uri} holds {} bytes, trimmed to {declared} declared",
                    data.len()
                );
                Arc::from(&data[..declared])
            }
            _ => data,
        };

        *slot = Some(data);
        true
    }
}

/// Resolve every unloaded buffer and image in the document.
///
/// Failures never abort the batch; the affected slot stays empty and is
/// reported, leaving downstream consumers to degrade per element.
pub fn resolve_resources(
    doc: &mut Document,
    io: &dyn ResourceIo,
    cache: &SharedCache,
    pool: Option<&rayon::ThreadPool>,
) -> ResolveReport {
    let mut report = ResolveReport::default();

    // Phase one: everything addressed by uri.
    let mut tasks: Vec<Pending<'_>> = Vec::new();
    for (i, buffer) in doc.buffers.iter_mut().enumerate() {
        if buffer.data.is_some() {
            continue;
        }
        let Some(uri) = buffer.uri.as_deref() else {
            // A uri-less buffer with no data means a GLB chunk never arrived.
            warn!(target: "gltfkit::resolve", "buffer {i} has neither uri nor payload");
            report.failed += 1;
            continue;
        };
        tasks.push(Pending {
            label: format!("buffer {i}"),
            uri,
            declared_length: Some(buffer.byte_length),
            slot: &mut buffer.data,
        });
    }
    for (i, image) in doc.images.iter_mut().enumerate() {
        if image.data.is_some() || image.buffer_view.is_some() {
            continue;
        }
        let Some(uri) = image.uri.as_deref() else {
            warn!(target: "gltfkit::resolve", "image {i} has neither uri nor buffer view");
            report.failed += 1;
            continue;
        };
        tasks.push(Pending {
            label: format!("image {i}"),
            uri,
            declared_length: None,
            slot: &mut image.data,
        });
    }

    let outcomes: Vec<bool> = match pool {
        Some(pool) if tasks.len() > 1 => pool.install(|| {
            tasks
                .into_par_iter()
                .map(|task| task.run(io, cache))
                .collect()
        }),
        _ => tasks.into_iter().map(|task| task.run(io, cache)).collect(),
    };
    for ok in outcomes {
        if ok {
            report.resolved += 1;
        } else {
            report.failed += 1;
        }
    }

    // Phase two: images sliced out of now-loaded buffers.
    let Document {
        images,
        buffer_views,
        buffers,
        ..
    } = doc;
    for (i, image) in images.iter_mut().enumerate() {
        if image.data.is_some() {
            continue;
        }
        let Some(view) = image.buffer_view.get(buffer_views) else {
            continue;
        };
        match view.slice(buffers) {
            Some(bytes) => {
                image.data = Some(Arc::from(bytes));
                report.resolved += 1;
            }
            None => {
                warn!(target: "gltfkit::resolve", "image {i}: buffer view has no backing bytes");
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Buffer, BufferView, ElementId, Image};
    use crate::util::base64;

    #[test]
    fn test_data_uri_buffer() {
        let payload = [1u8, 2, 3, 4];
        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            uri: Some(format!(
                "data:application/octet-stream;base64,{}",
                base64::encode(&payload)
            )),
            byte_length: 4,
            ..Default::default()
        });
        let report =
            resolve_resources(&mut doc, &FsResourceIo::default(), &SharedCache::default(), None);
        assert_eq!(report, ResolveReport { resolved: 1, failed: 0 });
        assert_eq!(doc.buffers[0].bytes().unwrap(), &payload);
    }

    #[test]
    fn test_file_buffer_with_search_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mesh.bin"), [9u8; 16]).unwrap();

        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            uri: Some("mesh.bin".into()),
            byte_length: 16,
            ..Default::default()
        });
        let io = FsResourceIo::rooted(dir.path());
        let cache = SharedCache::default();
        let report = resolve_resources(&mut doc, &io, &cache, None);
        assert_eq!(report.resolved, 1);
        assert_eq!(doc.buffers[0].bytes().unwrap(), &[9u8; 16]);
        // Second load of the same uri comes from the cache.
        assert!(cache.get("mesh.bin").is_some());
    }

    #[test]
    fn test_missing_file_leaves_slot_empty() {
        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            uri: Some("no-such-file.bin".into()),
            byte_length: 8,
            ..Default::default()
        });
        let report =
            resolve_resources(&mut doc, &FsResourceIo::default(), &SharedCache::default(), None);
        assert_eq!(report, ResolveReport { resolved: 0, failed: 1 });
        assert!(doc.buffers[0].data.is_none());
    }

    #[test]
    fn test_short_payload_is_rejected() {
        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            uri: Some(format!(
                "data:application/octet-stream;base64,{}",
                base64::encode(&[1, 2])
            )),
            byte_length: 100,
            ..Default::default()
        });
        let report =
            resolve_resources(&mut doc, &FsResourceIo::default(), &SharedCache::default(), None);
        assert_eq!(report.failed, 1);
        assert!(doc.buffers[0].data.is_none());
    }

    #[test]
    fn test_long_payload_is_trimmed_to_declared_length() {
        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            uri: Some(format!(
                "data:application/octet-stream;base64,{}",
                base64::encode(&[1, 2, 3, 4, 5, 6])
            )),
            byte_length: 4,
            ..Default::default()
        });
        let report =
            resolve_resources(&mut doc, &FsResourceIo::default(), &SharedCache::default(), None);
        assert_eq!(report, ResolveReport { resolved: 1, failed: 0 });
        assert_eq!(doc.buffers[0].bytes().unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_view_backed_image_second_phase() {
        let png = [0x89u8, b'P', b'N', b'G', 0, 0, 0, 0];
        let mut doc = Document::default();
        doc.buffers.push(Buffer {
            uri: Some(format!(
                "data:application/octet-stream;base64,{}",
                base64::encode(&png)
            )),
            byte_length: png.len(),
            ..Default::default()
        });
        doc.buffer_views.push(BufferView {
            buffer: ElementId::new(0),
            byte_length: png.len(),
            ..Default::default()
        });
        doc.images.push(Image {
            buffer_view: ElementId::new(0),
            ..Default::default()
        });
        let report =
            resolve_resources(&mut doc, &FsResourceIo::default(), &SharedCache::default(), None);
        assert_eq!(report, ResolveReport { resolved: 2, failed: 0 });
        assert_eq!(doc.images[0].data.as_deref().unwrap(), &png);
    }
}
