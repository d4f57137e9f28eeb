//! Load-time settings and the context threaded through a load.

use std::sync::Arc;

use glam::Mat4;

use crate::document::ExtensionRegistry;
use crate::resolve::{FsResourceIo, ResourceIo, SharedCache};

/// World up-axis convention of an asset or a target application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpAxis {
    /// Y points up (the interchange default).
    #[default]
    Y,
    /// Z points up (DCC packages like Blender or Max).
    Z,
}

/// Rotation that maps vectors from one up-axis convention to another.
///
/// None when the conventions already agree, so callers can skip the
/// extra transform node entirely.
pub fn convention_correction(source: UpAxis, target: UpAxis) -> Option<Mat4> {
    match (source, target) {
        (UpAxis::Y, UpAxis::Z) => Some(Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2)),
        (UpAxis::Z, UpAxis::Y) => Some(Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        _ => None,
    }
}

/// Tunables for a single load.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    /// Compute per-drawable bounding spheres for cull gating.
    pub culling: bool,
    /// Emit a summary report after the scene graph is built.
    pub verbose: bool,
    /// Hint that vertex data will be mutated and should not share storage.
    pub clone_accessors: bool,
    /// Up-axis convention the asset was authored in.
    pub source_up: UpAxis,
    /// Up-axis convention of the consuming application.
    pub target_up: UpAxis,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            culling: true,
            verbose: false,
            clone_accessors: false,
            source_up: UpAxis::Y,
            target_up: UpAxis::Y,
        }
    }
}

/// Everything one load needs: settings, extension parsers, resource IO,
/// an optional worker pool, and the payload cache.
///
/// Contexts are cheap to clone and independent; nothing here is process
/// global.
#[derive(Clone)]
pub struct LoadContext {
    pub settings: LoadSettings,
    pub registry: Arc<ExtensionRegistry>,
    pub io: Arc<dyn ResourceIo>,
    pub pool: Option<Arc<rayon::ThreadPool>>,
    pub cache: SharedCache,
}

impl Default for LoadContext {
    fn default() -> Self {
        Self {
            settings: LoadSettings::default(),
            registry: Arc::new(ExtensionRegistry::default()),
            io: Arc::new(FsResourceIo::default()),
            pool: None,
            cache: SharedCache::default(),
        }
    }
}

impl LoadContext {
    pub fn new(settings: LoadSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Replace the resource reader, e.g. to root lookups at the asset dir.
    pub fn with_io(mut self, io: Arc<dyn ResourceIo>) -> Self {
        self.io = io;
        self
    }

    /// Run resource resolution on the given pool instead of inline.
    pub fn with_pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Swap in a registry with custom extension parsers.
    pub fn with_registry(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

impl std::fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadContext")
            .field("settings", &self.settings)
            .field("pooled", &self.pool.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_no_correction_when_conventions_agree() {
        assert!(convention_correction(UpAxis::Y, UpAxis::Y).is_none());
        assert!(convention_correction(UpAxis::Z, UpAxis::Z).is_none());
    }

    #[test]
    fn test_y_up_to_z_up() {
        let m = convention_correction(UpAxis::Y, UpAxis::Z).unwrap();
        let up = m.transform_vector3(Vec3::Y);
        assert!(up.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_corrections_invert() {
        let fwd = convention_correction(UpAxis::Y, UpAxis::Z).unwrap();
        let back = convention_correction(UpAxis::Z, UpAxis::Y).unwrap();
        assert!((fwd * back).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }
}
