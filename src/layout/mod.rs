//! Accessor layout resolution.
//!
//! Maps glTF component-type codes and element shapes to byte layouts, and
//! materializes accessors into packed byte vectors:
//! - [`ComponentType`] / [`ElementType`] - the fixed size tables
//! - [`AccessorLayout`] - component + shape, total element size
//! - [`materialize`] - strided view extraction and sparse overlay

mod component;
mod materialize;

pub use component::*;
pub use materialize::*;

/// Safely cast a byte slice to a Vec of type T.
/// Falls back to an unaligned element-by-element copy, so it works on
/// packed accessor data regardless of source alignment.
pub fn cast_vec<T: bytemuck::Pod>(data: &[u8]) -> Vec<T> {
    if let Ok(slice) = bytemuck::try_cast_slice::<u8, T>(data) {
        return slice.to_vec();
    }
    let size = std::mem::size_of::<T>();
    data.chunks_exact(size)
        .map(|chunk| bytemuck::pod_read_unaligned(chunk))
        .collect()
}
