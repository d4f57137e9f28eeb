//! Materialization of accessors into packed byte vectors.
//!
//! The dense strided view is extracted first; a sparse overlay, when
//! present, is applied afterwards over the already-materialized data -
//! never the other way around.

use glam::Mat4;
use tracing::warn;

use crate::document::{Accessor, Buffer, BufferView, Sparse};
use crate::layout::{cast_vec, AccessorLayout, ComponentType};

/// One accessor's materialized data: packed elements, no stride.
#[derive(Debug, Clone)]
pub struct AccessorData {
    pub layout: AccessorLayout,
    pub count: usize,
    pub normalized: bool,
    /// Packed bytes, `count * layout.num_bytes()` long.
    pub data: Vec<u8>,
    pub min: Option<Vec<f32>>,
    pub max: Option<Vec<f32>>,
    pub name: Option<String>,
}

impl AccessorData {
    /// Total packed byte length.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Data as f32 components. Empty for non-float component types.
    pub fn floats(&self) -> Vec<f32> {
        match self.layout.component {
            ComponentType::Float32 => cast_vec(&self.data),
            ComponentType::Float64 => cast_vec::<f64>(&self.data)
                .into_iter()
                .map(|f| f as f32)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Scalar data widened to u32 indices. None for unsuitable layouts.
    pub fn indices(&self) -> Option<Vec<u32>> {
        if self.layout.num_components() != 1 {
            return None;
        }
        let out = match self.layout.component {
            ComponentType::Uint8 => self.data.iter().map(|&b| b as u32).collect(),
            ComponentType::Uint16 => cast_vec::<u16>(&self.data)
                .into_iter()
                .map(|v| v as u32)
                .collect(),
            ComponentType::Uint32 => cast_vec(&self.data),
            _ => return None,
        };
        Some(out)
    }

    /// Data as 4x4 matrices (inverse bind matrices). Empty unless MAT4/f32.
    pub fn mat4s(&self) -> Vec<Mat4> {
        if self.layout.num_components() != 16 || self.layout.component != ComponentType::Float32 {
            return Vec::new();
        }
        self.floats()
            .chunks_exact(16)
            .map(Mat4::from_cols_slice)
            .collect()
    }
}

/// Read one sparse index of the given component width.
fn read_index(bytes: &[u8], component: ComponentType, i: usize) -> Option<usize> {
    let w = component.num_bytes();
    let chunk = bytes.get(i * w..(i + 1) * w)?;
    let v = match component {
        ComponentType::Uint8 => chunk[0] as usize,
        ComponentType::Uint16 => u16::from_le_bytes([chunk[0], chunk[1]]) as usize,
        ComponentType::Uint32 => {
            u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize
        }
        _ => return None,
    };
    Some(v)
}

/// Materialize an accessor against its resolved buffers.
///
/// Returns None - "no data", not an error - when the accessor has neither
/// a buffer view nor a sparse overlay, or when the view's byte range falls
/// outside its buffer (a soft failure that is logged and skipped).
pub fn materialize(
    accessor: &Accessor,
    views: &[BufferView],
    buffers: &[Buffer],
) -> Option<AccessorData> {
    let layout = accessor.layout();
    let elem = layout.num_bytes();
    let label = accessor.base.name.as_deref().unwrap_or("accessor");

    let dense = match accessor.buffer_view.get(views) {
        Some(view) => {
            let bytes = view.slice(buffers)?;
            let stride = view.byte_stride.unwrap_or(elem);
            let mut data = vec![0u8; accessor.count * elem];
            for i in 0..accessor.count {
                let src = accessor.byte_offset + i * stride;
                let Some(chunk) = bytes.get(src..src + elem) else {
                    warn!(
                        target: "gltfkit::layout",
                        "{label}: element {i} of {} overruns its buffer view",
                        accessor.count
                    );
                    return None;
                };
                data[i * elem..(i + 1) * elem].copy_from_slice(chunk);
            }
            data
        }
        // No view: legal. Sparse-only accessors start from a zero base.
        None if accessor.sparse.is_some() => vec![0u8; accessor.count * elem],
        None => return None,
    };

    let mut out = AccessorData {
        layout,
        count: accessor.count,
        normalized: accessor.normalized,
        data: dense,
        min: accessor.min.clone(),
        max: accessor.max.clone(),
        name: accessor.base.name.clone(),
    };

    if let Some(sparse) = &accessor.sparse {
        apply_sparse(&mut out, sparse, views, buffers, label);
    }

    Some(out)
}

/// Overlay k sparse values onto already-materialized dense data.
fn apply_sparse(
    out: &mut AccessorData,
    sparse: &Sparse,
    views: &[BufferView],
    buffers: &[Buffer],
    label: &str,
) {
    let elem = out.layout.num_bytes();

    let Some(index_bytes) = sparse
        .indices
        .buffer_view
        .get(views)
        .and_then(|v| v.slice(buffers))
        .map(|s| &s[sparse.indices.byte_offset.min(s.len())..])
    else {
        warn!(target: "gltfkit::layout", "{label}: sparse index view unavailable");
        return;
    };
    let Some(value_bytes) = sparse
        .values
        .buffer_view
        .get(views)
        .and_then(|v| v.slice(buffers))
        .map(|s| &s[sparse.values.byte_offset.min(s.len())..])
    else {
        warn!(target: "gltfkit::layout", "{label}: sparse value view unavailable");
        return;
    };

    for j in 0..sparse.count {
        let Some(target) = read_index(index_bytes, sparse.indices.component_type, j) else {
            warn!(target: "gltfkit::layout", "{label}: sparse index {j} unreadable");
            return;
        };
        if target >= out.count {
            warn!(
                target: "gltfkit::layout",
                "{label}: sparse index {target} exceeds count {}",
                out.count
            );
            continue;
        }
        let Some(value) = value_bytes.get(j * elem..(j + 1) * elem) else {
            warn!(target: "gltfkit::layout", "{label}: sparse value {j} unreadable");
            return;
        };
        out.data[target * elem..(target + 1) * elem].copy_from_slice(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ElementId, SparseIndices, SparseValues};
    use crate::layout::ElementType;
    use std::sync::Arc;

    fn buffer_of(bytes: Vec<u8>) -> Buffer {
        Buffer {
            byte_length: bytes.len(),
            data: Some(Arc::from(bytes.as_slice())),
            ..Default::default()
        }
    }

    fn view_over(buffer: u32, offset: usize, length: usize, stride: Option<usize>) -> BufferView {
        BufferView {
            buffer: ElementId::new(buffer),
            byte_offset: offset,
            byte_length: length,
            byte_stride: stride,
            ..Default::default()
        }
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_packed_dense() {
        let buffers = vec![buffer_of(f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))];
        let views = vec![view_over(0, 0, 24, None)];
        let accessor = Accessor {
            buffer_view: ElementId::new(0),
            component_type: ComponentType::Float32,
            element_type: ElementType::Vec3,
            count: 2,
            ..Default::default()
        };
        let data = materialize(&accessor, &views, &buffers).unwrap();
        assert_eq!(data.byte_len(), 24);
        assert_eq!(data.floats(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_strided_dense() {
        // Two vec2 elements interleaved with 8 bytes of padding each.
        let mut bytes = Vec::new();
        bytes.extend(f32_bytes(&[1.0, 2.0, 99.0, 99.0]));
        bytes.extend(f32_bytes(&[3.0, 4.0, 99.0, 99.0]));
        let buffers = vec![buffer_of(bytes)];
        let views = vec![view_over(0, 0, 32, Some(16))];
        let accessor = Accessor {
            buffer_view: ElementId::new(0),
            component_type: ComponentType::Float32,
            element_type: ElementType::Vec2,
            count: 2,
            ..Default::default()
        };
        let data = materialize(&accessor, &views, &buffers).unwrap();
        assert_eq!(data.floats(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_no_view_is_no_data() {
        let accessor = Accessor {
            component_type: ComponentType::Float32,
            element_type: ElementType::Vec3,
            count: 4,
            ..Default::default()
        };
        assert!(materialize(&accessor, &[], &[]).is_none());
    }

    #[test]
    fn test_sparse_overlay() {
        // Dense: 5 scalars. Sparse: override elements 1 and 3.
        let dense = f32_bytes(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indices: Vec<u8> = [1u16, 3u16].iter().flat_map(|v| v.to_le_bytes()).collect();
        let values = f32_bytes(&[101.0, 103.0]);

        let mut blob = dense.clone();
        let idx_off = blob.len();
        blob.extend(&indices);
        let val_off = blob.len();
        blob.extend(&values);

        let buffers = vec![buffer_of(blob)];
        let views = vec![
            view_over(0, 0, dense.len(), None),
            view_over(0, idx_off, indices.len(), None),
            view_over(0, val_off, values.len(), None),
        ];
        let accessor = Accessor {
            buffer_view: ElementId::new(0),
            component_type: ComponentType::Float32,
            element_type: ElementType::Scalar,
            count: 5,
            sparse: Some(Sparse {
                count: 2,
                indices: SparseIndices {
                    buffer_view: ElementId::new(1),
                    component_type: ComponentType::Uint16,
                    ..Default::default()
                },
                values: SparseValues {
                    buffer_view: ElementId::new(2),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        let overlaid = materialize(&accessor, &views, &buffers).unwrap();
        let plain = {
            let mut acc = accessor.clone();
            acc.sparse = None;
            materialize(&acc, &views, &buffers).unwrap()
        };

        // Exactly k elements differ, each equal to the supplied value.
        let a = overlaid.floats();
        let b = plain.floats();
        let diffs: Vec<usize> = (0..5).filter(|&i| a[i] != b[i]).collect();
        assert_eq!(diffs, vec![1, 3]);
        assert_eq!(a[1], 101.0);
        assert_eq!(a[3], 103.0);
    }

    #[test]
    fn test_sparse_without_view_starts_from_zero() {
        let indices: Vec<u8> = vec![0];
        let values = f32_bytes(&[7.0]);
        let mut blob = indices.clone();
        let val_off = blob.len();
        blob.extend(&values);

        let buffers = vec![buffer_of(blob)];
        let views = vec![
            view_over(0, 0, 1, None),
            view_over(0, val_off, 4, None),
        ];
        let accessor = Accessor {
            component_type: ComponentType::Float32,
            element_type: ElementType::Scalar,
            count: 3,
            sparse: Some(Sparse {
                count: 1,
                indices: SparseIndices {
                    buffer_view: ElementId::new(0),
                    component_type: ComponentType::Uint8,
                    ..Default::default()
                },
                values: SparseValues {
                    buffer_view: ElementId::new(1),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        let data = materialize(&accessor, &[views[0].clone(), views[1].clone()], &buffers).unwrap();
        assert_eq!(data.floats(), vec![7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_index_widening() {
        let bytes: Vec<u8> = [5u16, 6, 7].iter().flat_map(|v| v.to_le_bytes()).collect();
        let buffers = vec![buffer_of(bytes)];
        let views = vec![view_over(0, 0, 6, None)];
        let accessor = Accessor {
            buffer_view: ElementId::new(0),
            component_type: ComponentType::Uint16,
            element_type: ElementType::Scalar,
            count: 3,
            ..Default::default()
        };
        let data = materialize(&accessor, &views, &buffers).unwrap();
        assert_eq!(data.indices(), Some(vec![5, 6, 7]));
    }
}
