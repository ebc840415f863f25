use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

/// One welded output vertex, already in world space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// One placed shape: where its geometry starts in the global buffers, which
/// material it uses, and its emission.
///
/// Only starting offsets are stored. The extent of instance `i` runs up to the
/// start of instance `i + 1` (or the end of the buffer for the last one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Instance {
    pub vertex_offset: u32,
    pub index_offset: u32,
    pub material_index: u32,
    pub is_emitter: bool,
    pub emission: Vec3,
}

/// GPU-side instance record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuInstance {
    pub vertex_offset: u32,
    pub index_offset: u32,
    pub material_index: u32,
    pub is_emitter: u32,
    pub emission: [f32; 3],
    pub _pad: f32,
}

impl From<&Instance> for GpuInstance {
    fn from(instance: &Instance) -> Self {
        Self {
            vertex_offset: instance.vertex_offset,
            index_offset: instance.index_offset,
            material_index: instance.material_index,
            is_emitter: u32::from(instance.is_emitter),
            emission: instance.emission.to_array(),
            _pad: 0.0,
        }
    }
}

/// The global vertex / index / instance buffers for a whole scene.
///
/// All buffers are flat `Vec`s with no internal pointers so they can be
/// uploaded with `bytemuck::cast_slice`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlattenedGeometry {
    pub vertices: Vec<Vertex>,
    /// Triangle list into `vertices` (absolute indices).
    pub indices: Vec<u32>,
    /// One per emitted shape, in declaration order.
    pub instances: Vec<Instance>,
}

impl FlattenedGeometry {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles (indices / 3).
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether no geometry has been appended.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Index-buffer range owned by instance `i`.
    pub fn index_range(&self, i: usize) -> Range<usize> {
        let start = self.instances[i].index_offset as usize;
        let end = self
            .instances
            .get(i + 1)
            .map_or(self.indices.len(), |next| next.index_offset as usize);
        start..end
    }

    /// Vertex-buffer range owned by instance `i`.
    pub fn vertex_range(&self, i: usize) -> Range<usize> {
        let start = self.instances[i].vertex_offset as usize;
        let end = self
            .instances
            .get(i + 1)
            .map_or(self.vertices.len(), |next| next.vertex_offset as usize);
        start..end
    }

    /// Instance array in the GPU layout.
    pub fn gpu_instances(&self) -> Vec<GpuInstance> {
        self.instances.iter().map(GpuInstance::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(vertex_offset: u32, index_offset: u32) -> Instance {
        Instance {
            vertex_offset,
            index_offset,
            material_index: 0,
            is_emitter: false,
            emission: Vec3::ZERO,
        }
    }

    #[test]
    fn empty_geometry() {
        let geo = FlattenedGeometry::default();
        assert!(geo.is_empty());
        assert_eq!(geo.vertex_count(), 0);
        assert_eq!(geo.triangle_count(), 0);
        assert!(geo.gpu_instances().is_empty());
    }

    #[test]
    fn ranges_inferred_from_next_instance() {
        let geo = FlattenedGeometry {
            vertices: vec![Vertex::default(); 7],
            indices: vec![0, 1, 2, 0, 2, 3, 4, 5, 6],
            instances: vec![instance(0, 0), instance(4, 6)],
        };

        assert_eq!(geo.triangle_count(), 3);
        assert_eq!(geo.index_range(0), 0..6);
        assert_eq!(geo.index_range(1), 6..9);
        assert_eq!(geo.vertex_range(0), 0..4);
        assert_eq!(geo.vertex_range(1), 4..7);
    }

    #[test]
    fn gpu_layouts() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::size_of::<GpuInstance>(), 32);

        let mut inst = instance(10, 20);
        inst.is_emitter = true;
        inst.emission = Vec3::new(5.0, 4.0, 3.0);
        let gpu = GpuInstance::from(&inst);
        assert_eq!(gpu.is_emitter, 1);
        assert_eq!(gpu.emission, [5.0, 4.0, 3.0]);
        assert_eq!(gpu.index_offset, 20);

        let bytes: &[u8] = bytemuck::cast_slice(std::slice::from_ref(&gpu));
        assert_eq!(bytes.len(), 32);
    }
}
