//! Shape flattening: every shape's geometry is welded, world-transformed and
//! appended to one global vertex / index buffer, with one instance record
//! per shape.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ingestion::{FaceCorner, MeshSource, Tessellation};
use crate::types::{
    FlattenedGeometry, GpuMaterial, Instance, Material, MaterialTable, SceneDocument, Shape,
    ShapeKind, Vertex,
};

/// Normal used when a corner has none.
const DEFAULT_NORMAL: Vec3 = Vec3::Y;

/// Unit quad in the local XY plane, facing +Z.
const RECTANGLE_CORNERS: [([f32; 3], [f32; 2]); 4] = [
    ([-1.0, -1.0, 0.0], [0.0, 0.0]),
    ([1.0, -1.0, 0.0], [1.0, 0.0]),
    ([1.0, 1.0, 0.0], [1.0, 1.0]),
    ([-1.0, 1.0, 0.0], [0.0, 1.0]),
];
const RECTANGLE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Renderer-ready output: geometry plus the dense material array its
/// instances index into.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlattenedScene {
    pub geometry: FlattenedGeometry,
    pub materials: Vec<Material>,
}

impl FlattenedScene {
    /// Material array in the GPU layout.
    pub fn gpu_materials(&self) -> Vec<GpuMaterial> {
        self.materials.iter().map(GpuMaterial::from).collect()
    }
}

/// Accumulates shapes into a [`FlattenedScene`].
///
/// The dense material array starts as a copy of the document's table, so
/// table slots and material indices agree. Inline materials and the default
/// material are appended behind them as shapes need them.
pub struct Flattener<'a> {
    table: &'a MaterialTable,
    geometry: FlattenedGeometry,
    materials: Vec<Material>,
    fallback_index: Option<u32>,
}

impl<'a> Flattener<'a> {
    pub fn new(table: &'a MaterialTable) -> Self {
        Self {
            table,
            geometry: FlattenedGeometry::default(),
            materials: table.as_slice().to_vec(),
            fallback_index: None,
        }
    }

    /// Flatten one shape, tessellating mesh files through `source`.
    ///
    /// A mesh that fails to load is skipped with a warning. Returns the new
    /// instance index, if the shape produced one.
    pub fn flatten_shape(&mut self, shape: &Shape, source: &dyn MeshSource) -> Option<u32> {
        match shape.kind {
            ShapeKind::Rectangle => Some(self.flatten_rectangle(shape)),
            ShapeKind::Mesh => {
                let Some(file) = shape.source_file.as_deref() else {
                    warn!("Mesh shape without a filename, skipping");
                    return None;
                };
                let result = source
                    .tessellate(file)
                    .and_then(|tess| self.flatten_mesh(shape, &tess));
                match result {
                    Ok(instance) => instance,
                    Err(e) => {
                        warn!(file = %file.display(), "Skipping shape: {e}");
                        None
                    }
                }
            }
        }
    }

    /// Weld and append a mesh tessellation.
    ///
    /// Corners sharing the same `(position, normal, texcoord)` index triple
    /// become one output vertex. Welding is local to this call, so distinct
    /// shapes never share vertices. An empty tessellation adds nothing.
    pub fn flatten_mesh(&mut self, shape: &Shape, tess: &Tessellation) -> Result<Option<u32>> {
        tess.validate()?;
        if tess.is_empty() {
            warn!("Mesh produced no geometry, skipping");
            return Ok(None);
        }

        let vertex_offset = self.geometry.vertices.len() as u32;
        let index_offset = self.geometry.indices.len() as u32;
        let mut welded: HashMap<FaceCorner, u32> = HashMap::with_capacity(tess.faces.len());

        for corner in &tess.faces {
            let index = match welded.get(corner) {
                Some(&index) => index,
                None => {
                    let index = self.geometry.vertices.len() as u32;
                    let vertex = corner_vertex(tess, corner, &shape.transform);
                    self.geometry.vertices.push(vertex);
                    welded.insert(*corner, index);
                    index
                }
            };
            self.geometry.indices.push(index);
        }

        debug!(
            corners = tess.faces.len(),
            vertices = welded.len(),
            "Welded mesh"
        );
        Ok(Some(self.push_instance(shape, vertex_offset, index_offset)))
    }

    /// Append the builtin quad: always 4 vertices and 6 indices.
    pub fn flatten_rectangle(&mut self, shape: &Shape) -> u32 {
        let vertex_offset = self.geometry.vertices.len() as u32;
        let index_offset = self.geometry.indices.len() as u32;
        let normal = transform_normal(&shape.transform, Vec3::Z);

        self.geometry
            .vertices
            .extend(RECTANGLE_CORNERS.iter().map(|&(position, texcoord)| Vertex {
                position: shape
                    .transform
                    .transform_point3(Vec3::from(position))
                    .to_array(),
                normal: normal.to_array(),
                texcoord,
            }));
        self.geometry
            .indices
            .extend(RECTANGLE_INDICES.iter().map(|i| vertex_offset + i));

        self.push_instance(shape, vertex_offset, index_offset)
    }

    pub fn finish(self) -> FlattenedScene {
        FlattenedScene {
            geometry: self.geometry,
            materials: self.materials,
        }
    }

    fn push_instance(&mut self, shape: &Shape, vertex_offset: u32, index_offset: u32) -> u32 {
        let material_index = self.resolve_material(shape);
        let instance = self.geometry.instances.len() as u32;
        self.geometry.instances.push(Instance {
            vertex_offset,
            index_offset,
            material_index,
            is_emitter: shape.is_emitter,
            emission: shape.emission,
        });
        instance
    }

    /// Reference first, then inline material, then the default material.
    fn resolve_material(&mut self, shape: &Shape) -> u32 {
        if let Some(id) = &shape.material_ref {
            return match self.table.index_of(id) {
                Some(index) => index as u32,
                None => {
                    warn!(material = %id, "Unresolved material reference, using default");
                    self.fallback_index()
                }
            };
        }
        if let Some(inline) = &shape.inline_material {
            self.materials.push(inline.clone());
            return (self.materials.len() - 1) as u32;
        }
        self.fallback_index()
    }

    fn fallback_index(&mut self) -> u32 {
        if let Some(index) = self.fallback_index {
            return index;
        }
        self.materials.push(Material::fallback());
        let index = (self.materials.len() - 1) as u32;
        self.fallback_index = Some(index);
        index
    }
}

fn corner_vertex(tess: &Tessellation, corner: &FaceCorner, transform: &Mat4) -> Vertex {
    let p = corner.position as usize * 3;
    let position = Vec3::from_slice(&tess.positions[p..p + 3]);

    let normal = corner.normal.map_or(DEFAULT_NORMAL, |n| {
        let n = n as usize * 3;
        Vec3::from_slice(&tess.normals[n..n + 3])
    });

    let texcoord = corner.texcoord.map_or(Vec2::ZERO, |t| {
        let t = t as usize * 2;
        Vec2::from_slice(&tess.texcoords[t..t + 2])
    });

    Vertex {
        position: transform.transform_point3(position).to_array(),
        normal: transform_normal(transform, normal).to_array(),
        texcoord: texcoord.to_array(),
    }
}

/// Direction transform (w = 0), renormalized.
fn transform_normal(transform: &Mat4, normal: Vec3) -> Vec3 {
    transform
        .transform_vector3(normal)
        .normalize_or(DEFAULT_NORMAL)
}

/// Flatten every shape of a document, in declaration order.
pub fn flatten_scene(doc: &SceneDocument, source: &dyn MeshSource) -> FlattenedScene {
    let mut flattener = Flattener::new(&doc.materials);
    let mut skipped = 0usize;
    for shape in &doc.shapes {
        if flattener.flatten_shape(shape, source).is_none() {
            skipped += 1;
        }
    }
    let scene = flattener.finish();

    info!(
        instances = scene.geometry.instances.len(),
        vertices = scene.geometry.vertex_count(),
        triangles = scene.geometry.triangle_count(),
        materials = scene.materials.len(),
        skipped,
        "Flattened scene"
    );
    scene
}
