pub mod obj_loader;
pub mod ply_loader;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SceneError};

/// One triangle corner: indices into the tessellation's attribute arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceCorner {
    pub position: u32,
    pub normal: Option<u32>,
    pub texcoord: Option<u32>,
}

impl FaceCorner {
    pub fn new(position: u32, normal: Option<u32>, texcoord: Option<u32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }

    /// Corner with only a position; normal and uv share the position index
    /// when the source stores per-vertex attributes.
    pub fn per_vertex(index: u32, has_normals: bool, has_texcoords: bool) -> Self {
        Self {
            position: index,
            normal: has_normals.then_some(index),
            texcoord: has_texcoords.then_some(index),
        }
    }
}

/// Raw output of a mesh importer, before welding.
///
/// Attribute arrays are flat (`xyz` / `uv` runs). `faces` is a triangle list
/// of corners; every three consecutive corners form one triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tessellation {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub faces: Vec<FaceCorner>,
}

impl Tessellation {
    pub fn position_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len() / 3
    }

    pub fn texcoord_count(&self) -> usize {
        self.texcoords.len() / 2
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.faces.is_empty()
    }

    /// Check that the face list is a whole number of triangles and that
    /// every corner index lands inside its attribute array.
    pub fn validate(&self) -> Result<()> {
        if self.faces.len() % 3 != 0 {
            return Err(SceneError::Tessellation(format!(
                "Face list has {} corners, not a multiple of 3",
                self.faces.len()
            )));
        }

        let (positions, normals, texcoords) = (
            self.position_count(),
            self.normal_count(),
            self.texcoord_count(),
        );
        for (i, corner) in self.faces.iter().enumerate() {
            if corner.position as usize >= positions {
                return Err(out_of_range(i, "position", corner.position, positions));
            }
            if let Some(n) = corner.normal.filter(|&n| n as usize >= normals) {
                return Err(out_of_range(i, "normal", n, normals));
            }
            if let Some(t) = corner.texcoord.filter(|&t| t as usize >= texcoords) {
                return Err(out_of_range(i, "texcoord", t, texcoords));
            }
        }
        Ok(())
    }
}

fn out_of_range(corner: usize, attribute: &str, index: u32, len: usize) -> SceneError {
    SceneError::Tessellation(format!(
        "Corner {corner} {attribute} index {index} out of range ({len} available)"
    ))
}

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Ply,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Ok(MeshFormat::Obj),
            "ply" => Ok(MeshFormat::Ply),
            _ => Err(SceneError::Tessellation(format!(
                "Unsupported mesh format: .{ext}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeshFormat::Obj => "OBJ",
            MeshFormat::Ply => "PLY",
        }
    }
}

impl std::fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces the tessellation of a mesh file referenced by a shape.
pub trait MeshSource {
    fn tessellate(&self, file: &Path) -> Result<Tessellation>;
}

/// Reads mesh files from disk, relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileMeshSource {
    base_dir: PathBuf,
}

impl FileMeshSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.base_dir.join(file)
    }
}

impl MeshSource for FileMeshSource {
    fn tessellate(&self, file: &Path) -> Result<Tessellation> {
        let path = self.resolve(file);
        if !path.exists() {
            return Err(SceneError::Tessellation(format!(
                "Mesh file not found: {}",
                path.display()
            )));
        }

        let format = MeshFormat::from_path(&path)?;
        let tess = match format {
            MeshFormat::Obj => obj_loader::load_obj(&path)?,
            MeshFormat::Ply => ply_loader::load_ply(&path)?,
        };
        tess.validate()?;

        debug!(
            format = %format,
            path = %path.display(),
            positions = tess.position_count(),
            triangles = tess.triangle_count(),
            "Tessellated mesh"
        );
        Ok(tess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Tessellation {
        Tessellation {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0],
            texcoords: vec![],
            faces: vec![
                FaceCorner::new(0, Some(0), None),
                FaceCorner::new(1, Some(0), None),
                FaceCorner::new(2, Some(0), None),
            ],
        }
    }

    #[test]
    fn format_detection() {
        assert_eq!(
            MeshFormat::from_path(Path::new("bunny.obj")).unwrap(),
            MeshFormat::Obj
        );
        assert_eq!(
            MeshFormat::from_path(Path::new("meshes/Dragon.PLY")).unwrap(),
            MeshFormat::Ply
        );
        assert!(MeshFormat::from_path(Path::new("scene.fbx")).is_err());
        assert!(MeshFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn valid_tessellation() {
        let tess = triangle();
        assert!(tess.validate().is_ok());
        assert_eq!(tess.position_count(), 3);
        assert_eq!(tess.triangle_count(), 1);
        assert!(!tess.is_empty());
    }

    #[test]
    fn out_of_range_indices_rejected() {
        let mut tess = triangle();
        tess.faces[2].position = 3;
        let err = tess.validate().unwrap_err();
        assert!(err.to_string().contains("position index 3"));

        let mut tess = triangle();
        tess.faces[0].normal = Some(1);
        assert!(tess.validate().is_err());

        let mut tess = triangle();
        tess.faces[1].texcoord = Some(0);
        assert!(tess.validate().is_err());
    }

    #[test]
    fn partial_triangle_rejected() {
        let mut tess = triangle();
        tess.faces.pop();
        assert!(tess.validate().is_err());
    }

    #[test]
    fn per_vertex_corner() {
        let c = FaceCorner::per_vertex(7, true, false);
        assert_eq!(c, FaceCorner::new(7, Some(7), None));
    }

    #[test]
    fn missing_mesh_file() {
        let source = FileMeshSource::new("/nonexistent");
        let err = source.tessellate(Path::new("mesh.obj")).unwrap_err();
        assert!(matches!(err, SceneError::Tessellation(_)));
        assert!(err.to_string().contains("not found"));
    }
}
