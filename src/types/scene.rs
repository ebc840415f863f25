use std::collections::HashMap;
use std::path::PathBuf;

use glam::{Mat4, Vec3};
use serde::Serialize;

use super::material::{Material, MaterialTable, Rgb};

/// Which image axis the sensor's field of view spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FovAxis {
    #[default]
    X,
    Y,
}

/// Sensor description as declared in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    /// Camera-to-world transform; identity when the sensor has no transform.
    pub transform: Mat4,
    pub fov_degrees: f32,
    pub fov_axis: FovAxis,
    pub film_width: u32,
    pub film_height: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            fov_degrees: 45.0,
            fov_axis: FovAxis::X,
            film_width: 1280,
            film_height: 720,
        }
    }
}

impl Camera {
    pub fn aspect_ratio(&self) -> f32 {
        if self.film_height == 0 {
            return 1.0;
        }
        self.film_width as f32 / self.film_height as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    /// Externally tessellated mesh file (OBJ or PLY).
    Mesh,
    /// Builtin unit quad in the local XY plane.
    Rectangle,
}

/// A declared shape, before flattening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub kind: ShapeKind,
    /// Mesh file, relative to the scene directory.
    pub source_file: Option<PathBuf>,
    pub material_ref: Option<String>,
    pub transform: Mat4,
    pub is_emitter: bool,
    pub emission: Rgb,
    pub inline_material: Option<Material>,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            source_file: None,
            material_ref: None,
            transform: Mat4::IDENTITY,
            is_emitter: false,
            emission: Vec3::ZERO,
            inline_material: None,
        }
    }
}

/// Environment map declared by an `<emitter type="envmap">`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentMapInfo {
    pub filename: String,
    pub intensity: f32,
    pub present: bool,
}

impl Default for EnvironmentMapInfo {
    fn default() -> Self {
        Self {
            filename: String::new(),
            intensity: 1.0,
            present: false,
        }
    }
}

/// Decoded image in row-major RGBA32F.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTexture {
    pub pixels: Vec<f32>,
    pub width: u32,
    pub height: u32,
    /// Source was high dynamic range (HDR / EXR) and was kept linear as-is.
    pub is_hdr: bool,
    pub path: PathBuf,
}

impl DecodedTexture {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Non-empty and the pixel buffer matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.pixel_count() * 4
    }
}

/// Integrator / sampler hints carried through for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RenderSettings {
    pub max_depth: Option<u32>,
    pub samples_per_pixel: Option<u32>,
}

/// Everything read out of one scene file. Built once per load.
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    pub camera: Camera,
    pub materials: MaterialTable,
    /// Declaration order is rendering order.
    pub shapes: Vec<Shape>,
    pub environment: EnvironmentMapInfo,
    /// Radiance of a `<emitter type="constant">`, if declared.
    pub background: Option<Rgb>,
    pub settings: RenderSettings,
    /// Standalone `<texture type="bitmap">` definitions: id → filename.
    pub named_textures: HashMap<String, String>,
    /// Filled by the texture resolver; indexed by `TextureReference::resolved_index`.
    pub textures: Vec<DecodedTexture>,
    /// Directory that relative file references resolve against.
    pub scene_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_defaults() {
        let cam = Camera::default();
        assert_eq!(cam.transform, Mat4::IDENTITY);
        assert_eq!(cam.fov_degrees, 45.0);
        assert_eq!(cam.fov_axis, FovAxis::X);
        assert_eq!((cam.film_width, cam.film_height), (1280, 720));
        assert!((cam.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_film_has_unit_aspect() {
        let cam = Camera {
            film_height: 0,
            ..Default::default()
        };
        assert_eq!(cam.aspect_ratio(), 1.0);
    }

    #[test]
    fn shape_defaults() {
        let shape = Shape::new(ShapeKind::Rectangle);
        assert_eq!(shape.transform, Mat4::IDENTITY);
        assert!(!shape.is_emitter);
        assert_eq!(shape.emission, Vec3::ZERO);
        assert!(shape.material_ref.is_none());
        assert!(shape.inline_material.is_none());
    }

    #[test]
    fn decoded_texture_validity() {
        let tex = DecodedTexture {
            pixels: vec![0.0; 2 * 3 * 4],
            width: 2,
            height: 3,
            is_hdr: false,
            path: PathBuf::from("a.png"),
        };
        assert_eq!(tex.pixel_count(), 6);
        assert!(tex.is_valid());

        let truncated = DecodedTexture {
            pixels: vec![0.0; 5],
            ..tex
        };
        assert!(!truncated.is_valid());
    }
}
