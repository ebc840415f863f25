use std::collections::HashMap;
use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

use crate::material::presets::{AIR_IOR, BK7_IOR, POLYPROPYLENE_IOR};

/// Linear RGB triple.
pub type Rgb = Vec3;

/// Texture index meaning "no texture bound; use a neutral default".
pub const NO_TEXTURE: i32 = -1;

/// BSDF families understood by the renderer. Discriminants match the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum MaterialType {
    Diffuse = 0,
    Conductor = 1,
    RoughConductor = 2,
    Dielectric = 3,
    RoughDielectric = 4,
    Plastic = 5,
    RoughPlastic = 6,
    ThinDielectric = 7,
    Principled = 8,
    Blend = 9,
    Mask = 10,
    Null = 11,
}

impl MaterialType {
    /// Map a `<bsdf type="...">` plugin name to its material type.
    pub fn from_plugin_name(name: &str) -> Option<Self> {
        let ty = match name {
            "diffuse" => MaterialType::Diffuse,
            "conductor" => MaterialType::Conductor,
            "roughconductor" => MaterialType::RoughConductor,
            "dielectric" => MaterialType::Dielectric,
            "roughdielectric" => MaterialType::RoughDielectric,
            "plastic" => MaterialType::Plastic,
            "roughplastic" => MaterialType::RoughPlastic,
            "thindielectric" => MaterialType::ThinDielectric,
            "principled" => MaterialType::Principled,
            "blendbsdf" => MaterialType::Blend,
            "mask" => MaterialType::Mask,
            "null" => MaterialType::Null,
            _ => return None,
        };
        Some(ty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Diffuse => "Diffuse",
            MaterialType::Conductor => "Conductor",
            MaterialType::RoughConductor => "RoughConductor",
            MaterialType::Dielectric => "Dielectric",
            MaterialType::RoughDielectric => "RoughDielectric",
            MaterialType::Plastic => "Plastic",
            MaterialType::RoughPlastic => "RoughPlastic",
            MaterialType::ThinDielectric => "ThinDielectric",
            MaterialType::Principled => "Principled",
            MaterialType::Blend => "Blend",
            MaterialType::Mask => "Mask",
            MaterialType::Null => "Null",
        }
    }

    pub fn is_conductor(&self) -> bool {
        matches!(self, MaterialType::Conductor | MaterialType::RoughConductor)
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a texture slot gets its image from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TextureSource {
    /// Bitmap filename, relative to the scene directory.
    File(String),
    /// Id of a standalone `<texture type="bitmap">` definition.
    Named(String),
}

/// A material texture slot. `resolved_index` stays at [`NO_TEXTURE`] until
/// the resolver pass finds a decoded image for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureReference {
    pub source: TextureSource,
    pub resolved_index: i32,
}

impl TextureReference {
    pub fn file(filename: impl Into<String>) -> Self {
        Self {
            source: TextureSource::File(filename.into()),
            resolved_index: NO_TEXTURE,
        }
    }

    pub fn named(id: impl Into<String>) -> Self {
        Self {
            source: TextureSource::Named(id.into()),
            resolved_index: NO_TEXTURE,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_index != NO_TEXTURE
    }
}

/// Typed material record produced from a `<bsdf>` node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    /// Empty for inline / anonymous materials.
    pub id: String,
    pub material_type: MaterialType,
    pub base_color: Rgb,
    pub roughness: f32,
    /// Complex IOR, real part (conductors).
    pub eta: Rgb,
    /// Complex IOR, imaginary part (conductors).
    pub k: Rgb,
    pub interior_ior: f32,
    pub exterior_ior: f32,
    pub metallic: f32,
    pub specular: f32,
    pub specular_tint: f32,
    pub sheen: f32,
    pub sheen_tint: f32,
    pub clearcoat: f32,
    pub clearcoat_gloss: f32,
    pub specular_transmission: f32,
    pub opacity: f32,
    pub blend_weight: f32,
    pub nonlinear: bool,
    pub base_color_texture: Option<TextureReference>,
    pub roughness_texture: Option<TextureReference>,
    pub normal_texture: Option<TextureReference>,
}

impl Default for Material {
    /// Baseline values shared by every BSDF family before type defaults apply.
    fn default() -> Self {
        Self {
            id: String::new(),
            material_type: MaterialType::Diffuse,
            base_color: Vec3::splat(0.5),
            roughness: 0.1,
            eta: Vec3::ONE,
            k: Vec3::ZERO,
            interior_ior: BK7_IOR,
            exterior_ior: AIR_IOR,
            metallic: 0.0,
            specular: 0.5,
            specular_tint: 0.0,
            sheen: 0.0,
            sheen_tint: 0.0,
            clearcoat: 0.0,
            clearcoat_gloss: 0.0,
            specular_transmission: 0.0,
            opacity: 1.0,
            blend_weight: 0.5,
            nonlinear: false,
            base_color_texture: None,
            roughness_texture: None,
            normal_texture: None,
        }
    }
}

impl Material {
    /// A material carrying the renderer's defaults for the given BSDF family.
    pub fn with_type_defaults(material_type: MaterialType) -> Self {
        let mut mat = Material {
            material_type,
            ..Default::default()
        };

        match material_type {
            MaterialType::Diffuse => {
                mat.roughness = 1.0;
                mat.base_color = Vec3::splat(0.5);
            }
            MaterialType::Conductor => {
                mat.roughness = 0.0;
                mat.base_color = Vec3::ONE;
            }
            MaterialType::RoughConductor => {
                mat.roughness = 0.1;
                mat.base_color = Vec3::ONE;
            }
            MaterialType::Dielectric | MaterialType::ThinDielectric => {
                mat.roughness = 0.0;
            }
            MaterialType::RoughDielectric => {
                mat.roughness = 0.1;
            }
            MaterialType::Plastic => {
                mat.roughness = 0.0;
                mat.interior_ior = POLYPROPYLENE_IOR;
            }
            MaterialType::RoughPlastic => {
                mat.roughness = 0.1;
                mat.interior_ior = POLYPROPYLENE_IOR;
            }
            MaterialType::Principled => {
                mat.specular = 0.5;
            }
            MaterialType::Blend => {
                mat.blend_weight = 0.5;
            }
            MaterialType::Mask => {
                mat.opacity = 0.5;
            }
            MaterialType::Null => {}
        }

        mat
    }

    /// The material substituted when a shape names no usable material:
    /// mid-gray diffuse with mid roughness.
    pub fn fallback() -> Self {
        Material {
            material_type: MaterialType::Diffuse,
            base_color: Vec3::splat(0.5),
            roughness: 0.5,
            ..Default::default()
        }
    }

    /// Bound texture slots, in base color / roughness / normal order.
    pub fn texture_slots(&self) -> impl Iterator<Item = &TextureReference> {
        [
            self.base_color_texture.as_ref(),
            self.roughness_texture.as_ref(),
            self.normal_texture.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    pub fn texture_slots_mut(&mut self) -> impl Iterator<Item = &mut TextureReference> {
        [
            self.base_color_texture.as_mut(),
            self.roughness_texture.as_mut(),
            self.normal_texture.as_mut(),
        ]
        .into_iter()
        .flatten()
    }

    fn slot_index(slot: &Option<TextureReference>) -> i32 {
        slot.as_ref().map_or(NO_TEXTURE, |t| t.resolved_index)
    }
}

/// GPU-side material record; field order and padding match the shader struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub base_color: [f32; 3],
    pub roughness: f32,

    pub eta: [f32; 3],
    pub metallic: f32,

    pub k: [f32; 3],
    pub material_type: u32,

    pub interior_ior: f32,
    pub exterior_ior: f32,
    pub base_color_texture: i32,
    pub roughness_texture: i32,

    pub normal_texture: i32,
    pub specular: f32,
    pub specular_tint: f32,
    pub sheen: f32,

    pub sheen_tint: f32,
    pub clearcoat: f32,
    pub clearcoat_gloss: f32,
    pub specular_transmission: f32,

    pub opacity: f32,
    pub blend_weight: f32,
    pub nonlinear: f32,
    pub _pad: f32,
}

impl From<&Material> for GpuMaterial {
    fn from(mat: &Material) -> Self {
        // The shader keys its metal lobe off `metallic`.
        let metallic = if mat.material_type.is_conductor() {
            1.0
        } else {
            mat.metallic
        };

        Self {
            base_color: mat.base_color.to_array(),
            roughness: mat.roughness,
            eta: mat.eta.to_array(),
            metallic,
            k: mat.k.to_array(),
            material_type: mat.material_type as u32,
            interior_ior: mat.interior_ior,
            exterior_ior: mat.exterior_ior,
            base_color_texture: Material::slot_index(&mat.base_color_texture),
            roughness_texture: Material::slot_index(&mat.roughness_texture),
            normal_texture: Material::slot_index(&mat.normal_texture),
            specular: mat.specular,
            specular_tint: mat.specular_tint,
            sheen: mat.sheen,
            sheen_tint: mat.sheen_tint,
            clearcoat: mat.clearcoat,
            clearcoat_gloss: mat.clearcoat_gloss,
            specular_transmission: mat.specular_transmission,
            opacity: mat.opacity,
            blend_weight: mat.blend_weight,
            nonlinear: if mat.nonlinear { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

/// Arena of named materials with an id → slot map.
///
/// Re-inserting an existing id overwrites the material in place, so slot
/// indices handed out earlier stay valid.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    by_id: HashMap<String, usize>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a material keyed by its id; last writer wins. Returns its slot.
    pub fn insert(&mut self, material: Material) -> usize {
        if let Some(&slot) = self.by_id.get(&material.id) {
            self.materials[slot] = material;
            return slot;
        }
        let slot = self.materials.len();
        self.by_id.insert(material.id.clone(), slot);
        self.materials.push(material);
        slot
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.index_of(id).map(|slot| &self.materials[slot])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.materials.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Material> {
        self.materials.iter_mut()
    }

    pub fn as_slice(&self) -> &[Material] {
        &self.materials
    }
}
