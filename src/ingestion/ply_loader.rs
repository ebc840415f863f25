use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::debug;

use super::{FaceCorner, Tessellation};
use crate::error::{Result, SceneError};

/// Texture coordinate property names, in lookup order.
const UV_KEYS: [(&str, &str); 3] = [("u", "v"), ("s", "t"), ("texture_u", "texture_v")];

/// Load a PLY file. Normals and texcoords are per vertex, so every corner
/// uses the position index for all three attributes.
pub fn load_ply(path: &Path) -> Result<Tessellation> {
    let file = File::open(path)
        .map_err(|e| SceneError::Tessellation(format!("Failed to open PLY: {e}")))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| SceneError::Tessellation(format!("Failed to parse PLY: {e}")))?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| SceneError::Tessellation("PLY file missing 'vertex' element".into()))?;

    debug!(vertex_count = vertices.len(), "Parsing PLY vertices");

    let first = vertices.first();
    let has_normals = first.is_some_and(|v| v.contains_key("nx"));
    let uv_keys = first.and_then(|v| {
        UV_KEYS
            .into_iter()
            .find(|(u, v_key)| v.contains_key(*u) && v.contains_key(*v_key))
    });

    let mut tess = Tessellation {
        positions: Vec::with_capacity(vertices.len() * 3),
        ..Default::default()
    };
    if has_normals {
        tess.normals.reserve(vertices.len() * 3);
    }
    if uv_keys.is_some() {
        tess.texcoords.reserve(vertices.len() * 2);
    }

    for vertex in vertices {
        for key in ["x", "y", "z"] {
            tess.positions.push(get_float_property(vertex, key)?);
        }
        if has_normals {
            for key in ["nx", "ny", "nz"] {
                tess.normals.push(get_float_property(vertex, key)?);
            }
        }
        if let Some((u, v)) = uv_keys {
            tess.texcoords.push(get_float_property(vertex, u)?);
            tess.texcoords.push(get_float_property(vertex, v)?);
        }
    }

    if let Some(faces) = ply.payload.get("face") {
        debug!(face_count = faces.len(), "Parsing PLY faces");
        let corner = |i: u32| FaceCorner::per_vertex(i, has_normals, uv_keys.is_some());
        for face in faces {
            let face_indices = get_index_list(face)?;
            // Fan-triangulate polygons with >3 vertices
            if face_indices.len() >= 3 {
                for i in 1..face_indices.len() - 1 {
                    tess.faces.push(corner(face_indices[0]));
                    tess.faces.push(corner(face_indices[i]));
                    tess.faces.push(corner(face_indices[i + 1]));
                }
            }
        }
    }

    Ok(tess)
}

/// Extract a float property, handling Float/Double/Int/Short types.
fn get_float_property(element: &DefaultElement, key: &str) -> Result<f32> {
    let prop = element.get(key).ok_or_else(|| {
        SceneError::Tessellation(format!("PLY vertex missing property '{key}'"))
    })?;

    match prop {
        Property::Float(v) => Ok(*v),
        Property::Double(v) => Ok(*v as f32),
        Property::Int(v) => Ok(*v as f32),
        Property::Short(v) => Ok(*v as f32),
        Property::UInt(v) => Ok(*v as f32),
        Property::UShort(v) => Ok(*v as f32),
        Property::Char(v) => Ok(*v as f32),
        Property::UChar(v) => Ok(*v as f32),
        _ => Err(SceneError::Tessellation(format!(
            "PLY property '{key}' has unsupported type"
        ))),
    }
}

/// Extract the index list from a face element.
fn get_index_list(face: &DefaultElement) -> Result<Vec<u32>> {
    let key = if face.contains_key("vertex_indices") {
        "vertex_indices"
    } else {
        "vertex_index"
    };

    let prop = face.get(key).ok_or_else(|| {
        SceneError::Tessellation("PLY face missing vertex_indices property".into())
    })?;

    match prop {
        Property::ListInt(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListShort(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        _ => Err(SceneError::Tessellation(
            "PLY face vertex_indices has unsupported type".into(),
        )),
    }
}
