use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::{FaceCorner, Tessellation};
use crate::error::{Result, SceneError};

/// Load an OBJ file into one tessellation.
///
/// Corners keep the file's own `v/vt/vn` indices across every group and
/// object, and an omitted `vt` or `vn` stays absent. Materials, groups,
/// points and lines are ignored; the scene's BSDFs take their place.
pub fn load_obj(path: &Path) -> Result<Tessellation> {
    let file = File::open(path).map_err(|e| {
        SceneError::Tessellation(format!("Failed to load OBJ {}: {e}", path.display()))
    })?;
    let tess = parse_obj(BufReader::new(file))?;

    debug!(
        positions = tess.position_count(),
        normals = tess.normal_count(),
        texcoords = tess.texcoord_count(),
        triangles = tess.triangle_count(),
        "Loaded OBJ"
    );
    Ok(tess)
}

/// Parse OBJ text. Polygons are fan-triangulated around their first corner.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<Tessellation> {
    let mut tess = Tessellation::default();
    let mut polygon: Vec<FaceCorner> = Vec::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SceneError::Tessellation(format!("Failed to read OBJ: {e}")))?;
        let line_no = line_index + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => push_floats(&mut tess.positions, tokens, 3, 3, line_no)?,
            Some("vn") => push_floats(&mut tess.normals, tokens, 3, 3, line_no)?,
            Some("vt") => push_floats(&mut tess.texcoords, tokens, 1, 2, line_no)?,
            Some("f") => {
                polygon.clear();
                for token in tokens {
                    polygon.push(parse_corner(token, &tess, line_no)?);
                }
                for i in 1..polygon.len().saturating_sub(1) {
                    tess.faces.extend([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            _ => {}
        }
    }
    Ok(tess)
}

/// Append `width` floats from `tokens`, zero-filling past the first `required`.
fn push_floats<'t>(
    dst: &mut Vec<f32>,
    mut tokens: impl Iterator<Item = &'t str>,
    required: usize,
    width: usize,
    line_no: usize,
) -> Result<()> {
    for i in 0..width {
        let value = match tokens.next() {
            Some(token) => token.parse::<f32>().map_err(|_| {
                SceneError::Tessellation(format!("OBJ line {line_no}: invalid number '{token}'"))
            })?,
            None if i >= required => 0.0,
            None => {
                return Err(SceneError::Tessellation(format!(
                    "OBJ line {line_no}: expected {required} components"
                )));
            }
        };
        dst.push(value);
    }
    Ok(())
}

/// Parse one `v`, `v/vt`, `v//vn` or `v/vt/vn` face token.
fn parse_corner(token: &str, tess: &Tessellation, line_no: usize) -> Result<FaceCorner> {
    let mut parts = token.split('/');
    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, tess.position_count(), line_no)?,
        _ => {
            return Err(SceneError::Tessellation(format!(
                "OBJ line {line_no}: face corner '{token}' has no position"
            )));
        }
    };
    let texcoord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, tess.texcoord_count(), line_no)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, tess.normal_count(), line_no)?),
        _ => None,
    };
    Ok(FaceCorner::new(position, normal, texcoord))
}

/// Convert a 1-based (or negative, relative) OBJ index to a 0-based one.
/// Range against the final arrays is checked by [`Tessellation::validate`].
fn resolve_index(text: &str, count: usize, line_no: usize) -> Result<u32> {
    let invalid = || SceneError::Tessellation(format!("OBJ line {line_no}: invalid index '{text}'"));
    let raw: i64 = text.parse().map_err(|_| invalid())?;
    let index = match raw {
        0 => return Err(invalid()),
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };
    u32::try_from(index).map_err(|_| invalid())
}
