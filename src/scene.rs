//! Scene document driver: one pass over the children of `<scene>`.

use std::path::Path;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::error::{Result, SceneError};
use crate::material::interpret_material;
use crate::parsing::{
    Element, child_transform, parse_document, parse_float, parse_int, parse_rgb,
    substitute_defaults,
};
use crate::textures::{TextureDecoder, resolve_textures};
use crate::types::{
    Camera, EnvironmentMapInfo, FovAxis, SceneDocument, Shape, ShapeKind,
};

/// Parse a scene from XML text. Relative paths are left unresolved.
///
/// Fails only when the document is not well-formed XML or its root is not
/// `<scene>`. Everything else degrades with a warning.
pub fn parse_str(xml: &str) -> Result<SceneDocument> {
    let mut root = parse_document(xml)?;
    if root.name != "scene" {
        return Err(SceneError::Document(format!(
            "root element is <{}>, expected <scene>",
            root.name
        )));
    }
    substitute_defaults(&mut root);

    let mut doc = SceneDocument::default();
    for node in &root.children {
        match node.name.as_str() {
            "sensor" => parse_sensor(node, &mut doc),
            "bsdf" => {
                let material = interpret_material(node, false);
                if material.id.is_empty() {
                    warn!("Top-level BSDF without an id is unreachable, ignoring");
                } else {
                    doc.materials.insert(material);
                }
            }
            "shape" => {
                if let Some(shape) = parse_shape(node) {
                    doc.shapes.push(shape);
                }
            }
            "emitter" => parse_emitter(node, &mut doc),
            "texture" => parse_texture_definition(node, &mut doc),
            "integrator" => {
                if let Some(depth) = integer_property(node, "max_depth") {
                    doc.settings.max_depth = Some(depth);
                }
            }
            other => debug!(node = other, "Ignoring scene child"),
        }
    }

    info!(
        materials = doc.materials.len(),
        shapes = doc.shapes.len(),
        textures = doc.named_textures.len(),
        envmap = doc.environment.present,
        "Parsed scene document"
    );
    Ok(doc)
}

/// Read and parse a scene file; relative references resolve against its
/// directory.
pub fn parse_file(path: &Path) -> Result<SceneDocument> {
    if !path.exists() {
        return Err(SceneError::Input(format!(
            "Scene file not found: {}",
            path.display()
        )));
    }
    let xml = std::fs::read_to_string(path)?;
    info!(path = %path.display(), bytes = xml.len(), "Read scene file");

    let mut doc = parse_str(&xml)?;
    doc.scene_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(doc)
}

/// Decode textures for every named and inline material of the document.
///
/// Runs after the whole document is read, so materials declared after the
/// texture they use still resolve.
pub fn resolve_document_textures<D>(doc: &mut SceneDocument, decoder: &D)
where
    D: TextureDecoder + ?Sized,
{
    let materials = doc.materials.iter_mut().chain(
        doc.shapes
            .iter_mut()
            .filter_map(|shape| shape.inline_material.as_mut()),
    );
    doc.textures = resolve_textures(materials, &doc.named_textures, &doc.scene_dir, decoder);
}

/// Parse a scene file and resolve its textures.
pub fn load_scene<D>(path: &Path, decoder: &D) -> Result<SceneDocument>
where
    D: TextureDecoder + ?Sized,
{
    let mut doc = parse_file(path)?;
    resolve_document_textures(&mut doc, decoder);
    Ok(doc)
}

fn parse_sensor(node: &Element, doc: &mut SceneDocument) {
    let mut camera = Camera {
        transform: child_transform(node),
        ..Default::default()
    };

    if let Some(fov) = node.property("float", "fov") {
        camera.fov_degrees = parse_float(fov);
    }
    match node.property("string", "fov_axis") {
        None | Some("x") => {}
        Some("y") => camera.fov_axis = FovAxis::Y,
        Some(other) => warn!(fov_axis = other, "Unsupported fov_axis, using x"),
    }

    if let Some(film) = node.child("film") {
        if let Some(width) = integer_property(film, "width") {
            camera.film_width = width;
        }
        if let Some(height) = integer_property(film, "height") {
            camera.film_height = height;
        }
    }

    if let Some(samples) = node
        .child("sampler")
        .and_then(|s| integer_property(s, "sample_count"))
    {
        doc.settings.samples_per_pixel = Some(samples);
    }

    debug!(
        fov = camera.fov_degrees,
        width = camera.film_width,
        height = camera.film_height,
        "Parsed sensor"
    );
    doc.camera = camera;
}

fn parse_shape(node: &Element) -> Option<Shape> {
    let kind = match node.attr("type").unwrap_or_default() {
        "obj" | "ply" => ShapeKind::Mesh,
        "rectangle" => ShapeKind::Rectangle,
        other => {
            warn!(shape_type = other, "Unsupported shape type, skipping");
            return None;
        }
    };

    let mut shape = Shape::new(kind);
    shape.transform = child_transform(node);
    shape.source_file = node.property("string", "filename").map(Into::into);
    shape.material_ref = node
        .children_named("ref")
        .find_map(|r| r.attr("id").filter(|id| !id.is_empty()))
        .map(str::to_string);
    shape.inline_material = node.child("bsdf").map(|b| interpret_material(b, true));

    if let Some(emitter) = node.child("emitter") {
        shape.is_emitter = true;
        shape.emission = emitter
            .property("rgb", "radiance")
            .or_else(|| emitter.property("spectrum", "radiance"))
            .map_or(Vec3::ZERO, parse_rgb);
    }

    if kind == ShapeKind::Mesh && shape.source_file.is_none() {
        warn!("Mesh shape has no filename");
    }
    Some(shape)
}

fn parse_emitter(node: &Element, doc: &mut SceneDocument) {
    match node.attr("type").unwrap_or_default() {
        "envmap" => {
            let filename = node.property("string", "filename").unwrap_or_default();
            doc.environment = EnvironmentMapInfo {
                filename: filename.to_string(),
                intensity: emitter_scale(node),
                present: !filename.is_empty(),
            };
            debug!(filename, intensity = doc.environment.intensity, "Parsed envmap");
        }
        "constant" => {
            let radiance = node
                .property("rgb", "radiance")
                .or_else(|| node.property("spectrum", "radiance"))
                .map_or(Vec3::ONE, parse_rgb);
            doc.background = Some(radiance);
        }
        other => warn!(emitter_type = other, "Unsupported emitter type, ignoring"),
    }
}

/// `scale` as an RGB averaged to one intensity, or a float. An RGB scale
/// takes precedence when both are given. Defaults to 1.
fn emitter_scale(node: &Element) -> f32 {
    if let Some(rgb) = node.property("rgb", "scale") {
        return parse_rgb(rgb).element_sum() / 3.0;
    }
    node.property("float", "scale").map_or(1.0, parse_float)
}

fn parse_texture_definition(node: &Element, doc: &mut SceneDocument) {
    let Some(id) = node.attr("id") else {
        warn!("Standalone texture without an id, ignoring");
        return;
    };
    match node.attr("type") {
        Some("bitmap") => {
            let filename = node.property("string", "filename").unwrap_or_default();
            doc.named_textures.insert(id.to_string(), filename.to_string());
        }
        other => warn!(
            id,
            texture_type = other.unwrap_or(""),
            "Unsupported standalone texture type, ignoring"
        ),
    }
}

fn integer_property(node: &Element, name: &str) -> Option<u32> {
    node.property("integer", name)
        .and_then(parse_int)
        .and_then(|v| u32::try_from(v).ok())
}
