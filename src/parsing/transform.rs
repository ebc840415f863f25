//! `<transform>` node interpretation.

use glam::{Mat4, Vec3, Vec4};
use tracing::warn;

use super::values::{parse_float, parse_matrix, parse_vec3};
use super::xml::Element;

/// Compose the operations inside a `<transform>` node.
///
/// Operations apply in document order; each one left-multiplies the
/// accumulated matrix. An empty transform is the identity.
pub fn parse_transform(node: &Element) -> Mat4 {
    node.children
        .iter()
        .fold(Mat4::IDENTITY, |acc, op| match transform_op(op) {
            Some(m) => m * acc,
            None => acc,
        })
}

/// The transform of the first `<transform>` child, or identity.
pub fn child_transform(node: &Element) -> Mat4 {
    node.child("transform")
        .map(parse_transform)
        .unwrap_or(Mat4::IDENTITY)
}

fn transform_op(op: &Element) -> Option<Mat4> {
    match op.name.as_str() {
        "matrix" => {
            let m = parse_matrix(op.value());
            if m.is_none() {
                warn!(value = op.value(), "Matrix needs 16 values, using identity");
            }
            m
        }
        "translate" => Some(Mat4::from_translation(vector_attr(op, 0.0))),
        "scale" => Some(Mat4::from_scale(scale_attr(op))),
        "rotate" => rotation(op),
        "lookat" => look_at(op),
        other => {
            warn!(op = other, "Ignoring unsupported transform operation");
            None
        }
    }
}

/// Vector from `value="x y z"` or individual `x`/`y`/`z` attributes.
fn vector_attr(op: &Element, default: f32) -> Vec3 {
    if let Some(value) = op.attr("value") {
        return parse_vec3(value);
    }
    let axis = |key: &str| op.attr(key).map_or(default, parse_float);
    Vec3::new(axis("x"), axis("y"), axis("z"))
}

/// A single `value` token scales uniformly.
fn scale_attr(op: &Element) -> Vec3 {
    match op.attr("value") {
        Some(value) if value.split([',', ' ']).filter(|t| !t.is_empty()).count() == 1 => {
            Vec3::splat(parse_float(value))
        }
        _ => vector_attr(op, 1.0),
    }
}

fn rotation(op: &Element) -> Option<Mat4> {
    let axis = match op.attr("axis") {
        Some(axis) => parse_vec3(axis),
        None => vector_attr(op, 0.0),
    };
    let angle = op.attr("angle").map_or(0.0, parse_float);

    let Some(axis) = axis.try_normalize() else {
        warn!("Rotation without a usable axis, skipping");
        return None;
    };
    Some(Mat4::from_axis_angle(axis, angle.to_radians()))
}

/// Camera-to-world matrix looking from `origin` towards `target`.
/// Columns: left, up, forward, origin.
fn look_at(op: &Element) -> Option<Mat4> {
    let origin = op.attr("origin").map_or(Vec3::ZERO, parse_vec3);
    let target = op.attr("target").map_or(Vec3::Z, parse_vec3);
    let up = op.attr("up").map_or(Vec3::Y, parse_vec3);

    let forward = (target - origin).try_normalize();
    let left = forward.and_then(|f| up.cross(f).try_normalize());
    let (Some(forward), Some(left)) = (forward, left) else {
        warn!("Degenerate lookat (coincident points or parallel up), skipping");
        return None;
    };
    let new_up = forward.cross(left);

    Some(Mat4::from_cols(
        left.extend(0.0),
        new_up.extend(0.0),
        forward.extend(0.0),
        Vec4::new(origin.x, origin.y, origin.z, 1.0),
    ))
}
