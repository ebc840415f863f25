//! Primitive attribute-value parsers.
//!
//! The document format is loosely typed, so these never fail: malformed
//! numbers read as `0.0` and missing channels stay at zero.

use glam::{Mat4, Vec3};

/// Locale-independent decimal parse; malformed input yields `0.0`.
pub fn parse_float(text: &str) -> f32 {
    text.trim().parse::<f32>().unwrap_or(0.0)
}

/// Parse an integer attribute, `None` when malformed.
pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Parse `"r, g, b"` or `"r g b"`. Commas count as whitespace; fewer than
/// three tokens leave the trailing channels at `0.0`.
pub fn parse_rgb(text: &str) -> Vec3 {
    let normalized = text.replace(',', " ");
    let mut channels = [0.0_f32; 3];
    for (slot, token) in channels.iter_mut().zip(normalized.split_whitespace()) {
        *slot = parse_float(token);
    }
    Vec3::from_array(channels)
}

/// Same token rules as [`parse_rgb`], for points and directions.
pub fn parse_vec3(text: &str) -> Vec3 {
    parse_rgb(text)
}

/// `true` and `1` are truthy; everything else is false.
pub fn parse_bool(text: &str) -> bool {
    matches!(text.trim(), "true" | "1")
}

/// Parse 16 whitespace-separated floats in row-major order (row 0 first)
/// into a column-major [`Mat4`] with the same mathematical effect:
/// `result.col(c)[r] == input[r * 4 + c]`.
///
/// Returns `None` unless exactly 16 tokens are present.
pub fn parse_matrix(text: &str) -> Option<Mat4> {
    let values: Vec<f32> = text.split_whitespace().map(parse_float).collect();
    let row_major: [f32; 16] = values.try_into().ok()?;
    // Reading row-major data as columns yields the transpose.
    Some(Mat4::from_cols_array(&row_major).transpose())
}

/// Flatten a matrix back to row-major order; inverse of [`parse_matrix`].
pub fn to_row_major(m: &Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}
