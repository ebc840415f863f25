//! `<bsdf>` node interpretation.
//!
//! Type defaults are applied first, then every property child overrides in
//! document order. When two properties target the same field (`alpha` and
//! `roughness`, say) the later one wins.

pub mod presets;

use tracing::{debug, warn};

use crate::parsing::{Element, parse_bool, parse_float, parse_rgb};
use crate::types::{Material, MaterialType, TextureReference};

use presets::{VACUUM_IOR, conductor_preset, ior_preset};

/// How many transparent wrappers (`twosided`, `normalmap`) are unwrapped
/// before the remaining node is interpreted as-is.
pub const MAX_WRAPPER_DEPTH: usize = 4;

/// Interpret a `<bsdf>` node.
///
/// Top-level nodes take their `id` attribute; nested (inline) nodes are
/// always anonymous and the caller decides what they belong to.
pub fn interpret_material(node: &Element, nested: bool) -> Material {
    let (body, normal_texture) = unwrap_wrappers(node);

    let mut mat = interpret_bsdf(body);
    if normal_texture.is_some() {
        mat.normal_texture = normal_texture;
    }
    mat.id = if nested {
        String::new()
    } else {
        node.attr("id").unwrap_or_default().to_string()
    };

    debug!(
        id = %mat.id,
        material_type = %mat.material_type,
        roughness = mat.roughness,
        "Interpreted BSDF"
    );
    mat
}

/// Walk through `twosided` / `normalmap` wrappers down to the real BSDF,
/// collecting the normal map on the way.
fn unwrap_wrappers(node: &Element) -> (&Element, Option<TextureReference>) {
    let mut current = node;
    let mut normal_texture = None;

    for _ in 0..MAX_WRAPPER_DEPTH {
        let is_normalmap = match current.attr("type") {
            Some("twosided") => false,
            Some("normalmap") => true,
            _ => break,
        };
        let Some(inner) = current.child("bsdf") else {
            break;
        };
        if is_normalmap && normal_texture.is_none() {
            normal_texture = current
                .children_named("texture")
                .find(|t| t.property_name() == "normalmap")
                .and_then(texture_reference);
        }
        current = inner;
    }

    (current, normal_texture)
}

fn interpret_bsdf(node: &Element) -> Material {
    let plugin = node.attr("type").unwrap_or_default();
    let material_type = MaterialType::from_plugin_name(plugin).unwrap_or_else(|| {
        warn!(plugin, "Unrecognized BSDF type, falling back to diffuse");
        MaterialType::Diffuse
    });

    let mut mat = Material::with_type_defaults(material_type);
    for child in &node.children {
        apply_property(&mut mat, child);
    }
    mat
}

fn apply_property(mat: &mut Material, prop: &Element) {
    let name = prop.property_name();
    match prop.name.as_str() {
        "rgb" | "spectrum" => apply_color(mat, name, prop.value()),
        "float" => apply_float(mat, name, parse_float(prop.value())),
        "string" => apply_string(mat, name, prop.value()),
        "boolean" => {
            if name == "nonlinear" {
                mat.nonlinear = parse_bool(prop.value());
            }
        }
        "texture" => {
            if let Some(reference) = texture_reference(prop) {
                assign_texture(mat, name, reference);
            }
        }
        // `<ref name="reflectance" id="..."/>` points at a standalone texture.
        "ref" if !name.is_empty() => {
            if let Some(id) = prop.attr("id") {
                assign_texture(mat, name, TextureReference::named(id));
            }
        }
        _ => {}
    }
}

fn apply_color(mat: &mut Material, name: &str, value: &str) {
    let color = parse_rgb(value);
    match name {
        "reflectance" | "diffuse_reflectance" | "specular_reflectance" | "base_color" => {
            mat.base_color = color;
        }
        "eta" => mat.eta = color,
        "k" => mat.k = color,
        _ => {}
    }
}

fn apply_float(mat: &mut Material, name: &str, value: f32) {
    match name {
        // The shading model squares roughness, so alpha is stored pre-rooted.
        "alpha" => mat.roughness = value.max(0.0).sqrt(),
        "roughness" => mat.roughness = value,
        "int_ior" | "eta" => mat.interior_ior = value,
        "ext_ior" => mat.exterior_ior = value,
        "metallic" => mat.metallic = value,
        "specular" => mat.specular = value,
        "spec_tint" => mat.specular_tint = value,
        "sheen" => mat.sheen = value,
        "sheen_tint" => mat.sheen_tint = value,
        "clearcoat" => mat.clearcoat = value,
        "clearcoat_gloss" => mat.clearcoat_gloss = value,
        "spec_trans" => mat.specular_transmission = value,
        "opacity" => mat.opacity = value,
        "weight" => mat.blend_weight = value,
        _ => {}
    }
}

fn apply_string(mat: &mut Material, name: &str, value: &str) {
    match name {
        "material" => match conductor_preset(value) {
            Some(preset) => {
                mat.eta = preset.eta;
                mat.k = preset.k;
            }
            None => warn!(material = value, "Unknown conductor preset, keeping eta/k"),
        },
        "int_ior" | "ext_ior" => {
            let ior = ior_preset(value).unwrap_or_else(|| {
                warn!(preset = value, "Unknown IOR preset, using vacuum");
                VACUUM_IOR
            });
            if name == "int_ior" {
                mat.interior_ior = ior;
            } else {
                mat.exterior_ior = ior;
            }
        }
        _ => {}
    }
}

fn assign_texture(mat: &mut Material, name: &str, reference: TextureReference) {
    match name {
        "reflectance" | "diffuse_reflectance" | "base_color" => {
            mat.base_color_texture = Some(reference);
        }
        "alpha" | "roughness" => mat.roughness_texture = Some(reference),
        _ => debug!(property = name, "Ignoring texture on unsupported slot"),
    }
}

/// Read a `<texture>` node as a slot reference. Bitmaps carry a filename;
/// `ref` textures point at a standalone definition by id.
fn texture_reference(node: &Element) -> Option<TextureReference> {
    match node.attr("type") {
        Some("bitmap") => match node.property("string", "filename") {
            Some(filename) => Some(TextureReference::file(filename)),
            None => {
                warn!("Bitmap texture without a filename, ignoring");
                None
            }
        },
        Some("ref") => node.attr("id").map(TextureReference::named),
        other => {
            warn!(texture_type = other.unwrap_or(""), "Unsupported texture type, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_document;
    use crate::types::{NO_TEXTURE, TextureSource};
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn material(xml: &str) -> Material {
        interpret_material(&parse_document(xml).unwrap(), false)
    }

    #[test]
    fn diffuse_with_reflectance() {
        let mat = material(
            r#"<bsdf id="red" type="diffuse"><rgb name="reflectance" value="0.8, 0.1, 0.1"/></bsdf>"#,
        );
        assert_eq!(mat.id, "red");
        assert_eq!(mat.material_type, MaterialType::Diffuse);
        assert_eq!(mat.base_color, Vec3::new(0.8, 0.1, 0.1));
        assert_eq!(mat.roughness, 1.0);
    }

    #[test]
    fn gold_rough_conductor() {
        let mat = material(
            r#"<bsdf type="roughconductor"><string name="material" value="gold"/></bsdf>"#,
        );
        assert_eq!(mat.material_type, MaterialType::RoughConductor);
        assert_eq!(mat.eta, Vec3::new(0.143, 0.374, 1.442));
        assert_eq!(mat.k, Vec3::new(3.983, 2.387, 1.603));
        assert_eq!(mat.roughness, 0.1);
        assert_eq!(mat.base_color, Vec3::ONE);
    }

    #[test]
    fn alpha_is_square_rooted() {
        for plugin in ["roughconductor", "roughdielectric", "roughplastic"] {
            let mat = material(&format!(
                r#"<bsdf type="{plugin}"><float name="alpha" value="0.25"/></bsdf>"#
            ));
            assert_abs_diff_eq!(mat.roughness, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn roughness_is_stored_raw() {
        let mat = material(
            r#"<bsdf type="principled"><float name="roughness" value="0.25"/></bsdf>"#,
        );
        assert_eq!(mat.roughness, 0.25);
    }

    #[test]
    fn alpha_and_roughness_last_wins() {
        let mat = material(
            r#"<bsdf type="roughconductor">
                <float name="roughness" value="0.9"/>
                <float name="alpha" value="0.04"/>
            </bsdf>"#,
        );
        assert_abs_diff_eq!(mat.roughness, 0.2, epsilon = 1e-6);

        let mat = material(
            r#"<bsdf type="roughconductor">
                <float name="alpha" value="0.04"/>
                <float name="roughness" value="0.9"/>
            </bsdf>"#,
        );
        assert_eq!(mat.roughness, 0.9);
    }

    #[test]
    fn twosided_wrapper_is_transparent() {
        let mat = material(
            r#"<bsdf type="twosided" id="floor">
                <bsdf type="plastic" id="ignored">
                    <rgb name="diffuse_reflectance" value="0.2 0.3 0.4"/>
                    <boolean name="nonlinear" value="true"/>
                </bsdf>
            </bsdf>"#,
        );
        assert_eq!(mat.id, "floor");
        assert_eq!(mat.material_type, MaterialType::Plastic);
        assert_eq!(mat.base_color, Vec3::new(0.2, 0.3, 0.4));
        assert!(mat.nonlinear);
        assert_eq!(mat.interior_ior, 1.49);
    }

    #[test]
    fn nested_material_has_no_id() {
        let node = parse_document(r#"<bsdf type="diffuse" id="own"/>"#).unwrap();
        let mat = interpret_material(&node, true);
        assert!(mat.id.is_empty());
    }

    #[test]
    fn unknown_type_falls_back_to_diffuse() {
        let mat = material(r#"<bsdf type="hair" id="h"><rgb name="reflectance" value="1 0 0"/></bsdf>"#);
        assert_eq!(mat.material_type, MaterialType::Diffuse);
        assert_eq!(mat.roughness, 1.0);
        assert_eq!(mat.base_color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mat.id, "h");
    }

    #[test]
    fn empty_twosided_falls_back_to_diffuse() {
        let mat = material(r#"<bsdf type="twosided" id="t"/>"#);
        assert_eq!(mat.material_type, MaterialType::Diffuse);
        assert_eq!(mat.id, "t");
    }

    #[test]
    fn dielectric_ior_presets_and_floats() {
        let mat = material(r#"<bsdf type="dielectric"/>"#);
        assert_eq!(mat.interior_ior, 1.5046);
        assert_eq!(mat.exterior_ior, 1.000277);
        assert_eq!(mat.roughness, 0.0);

        let mat = material(
            r#"<bsdf type="thindielectric">
                <string name="int_ior" value="water"/>
                <string name="ext_ior" value="vacuum"/>
            </bsdf>"#,
        );
        assert_eq!(mat.material_type, MaterialType::ThinDielectric);
        assert_eq!(mat.interior_ior, 1.333);
        assert_eq!(mat.exterior_ior, 1.0);

        let mat = material(
            r#"<bsdf type="dielectric"><float name="int_ior" value="1.7"/><float name="ext_ior" value="1.1"/></bsdf>"#,
        );
        assert_eq!(mat.interior_ior, 1.7);
        assert_eq!(mat.exterior_ior, 1.1);
    }

    #[test]
    fn unknown_ior_preset_is_vacuum() {
        let mat = material(r#"<bsdf type="dielectric"><string name="int_ior" value="mithril"/></bsdf>"#);
        assert_eq!(mat.interior_ior, 1.0);
    }

    #[test]
    fn explicit_property_beats_type_default() {
        let mat = material(r#"<bsdf type="plastic"><float name="int_ior" value="1.6"/></bsdf>"#);
        assert_eq!(mat.interior_ior, 1.6);

        let mat = material(r#"<bsdf type="mask"><float name="opacity" value="0.9"/></bsdf>"#);
        assert_eq!(mat.material_type, MaterialType::Mask);
        assert_eq!(mat.opacity, 0.9);

        let mat = material(r#"<bsdf type="blendbsdf"><float name="weight" value="0.2"/></bsdf>"#);
        assert_eq!(mat.blend_weight, 0.2);
    }

    #[test]
    fn principled_channels() {
        let mat = material(
            r#"<bsdf type="principled">
                <rgb name="base_color" value="0.1, 0.2, 0.3"/>
                <float name="metallic" value="0.7"/>
                <float name="spec_tint" value="0.1"/>
                <float name="sheen" value="0.2"/>
                <float name="sheen_tint" value="0.3"/>
                <float name="clearcoat" value="0.4"/>
                <float name="clearcoat_gloss" value="0.5"/>
                <float name="spec_trans" value="0.6"/>
            </bsdf>"#,
        );
        assert_eq!(mat.base_color, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(mat.metallic, 0.7);
        assert_eq!(mat.specular, 0.5);
        assert_eq!(mat.specular_tint, 0.1);
        assert_eq!(mat.sheen, 0.2);
        assert_eq!(mat.sheen_tint, 0.3);
        assert_eq!(mat.clearcoat, 0.4);
        assert_eq!(mat.clearcoat_gloss, 0.5);
        assert_eq!(mat.specular_transmission, 0.6);
    }

    #[test]
    fn conductor_explicit_eta_k() {
        let mat = material(
            r#"<bsdf type="conductor">
                <rgb name="eta" value="0.2, 0.9, 1.1"/>
                <spectrum name="k" value="3.9, 2.4, 2.1"/>
            </bsdf>"#,
        );
        assert_eq!(mat.eta, Vec3::new(0.2, 0.9, 1.1));
        assert_eq!(mat.k, Vec3::new(3.9, 2.4, 2.1));
        assert_eq!(mat.roughness, 0.0);
    }

    #[test]
    fn texture_slots_store_references() {
        let mat = material(
            r#"<bsdf type="roughplastic">
                <texture name="diffuse_reflectance" type="bitmap">
                    <string name="filename" value="textures/wood.png"/>
                </texture>
                <texture name="alpha" type="ref" id="rough_map"/>
            </bsdf>"#,
        );
        let base = mat.base_color_texture.as_ref().unwrap();
        assert_eq!(base.source, TextureSource::File("textures/wood.png".into()));
        assert_eq!(base.resolved_index, NO_TEXTURE);

        let rough = mat.roughness_texture.as_ref().unwrap();
        assert_eq!(rough.source, TextureSource::Named("rough_map".into()));
        assert!(!rough.is_resolved());
        assert!(mat.normal_texture.is_none());
        // A texture-valued alpha leaves the scalar default alone.
        assert_eq!(mat.roughness, 0.1);
    }

    #[test]
    fn ref_node_with_name_is_texture_reference() {
        let mat = material(
            r#"<bsdf type="diffuse"><ref name="reflectance" id="checker"/></bsdf>"#,
        );
        assert_eq!(
            mat.base_color_texture.unwrap().source,
            TextureSource::Named("checker".into())
        );
    }

    #[test]
    fn normalmap_wrapper_fills_normal_slot() {
        let mat = material(
            r#"<bsdf type="twosided" id="bumpy">
                <bsdf type="normalmap">
                    <texture name="normalmap" type="bitmap">
                        <string name="filename" value="normal.png"/>
                    </texture>
                    <bsdf type="roughconductor"><float name="alpha" value="0.09"/></bsdf>
                </bsdf>
            </bsdf>"#,
        );
        assert_eq!(mat.id, "bumpy");
        assert_eq!(mat.material_type, MaterialType::RoughConductor);
        assert_abs_diff_eq!(mat.roughness, 0.3, epsilon = 1e-6);
        assert_eq!(
            mat.normal_texture.unwrap().source,
            TextureSource::File("normal.png".into())
        );
    }

    #[test]
    fn bitmap_without_filename_is_ignored() {
        let mat = material(
            r#"<bsdf type="diffuse"><texture name="reflectance" type="bitmap"/></bsdf>"#,
        );
        assert!(mat.base_color_texture.is_none());
    }
}
