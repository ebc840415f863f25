//! Texture reference resolution.
//!
//! Materials come out of the interpreter holding filenames (or ids of
//! standalone texture definitions). This pass decodes every distinct file
//! once and rewrites each slot to an index into the packed texture array.

pub mod decoder;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::types::{DecodedTexture, Material, NO_TEXTURE, TextureReference, TextureSource};

pub use decoder::{ImageDecoder, TextureDecoder};

/// Decode every distinct texture referenced by `materials` and point their
/// slots at the result.
///
/// - `named_textures` maps standalone texture ids to filenames.
/// - Filenames resolve relative to `scene_dir`.
/// - Indices are assigned in sorted-filename order, skipping failed decodes.
/// - Slots whose file failed, or whose id is unknown, get [`NO_TEXTURE`].
pub fn resolve_textures<'a, D>(
    materials: impl IntoIterator<Item = &'a mut Material>,
    named_textures: &HashMap<String, String>,
    scene_dir: &Path,
    decoder: &D,
) -> Vec<DecodedTexture>
where
    D: TextureDecoder + ?Sized,
{
    let mut materials: Vec<&mut Material> = materials.into_iter().collect();

    // 1. Distinct filenames across every slot.
    let filenames: Vec<String> = materials
        .iter()
        .flat_map(|mat| mat.texture_slots())
        .filter_map(|slot| slot_filename(slot, named_textures))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // 2. Decode each file once; files are independent.
    let decoded: Vec<_> = filenames
        .par_iter()
        .map(|filename| decoder.decode(&scene_dir.join(filename)))
        .collect();

    // 3. Sequential indices for the successes.
    let mut textures = Vec::new();
    let mut index_of: HashMap<&str, i32> = HashMap::new();
    for (filename, result) in filenames.iter().zip(decoded) {
        match result {
            Ok(texture) if texture.is_valid() => {
                index_of.insert(filename.as_str(), textures.len() as i32);
                textures.push(texture);
            }
            Ok(_) => warn!(texture = %filename, "Decoded texture is empty, skipping"),
            Err(e) => warn!(texture = %filename, "Failed to load texture: {e}"),
        }
    }

    // 4. Rewrite slots.
    for mat in materials.iter_mut() {
        let id = mat.id.clone();
        for slot in mat.texture_slots_mut() {
            slot.resolved_index = match slot_filename(slot, named_textures) {
                Some(filename) => index_of.get(filename).copied().unwrap_or(NO_TEXTURE),
                None => {
                    if let TextureSource::Named(texture_id) = &slot.source {
                        warn!(material = %id, texture = %texture_id, "Unresolved texture reference");
                    }
                    NO_TEXTURE
                }
            };
        }
    }

    info!(
        requested = filenames.len(),
        loaded = textures.len(),
        "Resolved textures"
    );
    textures
}

/// The file a slot ultimately reads, if any.
fn slot_filename<'a>(
    slot: &'a TextureReference,
    named_textures: &'a HashMap<String, String>,
) -> Option<&'a str> {
    let filename = match &slot.source {
        TextureSource::File(filename) => filename.as_str(),
        TextureSource::Named(id) => named_textures.get(id)?.as_str(),
    };
    (!filename.is_empty()).then_some(filename)
}
