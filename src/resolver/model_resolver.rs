//! Parent-chain flattening and texture slot resolution.

use super::{Degradation, ResolvedModel, MISSING_TEXTURE};
use crate::catalog::{CubeElement, ModelCatalog, ModelDefinition};
use crate::error::{BakerError, Result};
use crate::types::BlockTransform;
use std::collections::{BTreeMap, HashSet};

/// Backstop on chain length, independent of the visited-set check.
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// Maximum `#slot` hops before a texture reference is declared unresolvable.
pub const MAX_TEXTURE_HOPS: usize = 32;

/// Slots tried, in order, to texture the fallback cube of an elementless model.
const FALLBACK_CUBE_SLOTS: [&str; 3] = ["all", "side", "particle"];

/// Look up a model by name and flatten its parent chain.
pub fn flatten(catalog: &ModelCatalog, name: &str) -> Result<ModelDefinition> {
    let (key, model) = catalog
        .get_model_entry(name)
        .ok_or_else(|| BakerError::ModelNotFound(name.to_string()))?;
    flatten_definition(catalog, key, model)
}

/// Flatten a definition's parent chain into a single parentless definition.
///
/// The chain is walked iteratively. Revisiting a model, or exceeding
/// [`MAX_INHERITANCE_DEPTH`], fails with [`BakerError::CyclicModel`].
pub fn flatten_definition(
    catalog: &ModelCatalog,
    name: &str,
    leaf: &ModelDefinition,
) -> Result<ModelDefinition> {
    let mut chain = vec![leaf];
    let mut walked = vec![name.to_string()];
    let mut visited: HashSet<String> = HashSet::from([name.to_string()]);

    let mut next = leaf.parent.as_deref();
    while let Some(parent_name) = next {
        if is_builtin(parent_name) {
            break;
        }

        let (key, parent) = catalog.get_model_entry(parent_name).ok_or_else(|| {
            BakerError::ModelNotFound(format!("{} (parent of {})", parent_name, walked.join(" -> ")))
        })?;

        walked.push(key.to_string());
        if !visited.insert(key.to_string()) || chain.len() >= MAX_INHERITANCE_DEPTH {
            return Err(BakerError::CyclicModel { chain: walked });
        }

        chain.push(parent);
        next = parent.parent.as_deref();
    }

    let mut merged = ModelDefinition::new();
    for definition in chain.iter().rev() {
        merge_into(&mut merged, definition);
    }
    merged.parent = None;
    Ok(merged)
}

/// Apply one chain link on top of everything inherited so far.
/// Texture slots merge with the child winning; non-empty child elements
/// replace the inherited list outright.
fn merge_into(merged: &mut ModelDefinition, child: &ModelDefinition) {
    for (slot, value) in &child.textures {
        merged.textures.insert(slot.clone(), value.clone());
    }
    if child.has_elements() {
        merged.elements = child.elements.clone();
    }
}

fn is_builtin(name: &str) -> bool {
    let path = name.split_once(':').map(|(_, p)| p).unwrap_or(name);
    path.starts_with("builtin/")
}

/// Follow `#slot` indirections until a literal path is reached.
pub fn resolve_texture_slot(slot: &str, textures: &BTreeMap<String, String>) -> Result<String> {
    let mut current = slot.trim_start_matches('#');
    let mut seen = HashSet::new();

    for _ in 0..MAX_TEXTURE_HOPS {
        if !seen.insert(current) {
            return Err(BakerError::UnresolvedTexture(format!(
                "#{} refers back to itself",
                slot.trim_start_matches('#')
            )));
        }
        let value = textures
            .get(current)
            .ok_or_else(|| BakerError::UnresolvedTexture(format!("#{}", current)))?;
        match value.strip_prefix('#') {
            Some(next) => current = next,
            None => return Ok(value.clone()),
        }
    }

    Err(BakerError::UnresolvedTexture(format!(
        "#{} exceeds {} hops",
        slot.trim_start_matches('#'),
        MAX_TEXTURE_HOPS
    )))
}

/// Turn a flattened definition into a [`ResolvedModel`]: fall back to a full
/// cube when no elements survived, dereference every texture slot and point
/// every face at a canonical texture name.
///
/// Unresolvable slots and faces are replaced by [`MISSING_TEXTURE`] and
/// counted in the returned model's degradation record.
pub fn finalize(
    catalog: &ModelCatalog,
    name: &str,
    mut flat: ModelDefinition,
    transform: BlockTransform,
    mut degradation: Degradation,
) -> ResolvedModel {
    if !flat.has_elements() {
        let texture = fallback_cube_texture(&flat.textures);
        log::warn!("Model {} has no elements, using a full cube textured by {}", name, texture);
        flat.elements.push(CubeElement::full_cube(&texture));
        degradation.synthesized_cube = true;
    }

    let mut textures = BTreeMap::new();
    for slot in flat.textures.keys() {
        match resolve_texture_slot(slot, &flat.textures) {
            Ok(path) => {
                textures.insert(slot.clone(), catalog.canonicalize_texture_name(&path));
            }
            Err(e) => {
                log::warn!("Model {}: {}", name, e);
                degradation.unresolved_slots += 1;
            }
        }
    }

    for element in &mut flat.elements {
        for face in element.faces.values_mut() {
            let resolved = match face.slot() {
                Some(slot) => textures.get(slot).cloned(),
                None => Some(catalog.canonicalize_texture_name(&face.texture)),
            };
            match resolved {
                Some(texture) => face.texture = texture,
                None => {
                    log::warn!("Model {}: face texture {} is unresolved", name, face.texture);
                    degradation.unresolved_faces += 1;
                    face.texture = MISSING_TEXTURE.to_string();
                }
            }
        }
    }

    ResolvedModel {
        name: name.to_string(),
        textures,
        elements: flat.elements,
        transform,
        degradation,
    }
}

/// Prefer "all", then "side", then "particle", then any slot.
fn fallback_cube_texture(textures: &BTreeMap<String, String>) -> String {
    FALLBACK_CUBE_SLOTS
        .iter()
        .find(|slot| textures.contains_key(**slot))
        .map(|slot| slot.to_string())
        .or_else(|| textures.keys().next().cloned())
        .map(|slot| format!("#{}", slot))
        .unwrap_or_else(|| MISSING_TEXTURE.to_string())
}
