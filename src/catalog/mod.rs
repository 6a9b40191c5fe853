//! Model catalog: the static definition tables and their lookups.
//!
//! The catalog holds three tables, loaded once per process and read-only
//! afterwards:
//! - model definitions by name (parent, texture slots, elements),
//! - block-state entries by block type name (state string -> variant),
//! - texture aliases (raw texture name -> canonical name).

pub mod blockstate;
pub mod loader;
pub mod model;

pub use blockstate::{build_state_string, BlockStateEntry, VariantSpec};
pub use model::{CubeElement, FaceSpec, ModelDefinition};

use std::collections::HashMap;

/// Namespace assumed for names written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Path segments dropped when canonicalizing texture names.
const TEXTURE_PATH_SEGMENTS: [&str; 4] = ["block/", "blocks/", "item/", "items/"];

/// The loaded definition tables.
#[derive(Debug, Default, Clone)]
pub struct ModelCatalog {
    models: HashMap<String, ModelDefinition>,
    block_states: HashMap<String, BlockStateEntry>,
    texture_aliases: HashMap<String, String>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the three tables from an assets directory.
    pub fn load<P: AsRef<std::path::Path>>(assets_dir: P) -> crate::Result<Self> {
        loader::load_from_directory(assets_dir.as_ref())
    }

    /// Load the three tables from a ZIP archive held in memory.
    pub fn load_from_bytes(data: &[u8]) -> crate::Result<Self> {
        loader::load_from_bytes(data)
    }

    /// Build a catalog from the raw JSON text of each table.
    pub fn from_json_tables(models: &str, block_states: &str, texture_aliases: &str) -> crate::Result<Self> {
        loader::parse_tables(models, block_states, texture_aliases)
    }

    pub fn add_model(&mut self, name: impl Into<String>, model: ModelDefinition) {
        self.models.insert(name.into(), model);
    }

    pub fn add_block_state(&mut self, block: impl Into<String>, entry: BlockStateEntry) {
        self.block_states.insert(block.into(), entry);
    }

    pub fn add_texture_alias(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.texture_aliases.insert(raw.into(), canonical.into());
    }

    /// Look up a model definition, trying the name variants in order.
    pub fn get_model_definition(&self, name: &str) -> Option<&ModelDefinition> {
        self.get_model_entry(name).map(|(_, model)| model)
    }

    /// Like [`get_model_definition`](Self::get_model_definition), also returning
    /// the key the definition is stored under.
    pub fn get_model_entry(&self, name: &str) -> Option<(&str, &ModelDefinition)> {
        lookup_candidates(name)
            .into_iter()
            .find_map(|candidate| self.models.get_key_value(candidate.as_str()))
            .map(|(key, model)| (key.as_str(), model))
    }

    /// Look up the block-state entry for a block type.
    pub fn get_block_state_entry(&self, block: &str) -> Option<&BlockStateEntry> {
        lookup_candidates(block)
            .into_iter()
            .find_map(|candidate| self.block_states.get(candidate.as_str()))
    }

    /// Normalize a texture name: drop the namespace, a leading `block/`,
    /// `blocks/`, `item/` or `items/` segment, and anything from a `[`
    /// onwards, then apply the alias table.
    pub fn canonicalize_texture_name(&self, raw: &str) -> String {
        if let Some(alias) = self.texture_aliases.get(raw.trim()) {
            return strip_texture_name(alias);
        }
        let stripped = strip_texture_name(raw);
        match self.texture_aliases.get(&stripped) {
            Some(alias) => strip_texture_name(alias),
            None => stripped,
        }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn block_state_count(&self) -> usize {
        self.block_states.len()
    }

    pub fn texture_alias_count(&self) -> usize {
        self.texture_aliases.len()
    }
}

/// Canonical block type name: no namespace, no inline state, lowercase.
///
/// "minecraft:Oak_Door[half=top]" -> "oak_door"
pub fn canonical_block_name(raw: &str) -> String {
    let without_state = raw.split('[').next().unwrap_or(raw).trim();
    let (_, id) = split_namespace(without_state);
    id.to_lowercase()
}

/// Split "ns:path" into ("ns", "path"); bare paths get the default namespace.
pub fn split_namespace(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or((DEFAULT_NAMESPACE, name))
}

fn strip_texture_name(raw: &str) -> String {
    let without_fragment = raw.split('[').next().unwrap_or(raw).trim();
    let (_, path) = split_namespace(without_fragment);
    TEXTURE_PATH_SEGMENTS
        .iter()
        .find_map(|segment| path.strip_prefix(segment))
        .unwrap_or(path)
        .to_string()
}

/// Names tried for a lookup, in order: literal, lowercased, with a `block/`
/// prefix, with the namespace prefix. Namespaced names additionally fall
/// back to their bare path so "minecraft:block/stone" finds "block/stone".
fn lookup_candidates(name: &str) -> Vec<String> {
    let name = name.trim();
    let mut candidates = vec![
        name.to_string(),
        name.to_lowercase(),
        format!("block/{}", name),
        format!("{}:{}", DEFAULT_NAMESPACE, name),
    ];
    if let Some((_, path)) = name.split_once(':') {
        candidates.push(path.to_string());
        candidates.push(path.to_lowercase());
        candidates.push(format!("block/{}", path.to_lowercase()));
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModelCatalog {
        let mut catalog = ModelCatalog::new();
        catalog.add_model("block/stone", ModelDefinition::with_parent("block/cube_all"));
        catalog.add_model("minecraft:block/dirt", ModelDefinition::new());
        catalog.add_block_state("stone", BlockStateEntry::default());
        catalog.add_texture_alias("grass_top_old", "block/grass_block_top");
        catalog
    }

    #[test]
    fn test_model_lookup_order() {
        let catalog = catalog();
        assert_eq!(catalog.get_model_entry("block/stone").unwrap().0, "block/stone");
        assert_eq!(catalog.get_model_entry("BLOCK/STONE").unwrap().0, "block/stone");
        assert_eq!(catalog.get_model_entry("stone").unwrap().0, "block/stone");
        assert_eq!(catalog.get_model_entry("block/dirt").unwrap().0, "minecraft:block/dirt");
        assert_eq!(catalog.get_model_entry("minecraft:block/stone").unwrap().0, "block/stone");
        assert!(catalog.get_model_definition("block/granite").is_none());
    }

    #[test]
    fn test_block_state_lookup() {
        let catalog = catalog();
        assert!(catalog.get_block_state_entry("stone").is_some());
        assert!(catalog.get_block_state_entry("minecraft:stone").is_some());
        assert!(catalog.get_block_state_entry("Stone").is_some());
        assert!(catalog.get_block_state_entry("granite").is_none());
    }

    #[test]
    fn test_canonicalize_texture_name() {
        let catalog = catalog();
        assert_eq!(catalog.canonicalize_texture_name("minecraft:block/stone"), "stone");
        assert_eq!(catalog.canonicalize_texture_name("blocks/stone"), "stone");
        assert_eq!(catalog.canonicalize_texture_name("item/lantern"), "lantern");
        assert_eq!(catalog.canonicalize_texture_name("items/stick"), "stick");
        assert_eq!(catalog.canonicalize_texture_name("block/redstone_dust[line]"), "redstone_dust");
        assert_eq!(catalog.canonicalize_texture_name("entity/chest/normal"), "entity/chest/normal");
        assert_eq!(catalog.canonicalize_texture_name("grass_top_old"), "grass_block_top");
    }

    #[test]
    fn test_canonical_block_name() {
        assert_eq!(canonical_block_name("minecraft:Oak_Door[half=top]"), "oak_door");
        assert_eq!(canonical_block_name("glass_pane"), "glass_pane");
        assert_eq!(canonical_block_name("mymod:widget"), "widget");
    }

    #[test]
    fn test_split_namespace() {
        assert_eq!(split_namespace("minecraft:block/stone"), ("minecraft", "block/stone"));
        assert_eq!(split_namespace("block/stone"), ("minecraft", "block/stone"));
    }
}
