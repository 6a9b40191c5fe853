//! Catalog loading from a directory or a ZIP archive.

use super::{BlockStateEntry, ModelCatalog, ModelDefinition};
use crate::error::{BakerError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub const MODELS_TABLE: &str = "models.json";
pub const BLOCK_STATES_TABLE: &str = "blockstates.json";
pub const TEXTURES_TABLE: &str = "textures.json";

/// Load the three tables from files directly inside `dir`.
pub fn load_from_directory(dir: &Path) -> Result<ModelCatalog> {
    if !dir.is_dir() {
        return Err(BakerError::MissingTable(format!(
            "assets directory {} does not exist",
            dir.display()
        )));
    }

    let read_table = |name: &str| -> Result<String> {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(BakerError::MissingTable(name.to_string()));
        }
        Ok(std::fs::read_to_string(path)?)
    };

    let models = read_table(MODELS_TABLE)?;
    let block_states = read_table(BLOCK_STATES_TABLE)?;
    let textures = read_table(TEXTURES_TABLE)?;

    parse_tables(&models, &block_states, &textures)
}

/// Load the three tables from a ZIP archive. Each table may sit at any depth;
/// the first entry with a matching file name wins.
pub fn load_from_bytes(data: &[u8]) -> Result<ModelCatalog> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut tables: HashMap<&'static str, String> = HashMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let file_name = file.name().rsplit('/').next().unwrap_or_default().to_string();
        let table = match file_name.as_str() {
            MODELS_TABLE => MODELS_TABLE,
            BLOCK_STATES_TABLE => BLOCK_STATES_TABLE,
            TEXTURES_TABLE => TEXTURES_TABLE,
            _ => continue,
        };
        if tables.contains_key(table) {
            continue;
        }

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        tables.insert(table, contents);
    }

    let take = |tables: &mut HashMap<&'static str, String>, name: &'static str| {
        tables
            .remove(name)
            .ok_or_else(|| BakerError::MissingTable(name.to_string()))
    };
    let models = take(&mut tables, MODELS_TABLE)?;
    let block_states = take(&mut tables, BLOCK_STATES_TABLE)?;
    let textures = take(&mut tables, TEXTURES_TABLE)?;

    parse_tables(&models, &block_states, &textures)
}

/// Parse the raw JSON text of the three tables into a catalog.
pub fn parse_tables(models: &str, block_states: &str, textures: &str) -> Result<ModelCatalog> {
    let models: HashMap<String, ModelDefinition> = parse_table(MODELS_TABLE, models)?;
    let block_states: HashMap<String, BlockStateEntry> = parse_table(BLOCK_STATES_TABLE, block_states)?;
    let aliases: HashMap<String, String> = parse_table(TEXTURES_TABLE, textures)?;

    let mut catalog = ModelCatalog::new();
    for (name, model) in models {
        catalog.add_model(name, model);
    }
    for (block, entry) in block_states {
        catalog.add_block_state(block, entry);
    }
    for (raw, canonical) in aliases {
        catalog.add_texture_alias(raw, canonical);
    }

    log::info!(
        "Loaded model catalog: {} models, {} block states, {} texture aliases",
        catalog.model_count(),
        catalog.block_state_count(),
        catalog.texture_alias_count()
    );

    Ok(catalog)
}

fn parse_table<T: serde::de::DeserializeOwned>(table: &str, contents: &str) -> Result<T> {
    serde_json::from_str(contents).map_err(|source| BakerError::InvalidTable {
        table: table.to_string(),
        source,
    })
}
