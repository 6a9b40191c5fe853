//! Structure conversion: group blocks, resolve, bake and assemble.
//!
//! One call to [`StructureConverter::convert`] is one conversion run. It owns
//! a fresh [`ModelResolver`] (and so a fresh cache) and a single atlas
//! mapping, both dropped when the run ends.

use crate::assembler::{assemble, Material, RenderUnitKey, SceneSink};
use crate::atlas::{AtlasProvider, TextureAtlasMapping};
use crate::baker::{bake, BakedGeometry};
use crate::catalog::ModelCatalog;
use crate::error::Result;
use crate::resolver::{ModelResolver, ResolvedModel};
use crate::types::{BlockPosition, InputBlock, StateKey};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Edge length of the cubic chunks render units are split by.
    pub chunk_size: i32,
    /// Include air blocks in output.
    pub include_air: bool,
    /// Bake distinct block states on the rayon pool. Only takes effect with
    /// the `parallel` feature.
    pub parallel_bake: bool,
    /// Name given to the shared block material.
    pub material_name: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            include_air: false,
            parallel_bake: true,
            material_name: "blocks".to_string(),
        }
    }
}

impl ConverterConfig {
    pub fn with_chunk_size(mut self, chunk_size: i32) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_include_air(mut self, include_air: bool) -> Self {
        self.include_air = include_air;
        self
    }

    pub fn with_parallel_bake(mut self, parallel_bake: bool) -> Self {
        self.parallel_bake = parallel_bake;
        self
    }

    pub fn with_material_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }
}

/// A structure already decoded into a palette and indexed positions.
#[derive(Debug, Clone, Default)]
pub struct DecodedStructure {
    pub palette: Vec<InputBlock>,
    /// (palette index, position) per block.
    pub blocks: Vec<(usize, BlockPosition)>,
}

impl DecodedStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a palette entry and return its index.
    pub fn add_palette_entry(&mut self, block: InputBlock) -> usize {
        self.palette.push(block);
        self.palette.len() - 1
    }

    pub fn add_block(&mut self, palette_index: usize, position: BlockPosition) {
        self.blocks.push((palette_index, position));
    }

    /// Place a block, reusing an identical palette entry when present.
    pub fn set_block(&mut self, position: BlockPosition, block: InputBlock) {
        let index = match self.palette.iter().position(|b| *b == block) {
            Some(index) => index,
            None => self.add_palette_entry(block),
        };
        self.add_block(index, position);
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// What a conversion run produced and how much of it degraded.
///
/// A run with non-zero degradation counters is still a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub blocks_total: usize,
    pub blocks_converted: usize,
    pub air_skipped: usize,
    /// Blocks in skipped groups plus blocks with an invalid palette index.
    pub blocks_skipped: usize,
    /// Blocks whose model or geometry degraded in any way.
    pub blocks_degraded: usize,
    pub distinct_states: usize,
    /// Distinct states dropped because no model matched.
    pub skipped_groups: usize,
    pub render_units: usize,
    pub replaced_units: usize,
    pub variant_fallbacks: usize,
    pub unresolved_slots: usize,
    pub unresolved_faces: usize,
    pub synthesized_cubes: usize,
    pub skipped_elements: usize,
    pub missing_textures: usize,
    pub faces: usize,
}

impl ConversionReport {
    pub fn is_degraded(&self) -> bool {
        self.blocks_degraded > 0 || self.blocks_skipped > 0
    }
}

/// Occurrences of one distinct block state, split by chunk.
struct BlockGroup {
    palette_index: usize,
    chunks: BTreeMap<(i32, i32, i32), Vec<[f32; 3]>>,
    count: usize,
}

/// Converts decoded structures against one catalog.
pub struct StructureConverter<'a> {
    catalog: &'a ModelCatalog,
    config: ConverterConfig,
}

impl<'a> StructureConverter<'a> {
    pub fn new(catalog: &'a ModelCatalog) -> Self {
        Self {
            catalog,
            config: ConverterConfig::default(),
        }
    }

    pub fn with_config(catalog: &'a ModelCatalog, config: ConverterConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a structure and register one render unit per
    /// (chunk, block type, state) with the scene.
    ///
    /// Fatal errors (cyclic inheritance, atlas failure) abort the run. Block
    /// states with no matching model are skipped and counted.
    pub fn convert<S: SceneSink>(
        &self,
        structure: &DecodedStructure,
        atlas: &dyn AtlasProvider,
        scene: &mut S,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport {
            blocks_total: structure.block_count(),
            ..Default::default()
        };

        let groups = self.group_blocks(structure, &mut report);
        report.distinct_states = groups.len();

        let resolver = ModelResolver::new(self.catalog);
        let mut resolved: Vec<(StateKey, Arc<ResolvedModel>, BlockGroup)> = Vec::new();
        for (key, group) in groups {
            let block = &structure.palette[group.palette_index];
            match resolver.resolve_block(block) {
                Ok(model) => resolved.push((key, model, group)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping {} ({} blocks): {}", key, group.count, e);
                    report.skipped_groups += 1;
                    report.blocks_skipped += group.count;
                }
            }
        }
        log::debug!(
            "Resolved {} states, {} cache hits",
            resolver.cached_count(),
            resolver.cache_hits()
        );

        let textures: BTreeSet<String> = resolved
            .iter()
            .flat_map(|(_, model, _)| model.face_textures())
            .map(str::to_string)
            .collect();
        let mapping = atlas.build(&textures)?;
        let material = Material::new(self.config.material_name.as_str(), mapping.handle().clone());

        let baked = self.bake_all(&resolved, &mapping);

        for ((key, model, group), geometry) in resolved.into_iter().zip(baked) {
            let degradation = model.degradation;
            let bake_report = geometry.report;

            report.variant_fallbacks += usize::from(degradation.variant_fallback);
            report.synthesized_cubes += usize::from(degradation.synthesized_cube);
            report.unresolved_slots += degradation.unresolved_slots;
            report.unresolved_faces += degradation.unresolved_faces;
            report.skipped_elements += bake_report.skipped_elements;
            report.missing_textures += bake_report.missing_textures;
            report.faces += bake_report.faces * group.count;
            if degradation.is_degraded()
                || bake_report.skipped_elements > 0
                || bake_report.missing_textures > 0
            {
                report.blocks_degraded += group.count;
            }

            let buffer = Arc::new(geometry.buffer);
            for (chunk, positions) in group.chunks {
                let unit = assemble(
                    RenderUnitKey::new(chunk, key.clone()),
                    Arc::clone(&buffer),
                    material.clone(),
                    &positions,
                );
                report.render_units += 1;
                if scene.register(unit).is_some() {
                    report.replaced_units += 1;
                }
            }
            report.blocks_converted += group.count;
        }

        log::info!(
            "Converted {}/{} blocks into {} render units ({} states, {} skipped, {} degraded)",
            report.blocks_converted,
            report.blocks_total,
            report.render_units,
            report.distinct_states,
            report.blocks_skipped,
            report.blocks_degraded
        );

        Ok(report)
    }

    /// Group block occurrences by state key, then by chunk.
    fn group_blocks(
        &self,
        structure: &DecodedStructure,
        report: &mut ConversionReport,
    ) -> BTreeMap<StateKey, BlockGroup> {
        let keys: Vec<StateKey> = structure.palette.iter().map(StateKey::for_block).collect();
        let mut groups: BTreeMap<StateKey, BlockGroup> = BTreeMap::new();

        for (index, position) in &structure.blocks {
            let Some(block) = structure.palette.get(*index) else {
                log::warn!("Block at {:?} has invalid palette index {}", position, index);
                report.blocks_skipped += 1;
                continue;
            };
            if !self.config.include_air && block.is_air() {
                report.air_skipped += 1;
                continue;
            }

            let group = groups
                .entry(keys[*index].clone())
                .or_insert_with(|| BlockGroup {
                    palette_index: *index,
                    chunks: BTreeMap::new(),
                    count: 0,
                });
            group
                .chunks
                .entry(position.chunk(self.config.chunk_size))
                .or_default()
                .push(position.center());
            group.count += 1;
        }

        groups
    }

    fn bake_all(
        &self,
        resolved: &[(StateKey, Arc<ResolvedModel>, BlockGroup)],
        mapping: &TextureAtlasMapping,
    ) -> Vec<BakedGeometry> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel_bake {
                use rayon::prelude::*;
                return resolved
                    .par_iter()
                    .map(|(_, model, _)| bake(model, mapping))
                    .collect();
            }
        }

        resolved
            .iter()
            .map(|(_, model, _)| bake(model, mapping))
            .collect()
    }
}

/// Group, resolve, bake and register in one call with default settings.
pub fn convert_structure<S: SceneSink>(
    catalog: &ModelCatalog,
    structure: &DecodedStructure,
    atlas: &dyn AtlasProvider,
    scene: &mut S,
) -> Result<ConversionReport> {
    StructureConverter::new(catalog).convert(structure, atlas, scene)
}
