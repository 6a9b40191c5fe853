//! Block state and model resolution.
//!
//! This module turns a block type plus its state properties into a
//! [`ResolvedModel`]: variant selection, parent-chain flattening, texture
//! slot resolution and the composite families handled in [`special`].

pub mod model_resolver;
pub mod special;
pub mod state_resolver;

pub use special::BlockFamily;
pub use state_resolver::{select_variant, VariantSelection};

use crate::catalog::{CubeElement, ModelCatalog};
use crate::error::Result;
use crate::types::{BlockTransform, InputBlock, StateKey};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Texture name every unresolvable face falls back to. The atlas maps it to
/// its placeholder rectangle.
pub const MISSING_TEXTURE: &str = "missingno";

/// A model with inheritance and texture references fully applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    /// Name of the model (or synthesized model) this was built from.
    pub name: String,
    /// Slot name -> canonical texture name.
    pub textures: BTreeMap<String, String>,
    /// Elements whose face textures are canonical texture names.
    pub elements: Vec<CubeElement>,
    /// Whole-model rotation from the blockstate variant.
    pub transform: BlockTransform,
    pub degradation: Degradation,
}

impl ResolvedModel {
    /// Distinct canonical texture names referenced by faces, sorted.
    pub fn face_textures(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .elements
            .iter()
            .flat_map(|e| e.faces.values().map(|f| f.texture.as_str()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Recoverable problems met while resolving one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Degradation {
    /// The exact state combination had no variant of its own.
    pub variant_fallback: bool,
    /// Texture slots whose `#` chain never reached a literal path.
    pub unresolved_slots: usize,
    /// Faces pointed at [`MISSING_TEXTURE`].
    pub unresolved_faces: usize,
    /// No elements survived the chain walk; a full cube was substituted.
    pub synthesized_cube: bool,
}

impl Degradation {
    pub fn is_degraded(&self) -> bool {
        self.variant_fallback
            || self.unresolved_slots > 0
            || self.unresolved_faces > 0
            || self.synthesized_cube
    }
}

/// Resolves block states against a catalog, caching per [`StateKey`].
///
/// One resolver lives for one conversion run. The cache is never invalidated
/// while it lives, since the catalog is read-only.
pub struct ModelResolver<'a> {
    catalog: &'a ModelCatalog,
    cache: RefCell<HashMap<StateKey, Arc<ResolvedModel>>>,
    families: RefCell<HashMap<String, BlockFamily>>,
    hits: Cell<usize>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(catalog: &'a ModelCatalog) -> Self {
        Self {
            catalog,
            cache: RefCell::new(HashMap::new()),
            families: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    pub fn catalog(&self) -> &'a ModelCatalog {
        self.catalog
    }

    /// Resolve a block type name and its state properties.
    pub fn resolve(
        &self,
        block_name: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Arc<ResolvedModel>> {
        let key = StateKey::new(block_name, properties);
        self.resolve_with(&key, properties)
    }

    pub fn resolve_block(&self, block: &InputBlock) -> Result<Arc<ResolvedModel>> {
        self.resolve(&block.name, &block.properties)
    }

    fn resolve_with(
        &self,
        key: &StateKey,
        properties: &HashMap<String, String>,
    ) -> Result<Arc<ResolvedModel>> {
        if let Some(model) = self.cache.borrow().get(key) {
            self.hits.set(self.hits.get() + 1);
            return Ok(Arc::clone(model));
        }

        let model = match self.family(&key.block) {
            BlockFamily::Generic => self.resolve_generic(key)?,
            BlockFamily::HangingFixture(templates) => {
                special::build_fixture(self.catalog, &key.block, &templates, properties)?
            }
            BlockFamily::ConnectedPane(templates) => {
                special::build_pane(self.catalog, &key.block, &templates, properties)?
            }
        };

        let model = Arc::new(model);
        self.cache
            .borrow_mut()
            .insert(key.clone(), Arc::clone(&model));
        Ok(model)
    }

    /// Family for a canonical block name, dispatched once per name.
    pub fn family(&self, block: &str) -> BlockFamily {
        if let Some(family) = self.families.borrow().get(block) {
            return family.clone();
        }
        let family = special::dispatch(block);
        if family != BlockFamily::Generic {
            log::debug!("{} uses special builder {:?}", block, family);
        }
        self.families
            .borrow_mut()
            .insert(block.to_string(), family.clone());
        family
    }

    fn resolve_generic(&self, key: &StateKey) -> Result<ResolvedModel> {
        let mut degradation = Degradation::default();

        let (model_name, transform) = match self.catalog.get_block_state_entry(&key.block) {
            Some(entry) => match select_variant(entry, &key.state) {
                Some(selection) => {
                    if selection.fallback {
                        log::debug!(
                            "{}: no variant for exact state, using \"{}\"",
                            key,
                            selection.key
                        );
                        degradation.variant_fallback = true;
                    }
                    let spec = selection.spec;
                    (
                        spec.model.clone(),
                        BlockTransform::new(spec.x, spec.y, spec.uvlock),
                    )
                }
                None => {
                    log::debug!("{}: block state entry has no variants", key);
                    degradation.variant_fallback = true;
                    (key.block.clone(), BlockTransform::default())
                }
            },
            None => (key.block.clone(), BlockTransform::default()),
        };

        let (stored_name, flat) = match self.catalog.get_model_entry(&model_name) {
            Some((stored, definition)) => (
                stored.to_string(),
                model_resolver::flatten_definition(self.catalog, stored, definition)?,
            ),
            None => return Err(crate::error::BakerError::ModelNotFound(model_name)),
        };

        Ok(model_resolver::finalize(
            self.catalog,
            &stored_name,
            flat,
            transform,
            degradation,
        ))
    }

    /// Number of distinct state keys resolved so far.
    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Number of lookups served from the cache.
    pub fn cache_hits(&self) -> usize {
        self.hits.get()
    }
}
