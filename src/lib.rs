//! # Schematic Baker
//!
//! Resolves Minecraft-style block models and bakes them into instanced
//! geometry for schematic scenes.
//!
//! ## Overview
//!
//! A [`ModelCatalog`] holds the model, block-state and texture-alias tables.
//! For every distinct (block type, state) in a structure the
//! [`ModelResolver`] flattens the model's parent chain and resolves its
//! texture slots, the baker turns the result into one [`GeometryBuffer`]
//! with atlas UVs, and the assembler registers one [`RenderUnit`] per chunk
//! with a translation for each occurrence.
//!
//! ## Quick Start
//!
//! ```ignore
//! use schematic_baker::{
//!     BlockPosition, DecodedStructure, GridAtlas, InMemoryScene, InputBlock, ModelCatalog,
//!     StructureConverter,
//! };
//!
//! let catalog = ModelCatalog::load("path/to/assets")?;
//!
//! let mut structure = DecodedStructure::new();
//! structure.set_block(BlockPosition::new(0, 0, 0), InputBlock::new("minecraft:stone"));
//!
//! let mut scene = InMemoryScene::new();
//! let report = StructureConverter::new(&catalog)
//!     .convert(&structure, &GridAtlas::default(), &mut scene)?;
//! ```
//!
//! ## Lower-level use
//!
//! Resolution and baking can be driven directly:
//!
//! ```ignore
//! use schematic_baker::{bake, ModelResolver, TextureAtlasMapping};
//!
//! let resolver = ModelResolver::new(&catalog);
//! let model = resolver.resolve("minecraft:oak_door", &properties)?;
//! let baked = bake(&model, &TextureAtlasMapping::default());
//! ```

pub mod assembler;
pub mod atlas;
pub mod baker;
pub mod catalog;
pub mod convert;
pub mod error;
pub mod resolver;
pub mod types;

// Re-export main types for convenience
pub use assembler::{assemble, InMemoryScene, Material, RenderUnit, RenderUnitKey, SceneSink};
pub use atlas::{AtlasHandle, AtlasProvider, AtlasRect, GridAtlas, TextureAtlasMapping};
pub use baker::{bake, BakeReport, BakedGeometry, GeometryBuffer, Vertex};
pub use catalog::{BlockStateEntry, CubeElement, FaceSpec, ModelCatalog, ModelDefinition, VariantSpec};
pub use convert::{
    convert_structure, ConversionReport, ConverterConfig, DecodedStructure, StructureConverter,
};
pub use error::{BakerError, Result};
pub use resolver::{BlockFamily, Degradation, ModelResolver, ResolvedModel, MISSING_TEXTURE};
pub use types::{Axis, BlockPosition, BlockTransform, Direction, ElementRotation, InputBlock, StateKey};

/// Load a model catalog from an assets directory.
pub fn load_catalog<P: AsRef<std::path::Path>>(path: P) -> Result<ModelCatalog> {
    ModelCatalog::load(path)
}

/// Load a model catalog from a ZIP archive held in memory.
pub fn load_catalog_from_bytes(data: &[u8]) -> Result<ModelCatalog> {
    ModelCatalog::load_from_bytes(data)
}
