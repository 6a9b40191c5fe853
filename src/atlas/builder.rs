//! Atlas layout using simple row packing.

use super::{AtlasHandle, AtlasProvider, AtlasRect, TextureAtlasMapping};
use crate::error::{BakerError, Result};
use crate::resolver::MISSING_TEXTURE;
use std::collections::{BTreeSet, HashMap};

/// Lays textures out in rows of a square, power-of-two atlas.
///
/// Only the layout is computed. Textures default to `tile_size` pixels square
/// unless a size is registered with [`with_texture_size`](Self::with_texture_size).
/// The placeholder texture is always packed.
#[derive(Debug, Clone)]
pub struct GridAtlas {
    max_size: u32,
    padding: u32,
    tile_size: u32,
    sizes: HashMap<String, (u32, u32)>,
}

impl GridAtlas {
    pub fn new(max_size: u32, padding: u32) -> Self {
        Self {
            max_size,
            padding,
            tile_size: 16,
            sizes: HashMap::new(),
        }
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    pub fn with_texture_size(mut self, name: impl Into<String>, width: u32, height: u32) -> Self {
        self.sizes.insert(name.into(), (width.max(1), height.max(1)));
        self
    }

    fn size_of(&self, name: &str) -> (u32, u32) {
        self.sizes
            .get(name)
            .copied()
            .unwrap_or((self.tile_size, self.tile_size))
    }
}

impl Default for GridAtlas {
    fn default() -> Self {
        Self::new(4096, 0)
    }
}

impl AtlasProvider for GridAtlas {
    fn build(&self, textures: &BTreeSet<String>) -> Result<TextureAtlasMapping> {
        let padding = self.padding;

        // Tallest first, then by name so the layout is reproducible.
        let mut entries: Vec<(&str, (u32, u32))> = textures
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(MISSING_TEXTURE))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|name| (name, self.size_of(name)))
            .collect();
        entries.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then_with(|| a.0.cmp(b.0)));

        let total_area: u64 = entries
            .iter()
            .map(|(_, (w, h))| u64::from(w + padding * 2) * u64::from(h + padding * 2))
            .sum();
        let min_size = (total_area as f64).sqrt().ceil() as u32;
        let mut atlas_size = 64u32;
        while atlas_size < min_size && atlas_size < self.max_size {
            atlas_size *= 2;
        }

        loop {
            if atlas_size > self.max_size {
                return Err(BakerError::AtlasBuild(format!(
                    "Failed to pack {} textures into {}x{} atlas",
                    entries.len(),
                    self.max_size,
                    self.max_size
                )));
            }

            if let Some(placed) = try_pack(&entries, atlas_size, padding) {
                let missing = placed
                    .iter()
                    .find(|(name, _)| *name == MISSING_TEXTURE)
                    .map(|(_, rect)| *rect)
                    .unwrap_or_else(AtlasRect::full);
                let mut result = TextureAtlasMapping::new(missing).with_handle(AtlasHandle {
                    id: format!("grid-{}x{}", atlas_size, atlas_size),
                    width: atlas_size,
                    height: atlas_size,
                });
                for (name, rect) in placed {
                    if name != MISSING_TEXTURE {
                        result.insert(name, rect);
                    }
                }
                log::debug!(
                    "Packed {} textures into {}x{} atlas",
                    result.len(),
                    atlas_size,
                    atlas_size
                );
                return Ok(result);
            }

            atlas_size *= 2;
        }
    }
}

/// Try to place every entry in an atlas of the given size.
fn try_pack<'a>(
    entries: &[(&'a str, (u32, u32))],
    atlas_size: u32,
    padding: u32,
) -> Option<Vec<(&'a str, AtlasRect)>> {
    let scale = atlas_size as f32;
    let mut placed = Vec::with_capacity(entries.len());

    let mut current_x = 0u32;
    let mut current_y = 0u32;
    let mut row_height = 0u32;

    for (name, (width, height)) in entries {
        let tex_width = width + padding * 2;
        let tex_height = height + padding * 2;

        if current_x + tex_width > atlas_size {
            current_x = 0;
            current_y += row_height;
            row_height = 0;
        }
        if current_y + tex_height > atlas_size || tex_width > atlas_size {
            return None;
        }

        let x = current_x + padding;
        let y = current_y + padding;
        placed.push((
            *name,
            AtlasRect::new(
                x as f32 / scale,
                y as f32 / scale,
                *width as f32 / scale,
                *height as f32 / scale,
            ),
        ));

        current_x += tex_width;
        row_height = row_height.max(tex_height);
    }

    Some(placed)
}
