//! Texture atlas mapping.
//!
//! Baking only reads UV rectangles by canonical texture name. Producing the
//! composited atlas image is the job of an [`AtlasProvider`]; this crate
//! ships [`GridAtlas`], a row packer that lays out rectangles without pixels.

mod builder;

pub use builder::GridAtlas;

use crate::error::Result;
use crate::resolver::MISSING_TEXTURE;
use std::collections::{BTreeMap, BTreeSet};

/// A rectangle in 0-1 atlas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl AtlasRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole atlas.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Map a block-local UV (0-1) into this rectangle.
    pub fn transform_uv(&self, uv: [f32; 2]) -> [f32; 2] {
        [self.x + uv[0] * self.width, self.y + uv[1] * self.height]
    }

    /// Whether an atlas-space UV falls inside this rectangle (edges included).
    pub fn contains(&self, uv: [f32; 2]) -> bool {
        const EPS: f32 = 1e-6;
        uv[0] >= self.x - EPS
            && uv[0] <= self.x + self.width + EPS
            && uv[1] >= self.y - EPS
            && uv[1] <= self.y + self.height + EPS
    }
}

/// Opaque reference to the composited atlas image owned by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AtlasHandle {
    pub id: String,
    /// Pixel size, if the provider knows it.
    pub width: u32,
    pub height: u32,
}

/// Canonical texture name -> rectangle, plus the placeholder rectangle used
/// for every miss. Built once per run and shared read-only by all baking.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAtlasMapping {
    rects: BTreeMap<String, AtlasRect>,
    missing: AtlasRect,
    handle: AtlasHandle,
}

impl TextureAtlasMapping {
    pub fn new(missing: AtlasRect) -> Self {
        Self {
            rects: BTreeMap::new(),
            missing,
            handle: AtlasHandle::default(),
        }
    }

    pub fn with_handle(mut self, handle: AtlasHandle) -> Self {
        self.handle = handle;
        self
    }

    pub fn with_rect(mut self, name: impl Into<String>, rect: AtlasRect) -> Self {
        self.insert(name, rect);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, rect: AtlasRect) {
        self.rects.insert(name.into(), rect);
    }

    pub fn get(&self, name: &str) -> Option<&AtlasRect> {
        self.rects.get(name)
    }

    /// Rectangle for a texture, or the placeholder. The flag is false on a miss.
    pub fn rect_or_missing(&self, name: &str) -> (AtlasRect, bool) {
        if name == MISSING_TEXTURE {
            return (self.missing, false);
        }
        match self.rects.get(name) {
            Some(rect) => (*rect, true),
            None => (self.missing, false),
        }
    }

    pub fn missing_rect(&self) -> AtlasRect {
        self.missing
    }

    pub fn handle(&self) -> &AtlasHandle {
        &self.handle
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn texture_names(&self) -> impl Iterator<Item = &str> {
        self.rects.keys().map(String::as_str)
    }
}

impl Default for TextureAtlasMapping {
    fn default() -> Self {
        Self::new(AtlasRect::full())
    }
}

/// Builds the atlas for a set of canonical texture names.
pub trait AtlasProvider {
    fn build(&self, textures: &BTreeSet<String>) -> Result<TextureAtlasMapping>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_rect_transform() {
        let rect = AtlasRect::new(0.25, 0.5, 0.0625, 0.0625);
        assert_eq!(rect.transform_uv([0.0, 0.0]), [0.25, 0.5]);
        assert_eq!(rect.transform_uv([1.0, 1.0]), [0.3125, 0.5625]);
        assert!(rect.contains([0.3, 0.55]));
        assert!(!rect.contains([0.2, 0.55]));
    }

    #[test]
    fn test_lookup_falls_back_to_placeholder() {
        let missing = AtlasRect::new(0.9, 0.9, 0.1, 0.1);
        let stone = AtlasRect::new(0.0, 0.0, 0.1, 0.1);
        let mapping = TextureAtlasMapping::new(missing).with_rect("stone", stone);

        assert_eq!(mapping.rect_or_missing("stone"), (stone, true));
        assert_eq!(mapping.rect_or_missing("dirt"), (missing, false));
        assert_eq!(mapping.rect_or_missing(MISSING_TEXTURE), (missing, false));
        assert_eq!(mapping.len(), 1);
    }
}
