//! Shared types used throughout the library.

mod direction;
mod transform;

pub use direction::{Axis, Direction};
pub use transform::{BlockTransform, ElementRotation};

use std::collections::HashMap;
use std::fmt;

/// A block position in the structure grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate of the cubic chunk holding this position.
    pub fn chunk(&self, chunk_size: i32) -> (i32, i32, i32) {
        let size = chunk_size.max(1);
        (
            self.x.div_euclid(size),
            self.y.div_euclid(size),
            self.z.div_euclid(size),
        )
    }

    /// World-space center of the block, which is where baked geometry is anchored.
    pub fn center(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

/// A palette entry: block type name plus its state properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBlock {
    /// Block name, e.g. "minecraft:lantern".
    pub name: String,
    /// State properties, e.g. {"hanging": "true"}.
    pub properties: HashMap<String, String>,
}

impl InputBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.properties.insert(key.into(), value.to_string());
        self
    }

    /// Block ID without namespace ("minecraft:stone" -> "stone").
    pub fn block_id(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, id)| id)
            .unwrap_or(&self.name)
    }

    pub fn is_air(&self) -> bool {
        matches!(self.block_id(), "air" | "cave_air" | "void_air")
    }

    /// Read a boolean state property; anything but "true" is false.
    pub fn flag(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Identity of a distinct (block type, state) combination.
///
/// Both parts are canonical: the block name has no namespace or inline state
/// and is lowercase, the state string is sorted `key=value` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub block: String,
    pub state: String,
}

impl StateKey {
    pub fn new(block_name: &str, properties: &HashMap<String, String>) -> Self {
        Self {
            block: crate::catalog::canonical_block_name(block_name),
            state: crate::catalog::build_state_string(properties),
        }
    }

    pub fn for_block(block: &InputBlock) -> Self {
        Self::new(&block.name, &block.properties)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.state.is_empty() {
            write!(f, "{}", self.block)
        } else {
            write!(f, "{}[{}]", self.block, self.state)
        }
    }
}
