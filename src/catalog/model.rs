//! Model definitions: parent reference, texture slots and cuboid elements.

use crate::error::{BakerError, Result};
use crate::types::{Direction, ElementRotation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coordinates outside this range are rejected as malformed.
const COORD_MIN: f32 = -16.0;
const COORD_MAX: f32 = 32.0;

/// A model definition from the models table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model to inherit elements and texture slots from.
    #[serde(default)]
    pub parent: Option<String>,

    /// Texture slots: literal paths or `#slot` references.
    #[serde(default)]
    pub textures: BTreeMap<String, String>,

    /// Cuboid elements. Empty for marker definitions.
    #[serde(default)]
    pub elements: Vec<CubeElement>,
}

impl ModelDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Default::default()
        }
    }

    pub fn with_texture(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.textures.insert(slot.into(), value.into());
        self
    }

    pub fn has_elements(&self) -> bool {
        !self.elements.is_empty()
    }
}

/// An axis-aligned cuboid in 0-16 block space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeElement {
    pub from: [f32; 3],
    pub to: [f32; 3],
    #[serde(default)]
    pub rotation: Option<ElementRotation>,
    #[serde(default = "default_shade")]
    pub shade: bool,
    /// Rendered faces. A direction missing here emits no geometry.
    #[serde(default)]
    pub faces: BTreeMap<Direction, FaceSpec>,
}

fn default_shade() -> bool {
    true
}

impl CubeElement {
    /// A full 16x16x16 cube with every face sampling the whole texture.
    pub fn full_cube(texture: &str) -> Self {
        let faces = Direction::ALL
            .iter()
            .map(|dir| (*dir, FaceSpec::new(texture).with_uv([0.0, 0.0, 16.0, 16.0])))
            .collect();
        Self {
            from: [0.0, 0.0, 0.0],
            to: [16.0, 16.0, 16.0],
            rotation: None,
            shade: true,
            faces,
        }
    }

    /// Lower corner in centered 0-1 space (`coord / 16 - 0.5`).
    pub fn normalized_from(&self) -> [f32; 3] {
        self.from.map(|c| c / 16.0 - 0.5)
    }

    /// Upper corner in centered 0-1 space (`coord / 16 - 0.5`).
    pub fn normalized_to(&self) -> [f32; 3] {
        self.to.map(|c| c / 16.0 - 0.5)
    }

    /// Reject non-finite, inverted or far out-of-range coordinates.
    ///
    /// Zero-thickness elements are valid (flat decals).
    pub fn validate(&self) -> Result<()> {
        for axis in 0..3 {
            let (from, to) = (self.from[axis], self.to[axis]);
            if !from.is_finite() || !to.is_finite() {
                return Err(BakerError::MalformedElement(format!(
                    "non-finite coordinate on axis {}",
                    axis
                )));
            }
            if from > to {
                return Err(BakerError::MalformedElement(format!(
                    "from {:?} exceeds to {:?}",
                    self.from, self.to
                )));
            }
            if from < COORD_MIN || to > COORD_MAX {
                return Err(BakerError::MalformedElement(format!(
                    "coordinates {:?}..{:?} outside {}..{}",
                    self.from, self.to, COORD_MIN, COORD_MAX
                )));
            }
        }
        if let Some(rotation) = &self.rotation {
            if !rotation.angle.is_finite() || rotation.origin.iter().any(|c| !c.is_finite()) {
                return Err(BakerError::MalformedElement(
                    "non-finite element rotation".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One face of a cuboid element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSpec {
    /// Sub-rectangle `[u0, v0, u1, v1]` of the block's own texture, 0-16 space.
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    /// `#slot` reference or literal path. Holds a canonical texture name
    /// once the model has been resolved.
    pub texture: String,
    /// Hidden-surface hint. Read but never used for culling.
    #[serde(default)]
    pub cullface: Option<Direction>,
    /// UV rotation in degrees (multiple of 90).
    #[serde(default)]
    pub rotation: i32,
    #[serde(default = "default_tint_index")]
    pub tintindex: i32,
}

fn default_tint_index() -> i32 {
    -1
}

impl FaceSpec {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            uv: None,
            texture: texture.into(),
            cullface: None,
            rotation: 0,
            tintindex: -1,
        }
    }

    pub fn with_uv(mut self, uv: [f32; 4]) -> Self {
        self.uv = Some(uv);
        self
    }

    /// Explicit UV, or the rectangle the element's own extent projects onto
    /// this face when none is given.
    pub fn uv_for(&self, direction: Direction, element: &CubeElement) -> [f32; 4] {
        if let Some(uv) = self.uv {
            return uv;
        }
        let [x1, y1, z1] = element.from;
        let [x2, y2, z2] = element.to;
        match direction {
            Direction::Down => [x1, 16.0 - z2, x2, 16.0 - z1],
            Direction::Up => [x1, z1, x2, z2],
            Direction::North => [16.0 - x2, 16.0 - y2, 16.0 - x1, 16.0 - y1],
            Direction::South => [x1, 16.0 - y2, x2, 16.0 - y1],
            Direction::West => [z1, 16.0 - y2, z2, 16.0 - y1],
            Direction::East => [16.0 - z2, 16.0 - y2, 16.0 - z1, 16.0 - y1],
        }
    }

    /// Slot name when the texture is a `#slot` reference.
    pub fn slot(&self) -> Option<&str> {
        self.texture.strip_prefix('#')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_with_parent() {
        let json = r#"{
            "parent": "block/cube_all",
            "textures": { "all": "block/stone" }
        }"#;

        let model: ModelDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(model.parent.as_deref(), Some("block/cube_all"));
        assert_eq!(model.textures.get("all").map(String::as_str), Some("block/stone"));
        assert!(!model.has_elements());
    }

    #[test]
    fn test_parse_element_faces_and_rotation() {
        let json = r##"{
            "from": [7, 0, 7],
            "to": [9, 16, 9],
            "rotation": { "origin": [8, 8, 8], "axis": "y", "angle": 45, "rescale": true },
            "faces": {
                "north": { "uv": [7, 0, 9, 16], "texture": "#pane", "cullface": "north" },
                "up":    { "texture": "#edge", "rotation": 90 }
            }
        }"##;

        let element: CubeElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.faces.len(), 2);
        let north = &element.faces[&Direction::North];
        assert_eq!(north.slot(), Some("pane"));
        assert_eq!(north.cullface, Some(Direction::North));
        assert_eq!(element.faces[&Direction::Up].rotation, 90);
        let rotation = element.rotation.unwrap();
        assert_eq!(rotation.angle, 45.0);
        assert!(rotation.rescale);
    }

    #[test]
    fn test_full_cube_normalized_bounds() {
        let element = CubeElement::full_cube("#all");
        assert_eq!(element.normalized_from(), [-0.5, -0.5, -0.5]);
        assert_eq!(element.normalized_to(), [0.5, 0.5, 0.5]);
        assert_eq!(element.faces.len(), 6);
        assert!(element.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_and_nan() {
        let mut element = CubeElement::full_cube("#all");
        element.from = [10.0, 0.0, 0.0];
        element.to = [4.0, 16.0, 16.0];
        assert!(matches!(element.validate(), Err(BakerError::MalformedElement(_))));

        element.from = [0.0, f32::NAN, 0.0];
        element.to = [16.0, 16.0, 16.0];
        assert!(element.validate().is_err());

        element.from = [0.0, 0.0, 0.0];
        element.to = [16.0, 64.0, 16.0];
        assert!(element.validate().is_err());
    }

    #[test]
    fn test_zero_thickness_is_valid() {
        let mut element = CubeElement::full_cube("#cross");
        element.from = [0.0, 0.0, 8.0];
        element.to = [16.0, 16.0, 8.0];
        assert!(element.validate().is_ok());
    }

    #[test]
    fn test_auto_uv_from_element_extent() {
        let element = CubeElement {
            from: [2.0, 0.0, 4.0],
            to: [14.0, 8.0, 12.0],
            rotation: None,
            shade: true,
            faces: BTreeMap::new(),
        };
        let face = FaceSpec::new("#side");
        assert_eq!(face.uv_for(Direction::Up, &element), [2.0, 4.0, 14.0, 12.0]);
        assert_eq!(face.uv_for(Direction::South, &element), [2.0, 8.0, 14.0, 16.0]);
        assert_eq!(face.uv_for(Direction::North, &element), [2.0, 8.0, 14.0, 16.0]);
        assert_eq!(face.uv_for(Direction::East, &element), [4.0, 8.0, 12.0, 16.0]);

        let explicit = FaceSpec::new("#side").with_uv([0.0, 0.0, 16.0, 16.0]);
        assert_eq!(explicit.uv_for(Direction::Up, &element), [0.0, 0.0, 16.0, 16.0]);
    }
}
