//! Whole-model and per-element rotations.

use super::Axis;
use serde::{Deserialize, Serialize};

/// Whole-model rotation taken from a blockstate variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlockTransform {
    /// X rotation in degrees (0, 90, 180, 270).
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    pub y: i32,
    /// Whether UVs stay fixed in world space while the model rotates.
    pub uvlock: bool,
}

impl BlockTransform {
    pub fn new(x: i32, y: i32, uvlock: bool) -> Self {
        Self { x, y, uvlock }
    }

    pub fn is_identity(&self) -> bool {
        self.x.rem_euclid(360) == 0 && self.y.rem_euclid(360) == 0
    }
}

/// Rotation of a single cuboid element around one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRotation {
    /// Pivot point in the 0-16 block space.
    #[serde(default = "default_origin")]
    pub origin: [f32; 3],
    pub axis: Axis,
    /// Degrees, conventionally one of -45, -22.5, 0, 22.5, 45.
    pub angle: f32,
    /// Stretch the rotated element back to the block grid.
    #[serde(default)]
    pub rescale: bool,
}

fn default_origin() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

impl ElementRotation {
    /// Pivot converted with the same `coord / 16 - 0.5` rule as element corners.
    pub fn normalized_origin(&self) -> [f32; 3] {
        [
            self.origin[0] / 16.0 - 0.5,
            self.origin[1] / 16.0 - 0.5,
            self.origin[2] / 16.0 - 0.5,
        ]
    }

    pub fn angle_radians(&self) -> f32 {
        self.angle.to_radians()
    }

    /// Scale applied on the two axes perpendicular to the rotation axis.
    pub fn rescale_factor(&self) -> f32 {
        let cos = self.angle_radians().cos();
        if self.rescale && cos.abs() > f32::EPSILON {
            1.0 / cos
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_origin_uses_block_center_rule() {
        let rotation = ElementRotation {
            origin: [8.0, 0.0, 16.0],
            axis: Axis::Y,
            angle: 45.0,
            rescale: false,
        };
        assert_eq!(rotation.normalized_origin(), [0.0, -0.5, 0.5]);
        assert_eq!(rotation.rescale_factor(), 1.0);
    }

    #[test]
    fn test_rescale_factor() {
        let rotation = ElementRotation {
            origin: [8.0, 8.0, 8.0],
            axis: Axis::Z,
            angle: 45.0,
            rescale: true,
        };
        assert!((rotation.rescale_factor() - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_identity_transform() {
        assert!(BlockTransform::default().is_identity());
        assert!(BlockTransform::new(360, 0, false).is_identity());
        assert!(!BlockTransform::new(0, 90, false).is_identity());
    }
}
