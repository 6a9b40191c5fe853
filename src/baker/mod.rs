//! Geometry baking.
//!
//! Turns a [`ResolvedModel`] into one [`GeometryBuffer`] in block-local
//! space, with the block center at the origin and UVs already remapped into
//! the atlas. Baking is a pure function of the model and the atlas mapping.

mod element;
pub mod geometry;

pub use geometry::{GeometryBuffer, Vertex};

use crate::atlas::TextureAtlasMapping;
use crate::resolver::ResolvedModel;
use crate::types::BlockTransform;
use glam::Mat3;

/// Recoverable problems met while baking one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BakeReport {
    /// Faces emitted.
    pub faces: usize,
    /// Elements dropped for malformed coordinates.
    pub skipped_elements: usize,
    /// Faces drawn with the placeholder rectangle.
    pub missing_textures: usize,
}

/// Baked geometry plus what degraded while producing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakedGeometry {
    pub buffer: GeometryBuffer,
    pub report: BakeReport,
}

/// Bake every element of a model, then rotate the merged result by the
/// model's whole-block transform.
///
/// A malformed element is skipped and counted; the rest still bake.
pub fn bake(model: &ResolvedModel, atlas: &TextureAtlasMapping) -> BakedGeometry {
    let mut report = BakeReport::default();
    let mut buffer = GeometryBuffer::new();

    for (index, cube) in model.elements.iter().enumerate() {
        match element::bake_element(cube, atlas, &mut report) {
            Ok(part) => buffer.merge(&part),
            Err(e) => {
                log::warn!("{}: skipping element {}: {}", model.name, index, e);
                report.skipped_elements += 1;
            }
        }
    }

    if !model.transform.is_identity() {
        buffer.rotate(block_rotation(&model.transform));
    }

    BakedGeometry { buffer, report }
}

/// Whole-block rotation matrix: X first, then Y, both about the block center.
///
/// Angles are negated because block rotations are clockwise (seen from above
/// for Y, from +X for X) while glam rotates counter-clockwise.
pub fn block_rotation(transform: &BlockTransform) -> Mat3 {
    let x_rot = Mat3::from_rotation_x((-transform.x as f32).to_radians());
    let y_rot = Mat3::from_rotation_y((-transform.y as f32).to_radians());
    y_rot * x_rot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasRect;
    use crate::catalog::{CubeElement, FaceSpec};
    use crate::resolver::{Degradation, MISSING_TEXTURE};
    use crate::types::Direction;
    use std::collections::BTreeMap;

    const EPS: f32 = 1e-5;

    fn model(elements: Vec<CubeElement>, transform: BlockTransform) -> ResolvedModel {
        ResolvedModel {
            name: "test".to_string(),
            textures: BTreeMap::new(),
            elements,
            transform,
            degradation: Degradation::default(),
        }
    }

    fn cube(from: [f32; 3], to: [f32; 3], texture: &str) -> CubeElement {
        let mut element = CubeElement::full_cube(texture);
        element.from = from;
        element.to = to;
        element
    }

    fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPS, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_full_cube_spans_unit_box() {
        let m = model(vec![cube([0.0; 3], [16.0; 3], "stone")], BlockTransform::default());
        let baked = bake(&m, &TextureAtlasMapping::default());

        assert_eq!(baked.buffer.bounds(), Some(([-0.5; 3], [0.5; 3])));
        assert_eq!(baked.buffer.face_count(), 6);
        assert_eq!(baked.buffer.vertex_count(), 24);
    }

    #[test]
    fn test_face_uv_maps_into_atlas_rect() {
        let atlas = TextureAtlasMapping::default()
            .with_rect("stone", AtlasRect::new(0.25, 0.5, 0.0625, 0.0625));
        let mut element = cube([0.0; 3], [16.0; 3], "stone");
        element.faces.retain(|dir, _| *dir == Direction::North);

        let baked = bake(&model(vec![element], BlockTransform::default()), &atlas);
        let mut uvs: Vec<[f32; 2]> = baked.buffer.vertices.iter().map(|v| v.uv).collect();
        uvs.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_eq!(
            uvs,
            vec![[0.25, 0.5], [0.25, 0.5625], [0.3125, 0.5], [0.3125, 0.5625]]
        );
    }

    #[test]
    fn test_stone_block_scenario() {
        let rect = AtlasRect::new(0.0, 0.0, 0.1, 0.1);
        let atlas = TextureAtlasMapping::default().with_rect("stone", rect);
        let baked = bake(
            &model(vec![cube([0.0; 3], [16.0; 3], "stone")], BlockTransform::default()),
            &atlas,
        );

        assert_eq!(baked.buffer.face_count(), 6);
        assert!(baked.buffer.vertices.iter().all(|v| rect.contains(v.uv)));
        assert_eq!(baked.report.missing_textures, 0);
        assert_eq!(baked.report.faces, 6);
    }

    #[test]
    fn test_missing_texture_uses_placeholder_and_continues() {
        let missing = AtlasRect::new(0.5, 0.5, 0.5, 0.5);
        let stone = AtlasRect::new(0.0, 0.0, 0.25, 0.25);
        let atlas = TextureAtlasMapping::new(missing).with_rect("stone", stone);

        let mut element = cube([0.0; 3], [16.0; 3], "stone");
        element
            .faces
            .insert(Direction::North, FaceSpec::new(MISSING_TEXTURE).with_uv([0.0, 0.0, 16.0, 16.0]));
        element
            .faces
            .insert(Direction::South, FaceSpec::new("not_in_atlas").with_uv([0.0, 0.0, 16.0, 16.0]));

        let baked = bake(&model(vec![element], BlockTransform::default()), &atlas);
        assert_eq!(baked.buffer.face_count(), 6);
        assert_eq!(baked.report.missing_textures, 2);
        let in_placeholder = baked
            .buffer
            .vertices
            .iter()
            .filter(|v| missing.contains(v.uv))
            .count();
        assert_eq!(in_placeholder, 8);
    }

    #[test]
    fn test_absent_face_emits_nothing() {
        let mut element = cube([0.0; 3], [16.0; 3], "stone");
        element.faces.retain(|dir, _| *dir == Direction::Up);
        let baked = bake(&model(vec![element], BlockTransform::default()), &TextureAtlasMapping::default());
        assert_eq!(baked.buffer.face_count(), 1);
        assert!(baked.buffer.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_malformed_element_is_skipped() {
        let good = cube([0.0; 3], [16.0; 3], "stone");
        let inverted = cube([8.0, 0.0, 0.0], [4.0, 16.0, 16.0], "stone");
        let far = cube([0.0; 3], [64.0, 16.0, 16.0], "stone");
        let nan = cube([f32::NAN, 0.0, 0.0], [16.0; 3], "stone");

        let baked = bake(
            &model(vec![inverted, good, far, nan], BlockTransform::default()),
            &TextureAtlasMapping::default(),
        );
        assert_eq!(baked.report.skipped_elements, 3);
        assert_eq!(baked.buffer.face_count(), 6);
    }

    #[test]
    fn test_zero_thickness_element_is_kept() {
        let decal = cube([0.0, 0.1, 0.0], [16.0, 0.1, 16.0], "rail");
        let baked = bake(&model(vec![decal], BlockTransform::default()), &TextureAtlasMapping::default());
        assert_eq!(baked.report.skipped_elements, 0);
        assert_eq!(baked.buffer.face_count(), 6);
    }

    #[test]
    fn test_bake_is_deterministic() {
        let mut slab = cube([0.0; 3], [16.0, 8.0, 16.0], "stone");
        slab.rotation = Some(crate::types::ElementRotation {
            origin: [8.0, 8.0, 8.0],
            axis: crate::types::Axis::Y,
            angle: 22.5,
            rescale: true,
        });
        let m = model(vec![slab], BlockTransform::new(90, 180, false));
        let atlas = TextureAtlasMapping::default().with_rect("stone", AtlasRect::new(0.0, 0.0, 0.5, 0.5));

        assert_eq!(bake(&m, &atlas), bake(&m, &atlas));
    }

    #[test]
    fn test_y_rotation_turns_north_half_east() {
        let north_half = cube([0.0; 3], [16.0, 16.0, 8.0], "stone");
        let baked = bake(
            &model(vec![north_half], BlockTransform::new(0, 90, false)),
            &TextureAtlasMapping::default(),
        );
        let (min, max) = baked.buffer.bounds().unwrap();
        assert_close(min, [0.0, -0.5, -0.5]);
        assert_close(max, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_whole_model_rotation_applies_x_before_y() {
        let top_half = cube([0.0, 8.0, 0.0], [16.0; 3], "stone");
        let baked = bake(
            &model(vec![top_half], BlockTransform::new(90, 90, false)),
            &TextureAtlasMapping::default(),
        );
        // X carries the top half to the north, then Y carries north to east.
        let (min, max) = baked.buffer.bounds().unwrap();
        assert_close(min, [0.0, -0.5, -0.5]);
        assert_close(max, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_element_rotation_happens_before_block_rotation() {
        let mut post = cube([7.0, 0.0, 0.0], [9.0, 16.0, 2.0], "stone");
        post.rotation = Some(crate::types::ElementRotation {
            origin: [8.0, 8.0, 8.0],
            axis: crate::types::Axis::Y,
            angle: 90.0,
            rescale: false,
        });
        let m = model(vec![post.clone()], BlockTransform::new(0, 90, false));
        let (min, max) = bake(&m, &TextureAtlasMapping::default()).buffer.bounds().unwrap();

        // Element turn (counter-clockwise, north -> west) then block turn
        // (clockwise, west -> north) brings the post back to the north edge.
        post.rotation = None;
        let unrotated = model(vec![post], BlockTransform::default());
        let (ref_min, ref_max) = bake(&unrotated, &TextureAtlasMapping::default())
            .buffer
            .bounds()
            .unwrap();
        assert_close(min, ref_min);
        assert_close(max, ref_max);
    }
}
