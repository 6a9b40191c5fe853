//! Per-element face generation.

use super::geometry::{GeometryBuffer, Vertex};
use super::BakeReport;
use crate::atlas::TextureAtlasMapping;
use crate::catalog::{CubeElement, FaceSpec};
use crate::error::Result;
use crate::resolver::MISSING_TEXTURE;
use crate::types::{Axis, Direction, ElementRotation};
use glam::{Mat3, Vec3};

/// Bake one element into its own buffer. Malformed coordinates fail before
/// any face is emitted.
pub(crate) fn bake_element(
    element: &CubeElement,
    atlas: &TextureAtlasMapping,
    report: &mut BakeReport,
) -> Result<GeometryBuffer> {
    element.validate()?;

    let from = element.normalized_from();
    let to = element.normalized_to();
    let rotation = element.rotation.as_ref().map(ElementTransform::new);

    let mut buffer = GeometryBuffer::new();
    for (direction, face) in &element.faces {
        let uv = local_uv(face, *direction, element);
        let (positions, uvs) = face_vertices(*direction, from, to, uv, face.rotation);

        let (rect, found) = atlas.rect_or_missing(&face.texture);
        if !found {
            if face.texture != MISSING_TEXTURE {
                log::warn!("Texture {} is not in the atlas, using placeholder", face.texture);
            }
            report.missing_textures += 1;
        }

        let mut normal = direction.normal();
        let positions = match &rotation {
            Some(transform) => {
                normal = transform.rotate_normal(normal);
                positions.map(|p| transform.apply(p))
            }
            None => positions,
        };

        buffer.add_quad(std::array::from_fn(|i| {
            Vertex::new(positions[i], normal, rect.transform_uv(uvs[i]))
        }));
        report.faces += 1;
    }

    Ok(buffer)
}

/// The face's 0-16 UV rectangle scaled into the texture's own 0-1 space.
fn local_uv(face: &FaceSpec, direction: Direction, element: &CubeElement) -> [f32; 4] {
    face.uv_for(direction, element).map(|c| c / 16.0)
}

/// The 4 corners of a face and their UVs, in order around the quad.
fn face_vertices(
    direction: Direction,
    from: [f32; 3],
    to: [f32; 3],
    uv: [f32; 4],
    rotation: i32,
) -> ([[f32; 3]; 4], [[f32; 2]; 4]) {
    let (u1, v1, u2, v2) = (uv[0], uv[1], uv[2], uv[3]);
    // top-left, top-right, bottom-right, bottom-left
    let uvs = rotate_uvs([[u1, v1], [u2, v1], [u2, v2], [u1, v2]], rotation);

    let positions = match direction {
        Direction::Down => [
            [from[0], from[1], to[2]],
            [to[0], from[1], to[2]],
            [to[0], from[1], from[2]],
            [from[0], from[1], from[2]],
        ],
        Direction::Up => [
            [from[0], to[1], from[2]],
            [to[0], to[1], from[2]],
            [to[0], to[1], to[2]],
            [from[0], to[1], to[2]],
        ],
        Direction::North => [
            [to[0], to[1], from[2]],
            [from[0], to[1], from[2]],
            [from[0], from[1], from[2]],
            [to[0], from[1], from[2]],
        ],
        Direction::South => [
            [from[0], to[1], to[2]],
            [to[0], to[1], to[2]],
            [to[0], from[1], to[2]],
            [from[0], from[1], to[2]],
        ],
        Direction::West => [
            [from[0], to[1], from[2]],
            [from[0], to[1], to[2]],
            [from[0], from[1], to[2]],
            [from[0], from[1], from[2]],
        ],
        Direction::East => [
            [to[0], to[1], to[2]],
            [to[0], to[1], from[2]],
            [to[0], from[1], from[2]],
            [to[0], from[1], to[2]],
        ],
    };

    (positions, uvs)
}

/// Rotate the 4 UV corners by a multiple of 90 degrees.
fn rotate_uvs(uvs: [[f32; 2]; 4], rotation: i32) -> [[f32; 2]; 4] {
    let steps = (rotation / 90).rem_euclid(4);
    let mut result = uvs;
    for _ in 0..steps {
        result = [result[3], result[0], result[1], result[2]];
    }
    result
}

/// An element rotation prepared for applying to many points.
struct ElementTransform {
    origin: Vec3,
    matrix: Mat3,
    scale: Vec3,
}

impl ElementTransform {
    fn new(rotation: &ElementRotation) -> Self {
        let angle = rotation.angle_radians();
        let s = rotation.rescale_factor();
        let (matrix, scale) = match rotation.axis {
            Axis::X => (Mat3::from_rotation_x(angle), Vec3::new(1.0, s, s)),
            Axis::Y => (Mat3::from_rotation_y(angle), Vec3::new(s, 1.0, s)),
            Axis::Z => (Mat3::from_rotation_z(angle), Vec3::new(s, s, 1.0)),
        };
        Self {
            // Same coord / 16 - 0.5 rule as the element corners.
            origin: Vec3::from(rotation.normalized_origin()),
            matrix,
            scale,
        }
    }

    fn apply(&self, position: [f32; 3]) -> [f32; 3] {
        let local = Vec3::from(position) - self.origin;
        ((self.matrix * local) * self.scale + self.origin).to_array()
    }

    fn rotate_normal(&self, normal: [f32; 3]) -> [f32; 3] {
        (self.matrix * Vec3::from(normal)).to_array()
    }
}
