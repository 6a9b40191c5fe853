//! Baked geometry buffers.

use glam::{Mat3, Vec3};

/// A vertex of baked geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in block-local space, block center at the origin.
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Atlas-space texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle geometry, one quad (two triangles) per face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffer {
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a quad from four vertices given in order around it.
    /// Triangles are wound (0, 2, 1) and (0, 3, 2).
    pub fn add_quad(&mut self, vertices: [Vertex; 4]) {
        let [i0, i1, i2, i3] = vertices.map(|v| self.add_vertex(v));
        self.add_triangle(i0, i2, i1);
        self.add_triangle(i0, i3, i2);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads, i.e. rendered faces.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append another buffer, keeping both in order.
    pub fn merge(&mut self, other: &GeometryBuffer) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Rotate positions and normals about the origin.
    pub fn rotate(&mut self, rotation: Mat3) {
        for vertex in &mut self.vertices {
            vertex.position = (rotation * Vec3::from(vertex.position)).to_array();
            vertex.normal = (rotation * Vec3::from(vertex.normal)).to_array();
        }
    }

    pub fn translate(&mut self, offset: [f32; 3]) {
        for vertex in &mut self.vertices {
            vertex.position[0] += offset[0];
            vertex.position[1] += offset[1];
            vertex.position[2] += offset[2];
        }
    }

    /// Axis-aligned bounds of all positions, `None` when empty.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(mut min, mut max), v| {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
            (min, max)
        }))
    }

    /// Positions as a flat array.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.uv).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(y: f32) -> [Vertex; 4] {
        let n = [0.0, 1.0, 0.0];
        [
            Vertex::new([0.0, y, 0.0], n, [0.0, 0.0]),
            Vertex::new([1.0, y, 0.0], n, [1.0, 0.0]),
            Vertex::new([1.0, y, 1.0], n, [1.0, 1.0]),
            Vertex::new([0.0, y, 1.0], n, [0.0, 1.0]),
        ]
    }

    #[test]
    fn test_quad_winding() {
        let mut buffer = GeometryBuffer::new();
        buffer.add_quad(quad(0.0));

        assert_eq!(buffer.vertex_count(), 4);
        assert_eq!(buffer.triangle_count(), 2);
        assert_eq!(buffer.face_count(), 1);
        assert_eq!(buffer.indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = GeometryBuffer::new();
        a.add_quad(quad(0.0));
        let mut b = GeometryBuffer::new();
        b.add_quad(quad(1.0));

        a.merge(&b);
        assert_eq!(a.face_count(), 2);
        assert_eq!(&a.indices[6..], &[4, 6, 5, 4, 7, 6]);
        assert_eq!(a.vertices[4].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_bounds_and_translate() {
        let mut buffer = GeometryBuffer::new();
        assert!(buffer.bounds().is_none());
        buffer.add_quad(quad(0.5));
        buffer.translate([1.0, 0.0, -1.0]);
        assert_eq!(buffer.bounds(), Some(([1.0, 0.5, -1.0], [2.0, 0.5, 0.0])));
    }
}
