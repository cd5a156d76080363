//! Mesh geometry
//!
//! CPU-side vertex and index data plus the local-space bounds scene nodes
//! derive their boxes from. Decoding model files is left to the caller; the
//! procedural primitives here cover the demo scene and tests.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{constants, Vec3};
use crate::scene::aabb::AABB;

/// Interleaved vertex layout
///
/// `#[repr(C)]` and `Pod` so a slice of vertices can be handed to a back end
/// as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Unit normal
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Triangle mesh with precomputed local bounds
#[derive(Debug, Clone)]
pub struct MeshData {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounds: AABB,
}

impl MeshData {
    /// Create a mesh; bounds are computed from the vertex positions
    ///
    /// An empty vertex list yields a zero-size box at the origin.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let positions: Vec<Vec3> = vertices.iter().map(|v| Vec3::from(v.position)).collect();
        let bounds = AABB::from_points(positions.iter())
            .unwrap_or_else(|| AABB::new(Vec3::zeros(), Vec3::zeros()));
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    /// Cube spanning [-1, 1] on every axis
    ///
    /// Four vertices per face so every face gets its own flat normal.
    pub fn cube() -> Self {
        // (outward normal, u axis, v axis) with u x v = normal
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        const QUAD: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in FACES {
            let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
            let base = vertices.len() as u32;
            for (su, sv) in QUAD {
                let position = n + u * su + v * sv;
                let tex_coord = [(su + 1.0) * 0.5, (sv + 1.0) * 0.5];
                vertices.push(Vertex::new(position.into(), normal, tex_coord));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new(vertices, indices)
    }

    /// Latitude/longitude sphere centred on the origin
    ///
    /// `rings` is raised to at least 2 and `sectors` to at least 3. The seam
    /// column is duplicated so texture coordinates wrap cleanly.
    pub fn uv_sphere(radius: f32, rings: u32, sectors: u32) -> Self {
        let rings = rings.max(2);
        let sectors = sectors.max(3);

        let mut vertices = Vec::with_capacity(((rings + 1) * (sectors + 1)) as usize);
        for r in 0..=rings {
            let v = r as f32 / rings as f32;
            let phi = constants::PI * v;
            for s in 0..=sectors {
                let u = s as f32 / sectors as f32;
                let theta = 2.0 * constants::PI * u;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                vertices.push(Vertex::new((normal * radius).into(), normal.into(), [u, v]));
            }
        }

        let stride = sectors + 1;
        let mut indices = Vec::with_capacity((rings * sectors * 6) as usize);
        for r in 0..rings {
            for s in 0..sectors {
                let a = r * stride + s;
                let b = a + stride;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }

        Self::new(vertices, indices)
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Local-space bounds
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_mesh_structure() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices().len(), 24);
        assert_eq!(cube.indices().len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertex_bytes().len(), 24 * std::mem::size_of::<Vertex>());

        assert_relative_eq!(cube.bounds().min, Vec3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(cube.bounds().max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_cube_normals_point_outward() {
        for vertex in MeshData::cube().vertices() {
            let position = Vec3::from(vertex.position);
            let normal = Vec3::from(vertex.normal);
            assert_relative_eq!(normal.norm(), 1.0);
            assert!(position.dot(&normal) > 0.0);
        }
    }

    #[test]
    fn test_sphere_counts_and_bounds() {
        let sphere = MeshData::uv_sphere(2.0, 8, 16);
        assert_eq!(sphere.vertices().len(), 9 * 17);
        assert_eq!(sphere.indices().len(), 8 * 16 * 6);
        assert!(sphere.indices().iter().all(|i| (*i as usize) < sphere.vertices().len()));

        assert_relative_eq!(sphere.bounds().max.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(sphere.bounds().min.y, -2.0, epsilon = 1e-5);
        assert_relative_eq!(sphere.bounds().max.x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_minimum_resolution() {
        let sphere = MeshData::uv_sphere(1.0, 0, 1);
        assert_eq!(sphere.vertices().len(), 3 * 4);
        assert_eq!(sphere.triangle_count(), 2 * 3 * 2);
    }

    #[test]
    fn test_empty_mesh_bounds() {
        let mesh = MeshData::new(Vec::new(), Vec::new());
        assert_eq!(mesh.bounds().extents(), Vec3::zeros());
    }
}
