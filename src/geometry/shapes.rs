//! Concrete shapes built on [`Geometry`].

use glam::{Vec2, Vec3};

use super::Geometry;

/// Card width relative to the disc radius.
const DISC_WIDTH: f32 = 1.15;
/// Card height relative to the disc radius.
const DISC_HEIGHT: f32 = 0.78;

/// The 20 icosahedron faces over the golden-ratio vertex layout.
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

impl Geometry {
    /// Regular icosahedron (12 vertices, 20 faces) from the three
    /// orthogonal golden rectangles.
    #[must_use]
    pub fn icosahedron() -> Self {
        let t = 5.0_f32.sqrt() * 0.5 + 0.5;
        let mut geometry = Self::new();
        let _ = geometry
            .add_vertices(&[
                Vec3::new(-1.0, t, 0.0),
                Vec3::new(1.0, t, 0.0),
                Vec3::new(-1.0, -t, 0.0),
                Vec3::new(1.0, -t, 0.0),
                Vec3::new(0.0, -1.0, t),
                Vec3::new(0.0, 1.0, t),
                Vec3::new(0.0, -1.0, -t),
                Vec3::new(0.0, 1.0, -t),
                Vec3::new(t, 0.0, -1.0),
                Vec3::new(t, 0.0, 1.0),
                Vec3::new(-t, 0.0, -1.0),
                Vec3::new(-t, 0.0, 1.0),
            ])
            .add_faces(&ICOSAHEDRON_FACES);
        geometry
    }

    /// Icosahedron subdivided `divisions` times and projected onto a sphere
    /// of `radius`.
    #[must_use]
    pub fn geodesic_sphere(divisions: u32, radius: f32) -> Self {
        let mut geometry = Self::icosahedron();
        let _ = geometry.subdivide(divisions).spherize(radius);
        geometry
    }

    /// Flat card quad in the XY plane, wider than tall, facing +Z.
    #[must_use]
    pub fn disc(radius: f32) -> Self {
        let w = radius * DISC_WIDTH;
        let h = radius * DISC_HEIGHT;
        let mut geometry = Self::new();
        let _ = geometry
            .add_vertices(&[
                Vec3::new(-w, -h, 0.0),
                Vec3::new(w, -h, 0.0),
                Vec3::new(w, h, 0.0),
                Vec3::new(-w, h, 0.0),
            ])
            .add_faces(&[[0, 1, 2], [0, 2, 3]]);
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        for (vertex, uv) in geometry.vertices.iter_mut().zip(uvs) {
            vertex.uv = uv;
            vertex.normal = Vec3::Z;
        }
        geometry
    }
}

/// Vertex count of an icosahedron after `divisions` subdivisions.
#[must_use]
pub const fn geodesic_vertex_count(divisions: u32) -> usize {
    12 + 30 * (4_usize.pow(divisions) - 1) / 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icosahedron_has_twelve_vertices_and_twenty_faces() {
        let ico = Geometry::icosahedron();
        assert_eq!(ico.vertices.len(), 12);
        assert_eq!(ico.faces.len(), 20);
    }

    #[test]
    fn subdivision_counts_match_geodesic_formula() {
        for d in 0..=3 {
            let sphere = Geometry::geodesic_sphere(d, 2.0);
            assert_eq!(
                sphere.vertices.len(),
                geodesic_vertex_count(d),
                "vertex count for d = {d}"
            );
            assert_eq!(sphere.faces.len(), 20 * 4_usize.pow(d));
        }
        assert_eq!(geodesic_vertex_count(1), 42);
        assert_eq!(geodesic_vertex_count(3), 642);
    }

    #[test]
    fn two_divisions_share_every_edge_midpoint() {
        let mut once = Geometry::icosahedron();
        let _ = once.subdivide(2);
        assert_eq!(once.vertices.len(), 162);
        assert_eq!(once.faces.len(), 320);
    }

    #[test]
    fn spherize_puts_every_vertex_on_the_radius() {
        let sphere = Geometry::geodesic_sphere(2, 2.0);
        for v in &sphere.vertices {
            assert!((v.position.length() - 2.0).abs() < 1e-5);
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
            assert!((v.normal * 2.0 - v.position).length() < 1e-5);
        }
    }

    #[test]
    fn faces_reference_existing_vertices() {
        let sphere = Geometry::geodesic_sphere(3, 1.0);
        let n = sphere.vertices.len() as u32;
        assert!(sphere
            .faces
            .iter()
            .all(|f| f.a < n && f.b < n && f.c < n));
    }

    #[test]
    fn disc_is_a_wide_quad_with_unit_uvs() {
        let disc = Geometry::disc(1.0);
        assert_eq!(disc.vertices.len(), 4);
        assert_eq!(disc.indices(), vec![0, 1, 2, 0, 2, 3]);
        let p = disc.positions();
        let width = p[1].x - p[0].x;
        let height = p[2].y - p[1].y;
        assert!(width > height);
        assert_eq!(disc.vertices[0].uv, Vec2::ZERO);
        assert_eq!(disc.vertices[2].uv, Vec2::ONE);
        let gpu = disc.gpu_vertices();
        assert_eq!(gpu[3].uv, [0.0, 1.0]);
        assert_eq!(size_of_val(&gpu[0]), 20);
    }
}
