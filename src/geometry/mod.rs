//! Mesh generation for the menu sphere and the per-item card quad.
//!
//! Every shape shares one vertex/face container ([`Geometry`]); the concrete
//! shapes live in [`shapes`] as constructor functions rather than subtypes.

/// Icosahedron, disc and geodesic sphere constructors.
pub mod shapes;

use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;

/// A single mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Object-space position.
    pub position: Vec3,
    /// Unit normal (zero until a shape assigns one).
    pub normal: Vec3,
    /// Texture coordinate.
    pub uv: Vec2,
}

impl Vertex {
    /// Vertex at `position` with zeroed normal and UV.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
        }
    }
}

/// Triangle referencing three vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// First corner.
    pub a: u32,
    /// Second corner.
    pub b: u32,
    /// Third corner.
    pub c: u32,
}

impl Face {
    /// Triangle over the given indices.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }
}

/// 20-byte card vertex uploaded to the GPU (position + uv).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Vertex list; faces index into it.
    pub vertices: Vec<Vertex>,
    /// Triangle list.
    pub faces: Vec<Face>,
}

impl Geometry {
    /// Empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one vertex per position.
    pub fn add_vertices(&mut self, positions: &[Vec3]) -> &mut Self {
        self.vertices
            .extend(positions.iter().copied().map(Vertex::at));
        self
    }

    /// Append one face per index triple.
    pub fn add_faces(&mut self, faces: &[[u32; 3]]) -> &mut Self {
        self.faces
            .extend(faces.iter().map(|&[a, b, c]| Face::new(a, b, c)));
        self
    }

    /// Split every face into four, `divisions` times.
    ///
    /// Edge midpoints are shared between neighbouring faces: the cache is
    /// keyed on the unordered vertex-index pair and lives for the whole call,
    /// so no position is ever duplicated along a shared edge.
    pub fn subdivide(&mut self, divisions: u32) -> &mut Self {
        let mut cache: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for _ in 0..divisions {
            let mut faces = Vec::with_capacity(self.faces.len() * 4);
            for face in std::mem::take(&mut self.faces) {
                let ab = self.midpoint(face.a, face.b, &mut cache);
                let bc = self.midpoint(face.b, face.c, &mut cache);
                let ca = self.midpoint(face.c, face.a, &mut cache);
                faces.push(Face::new(face.a, ab, ca));
                faces.push(Face::new(face.b, bc, ab));
                faces.push(Face::new(face.c, ca, bc));
                faces.push(Face::new(ab, bc, ca));
            }
            self.faces = faces;
        }
        self
    }

    /// Project every vertex onto a sphere of `radius`.
    ///
    /// The unit direction is kept as the vertex normal; the shader fades
    /// cards by it.
    pub fn spherize(&mut self, radius: f32) -> &mut Self {
        for vertex in &mut self.vertices {
            vertex.normal = vertex.position.normalize_or_zero();
            vertex.position = vertex.normal * radius;
        }
        self
    }

    /// Vertex positions in order.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Flattened 16-bit index list for the GPU index buffer.
    #[must_use]
    pub fn indices(&self) -> Vec<u16> {
        self.faces
            .iter()
            .flat_map(|f| [f.a as u16, f.b as u16, f.c as u16])
            .collect()
    }

    /// Vertices in the GPU upload format.
    #[must_use]
    pub fn gpu_vertices(&self) -> Vec<GpuVertex> {
        self.vertices
            .iter()
            .map(|v| GpuVertex {
                position: v.position.to_array(),
                uv: v.uv.to_array(),
            })
            .collect()
    }

    fn midpoint(
        &mut self,
        a: u32,
        b: u32,
        cache: &mut FxHashMap<(u32, u32), u32>,
    ) -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&index) = cache.get(&key) {
            return index;
        }
        let pa = self.vertices[a as usize].position;
        let pb = self.vertices[b as usize].position;
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::at((pa + pb) * 0.5));
        let _ = cache.insert(key, index);
        index
    }
}
