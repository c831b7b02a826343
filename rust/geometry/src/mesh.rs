// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and per-element mesh building

use crate::error::{Error, Result};
use crate::flatten::Triangle;
use crate::transform::source_to_target;
use nalgebra::{Point3, Vector3};

/// Normal written for every vertex in [`NormalMode::Placeholder`]
pub const PLACEHOLDER_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// How vertex normals are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// Constant `(0, 1, 0)` on every vertex
    #[default]
    Placeholder,
    /// Flat normal of the emitted triangle, in target space
    Face,
}

/// Triangle mesh in target (glTF) space
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) -> Result<u32> {
        let index = self.vertex_count();
        if index >= u32::MAX as usize {
            return Err(Error::TooManyVertices(index + 1));
        }
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        Ok(index as u32)
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of a vertex
    #[inline]
    pub fn position(&self, index: usize) -> [f32; 3] {
        let i = index * 3;
        [self.positions[i], self.positions[i + 1], self.positions[i + 2]]
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.positions.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Converted mesh of one source element
#[derive(Debug, Clone)]
pub struct ElementMesh {
    pub name: String,
    pub mesh: Mesh,
}

impl ElementMesh {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

/// Accumulates source-space triangles into an [`ElementMesh`].
///
/// Every triangle gets three fresh vertices; nothing is welded.
pub struct MeshBuilder {
    name: String,
    normals: NormalMode,
    mesh: Mesh,
}

impl MeshBuilder {
    pub fn new(name: impl Into<String>, normals: NormalMode) -> Self {
        Self {
            name: name.into(),
            normals,
            mesh: Mesh::new(),
        }
    }

    /// Add one triangle, converting it to target space
    pub fn add_triangle(&mut self, triangle: &Triangle) -> Result<()> {
        let normal = match self.normals {
            NormalMode::Placeholder => PLACEHOLDER_NORMAL,
            NormalMode::Face => target_face_normal(triangle),
        };

        let i0 = self.mesh.add_vertex(source_to_target(&triangle.v0), normal)?;
        let i1 = self.mesh.add_vertex(source_to_target(&triangle.v1), normal)?;
        let i2 = self.mesh.add_vertex(source_to_target(&triangle.v2), normal)?;
        self.mesh.add_triangle(i0, i1, i2);
        Ok(())
    }

    pub fn add_triangles<'a>(
        &mut self,
        triangles: impl IntoIterator<Item = &'a Triangle>,
    ) -> Result<()> {
        for triangle in triangles {
            self.add_triangle(triangle)?;
        }
        Ok(())
    }

    pub fn build(self) -> ElementMesh {
        ElementMesh {
            name: self.name,
            mesh: self.mesh,
        }
    }
}

/// Flat normal of the triangle after the axis swap, computed in f64.
/// Degenerate triangles get the placeholder.
fn target_face_normal(triangle: &Triangle) -> [f32; 3] {
    let swap = |p: &Point3<f64>| Vector3::new(p.x, p.z, p.y);
    let (a, b, c) = (swap(&triangle.v0), swap(&triangle.v1), swap(&triangle.v2));
    let normal = (b - a).cross(&(c - a));
    let len = normal.norm();
    if len > 1e-12 {
        let n = normal / len;
        [n.x as f32, n.y as f32, n.z as f32]
    } else {
        PLACEHOLDER_NORMAL
    }
}
