// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry flattening
//!
//! Walks an element's geometry container and produces a flat list of
//! triangles in source space. Instance references are resolved one level
//! deep: their symbol geometry is placed into world space, but instance
//! references found inside a symbol are not followed.

use crate::error::{Error, Result};
use crate::transform::{placement_matrix, point};
use crate::triangulation::triangulate_face;
use bim2gltf_core::{Face, GeometryElement, GeometryNode, RawMesh, Solid};
use nalgebra::{Matrix4, Point3, Vector3};

/// Triangle in source space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized normal (edge1 x edge2)
    #[inline]
    pub fn cross(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    pub fn area(&self) -> f64 {
        self.cross().norm() * 0.5
    }

    #[inline]
    pub fn vertices(&self) -> [&Point3<f64>; 3] {
        [&self.v0, &self.v1, &self.v2]
    }
}

/// Counters of what the flattener did with each geometry node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    pub instances: usize,
    pub solids: usize,
    pub meshes: usize,
    /// Solids without faces or edges
    pub skipped_solids: usize,
    /// Meshes without triangles
    pub skipped_meshes: usize,
    /// Faces whose outer loop has fewer than 3 points
    pub skipped_faces: usize,
    /// Non-surface nodes and instance references nested inside a symbol
    pub ignored_nodes: usize,
}

impl FlattenStats {
    pub fn merge(&mut self, other: &FlattenStats) {
        self.instances += other.instances;
        self.solids += other.solids;
        self.meshes += other.meshes;
        self.skipped_solids += other.skipped_solids;
        self.skipped_meshes += other.skipped_meshes;
        self.skipped_faces += other.skipped_faces;
        self.ignored_nodes += other.ignored_nodes;
    }
}

/// Output of [`flatten_geometry`]
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub triangles: Vec<Triangle>,
    pub stats: FlattenStats,
}

/// Flatten an element's geometry into source-space triangles.
///
/// Errors (bad placement, out-of-range mesh index, failed face triangulation)
/// concern the whole element; callers skip the element on error.
pub fn flatten_geometry(geometry: &GeometryElement) -> Result<Flattened> {
    let mut flattener = GeometryFlattener::default();
    flattener.add_container(geometry, None)?;
    Ok(Flattened {
        triangles: flattener.triangles,
        stats: flattener.stats,
    })
}

#[derive(Default)]
struct GeometryFlattener {
    triangles: Vec<Triangle>,
    stats: FlattenStats,
}

impl GeometryFlattener {
    /// `placement` is `Some` while inside a resolved instance
    fn add_container(
        &mut self,
        geometry: &GeometryElement,
        placement: Option<&Matrix4<f64>>,
    ) -> Result<()> {
        for node in geometry.nodes() {
            match node {
                GeometryNode::Instance(instance) => {
                    if placement.is_some() {
                        self.stats.ignored_nodes += 1;
                        continue;
                    }
                    self.stats.instances += 1;
                    let matrix = placement_matrix(&instance.placement)?;
                    self.add_container(&instance.geometry, Some(&matrix))?;
                }
                GeometryNode::Solid(solid) => {
                    if solid.face_count() == 0 || solid.edge_count() == 0 {
                        self.stats.skipped_solids += 1;
                        continue;
                    }
                    self.stats.solids += 1;
                    self.add_solid(solid, placement)?;
                }
                GeometryNode::Mesh(mesh) => {
                    if mesh.triangle_count() == 0 {
                        self.stats.skipped_meshes += 1;
                        continue;
                    }
                    self.stats.meshes += 1;
                    self.add_mesh(mesh, placement)?;
                }
                GeometryNode::Other { .. } => {
                    self.stats.ignored_nodes += 1;
                }
            }
        }
        Ok(())
    }

    fn add_solid(&mut self, solid: &Solid, placement: Option<&Matrix4<f64>>) -> Result<()> {
        for face in &solid.faces {
            if face.outer.len() < 3 {
                self.stats.skipped_faces += 1;
                continue;
            }
            self.add_face(face, placement)?;
        }
        Ok(())
    }

    fn add_face(&mut self, face: &Face, placement: Option<&Matrix4<f64>>) -> Result<()> {
        let outer = place_all(&face.outer, placement);
        let holes: Vec<Vec<Point3<f64>>> = face
            .holes
            .iter()
            .map(|hole| place_all(hole, placement))
            .collect();

        let (points, triangles) = triangulate_face(&outer, &holes)?;
        self.triangles.reserve(triangles.len());
        for [a, b, c] in triangles {
            self.triangles
                .push(Triangle::new(points[a], points[b], points[c]));
        }
        Ok(())
    }

    fn add_mesh(&mut self, mesh: &RawMesh, placement: Option<&Matrix4<f64>>) -> Result<()> {
        let vertices = place_all(&mesh.vertices, placement);
        self.triangles.reserve(mesh.triangles.len());
        for (i, tri) in mesh.triangles.iter().enumerate() {
            let lookup = |index: u32| {
                vertices.get(index as usize).copied().ok_or_else(|| {
                    Error::InvalidMesh(format!(
                        "triangle {} references vertex {} of {}",
                        i,
                        index,
                        vertices.len()
                    ))
                })
            };
            self.triangles
                .push(Triangle::new(lookup(tri[0])?, lookup(tri[1])?, lookup(tri[2])?));
        }
        Ok(())
    }
}

fn place_all(points: &[[f64; 3]], placement: Option<&Matrix4<f64>>) -> Vec<Point3<f64>> {
    match placement {
        Some(matrix) => points
            .iter()
            .map(|p| matrix.transform_point(&point(p)))
            .collect(),
        None => points.iter().map(point).collect(),
    }
}
