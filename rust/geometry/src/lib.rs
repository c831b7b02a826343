// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM2glTF Geometry Processing
//!
//! Turns element geometry into glTF-ready triangle meshes: flattening of
//! instances, solids and raw meshes, earcutr face triangulation, Z-up to Y-up
//! conversion, and assembly into a flat scene graph.

pub mod error;
pub mod flatten;
pub mod mesh;
pub mod scene;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use flatten::{flatten_geometry, FlattenStats, Flattened, Triangle};
pub use mesh::{ElementMesh, Mesh, MeshBuilder, NormalMode, PLACEHOLDER_NORMAL};
pub use scene::{Material, SceneGraph, SceneNode};
pub use transform::{placement_matrix, source_to_target};
pub use triangulation::{triangulate_face, triangulate_polygon, triangulate_polygon_with_holes};
