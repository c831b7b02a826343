// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene assembly
//!
//! A flat list of rigid mesh nodes sharing one material. Nodes carry no
//! transform: element geometry is already in world space.

use crate::mesh::ElementMesh;

/// Metallic-roughness material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "DefaultMaterial".to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 1.0,
            roughness: 1.0,
            double_sided: false,
        }
    }
}

/// One rigid node of the scene
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Source element identifier
    pub name: String,
    pub mesh: ElementMesh,
}

/// Every element mesh of one conversion plus the shared material
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    material: Material,
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(material: Material) -> Self {
        Self {
            material,
            nodes: Vec::new(),
        }
    }

    /// Add an element mesh as an independent node with identity transform.
    ///
    /// Meshes without triangles are dropped; returns whether the mesh was added.
    pub fn add_rigid_mesh(&mut self, name: impl Into<String>, mesh: ElementMesh) -> bool {
        if mesh.is_empty() {
            return false;
        }
        self.nodes.push(SceneNode {
            name: name.into(),
            mesh,
        });
        true
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(|n| n.mesh.triangle_count()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.nodes.iter().map(|n| n.mesh.mesh.vertex_count()).sum()
    }
}
