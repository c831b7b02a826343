// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry data model
//!
//! Mirrors what a modeling kernel hands back for one element: a container of
//! geometry nodes, each of which is an instance reference, a face-bounded
//! solid, an explicit triangle mesh, or something that carries no surfaces.

use rustc_hash::FxHashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position in source space (right-handed, Z-up)
pub type Xyz = [f64; 3];

/// Stable element identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One entry of the document's element collection
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SourceElement {
    pub id: ElementId,
    /// Category name (e.g. "Walls"), informational only
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<String>,
    /// Element types (family symbols, wall types...) define geometry but are
    /// not placed in the model
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_element_type: bool,
}

impl SourceElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            category: None,
            is_element_type: false,
        }
    }
}

/// Placement of an instance: origin plus the images of the three unit axes.
///
/// Maps a local point `p` to `origin + p.x * basis_x + p.y * basis_y + p.z * basis_z`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    pub origin: Xyz,
    pub basis_x: Xyz,
    pub basis_y: Xyz,
    pub basis_z: Xyz,
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        origin: [0.0, 0.0, 0.0],
        basis_x: [1.0, 0.0, 0.0],
        basis_y: [0.0, 1.0, 0.0],
        basis_z: [0.0, 0.0, 1.0],
    };

    /// Pure translation
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            origin: [x, y, z],
            ..Self::IDENTITY
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Planar face of a solid: one outer loop and optional hole loops
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    pub outer: Vec<Xyz>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub holes: Vec<Vec<Xyz>>,
}

impl Face {
    pub fn new(outer: Vec<Xyz>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Vec<Xyz>, holes: Vec<Vec<Xyz>>) -> Self {
        Self { outer, holes }
    }

    /// Iterate all loops, outer first
    pub fn loops(&self) -> impl Iterator<Item = &[Xyz]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }
}

/// Closed, face-bounded volume
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solid {
    pub faces: Vec<Face>,
}

impl Solid {
    pub fn new(faces: Vec<Face>) -> Self {
        Self { faces }
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct undirected edges over all face loops.
    ///
    /// Edges are keyed on the exact bit pattern of their endpoints, so two faces
    /// sharing an edge only count it once.
    pub fn edge_count(&self) -> usize {
        let mut edges: FxHashSet<([u64; 3], [u64; 3])> = FxHashSet::default();
        for face in &self.faces {
            for lp in face.loops() {
                if lp.len() < 2 {
                    continue;
                }
                for i in 0..lp.len() {
                    let a = bits(&lp[i]);
                    let b = bits(&lp[(i + 1) % lp.len()]);
                    if a == b {
                        continue;
                    }
                    edges.insert(if a < b { (a, b) } else { (b, a) });
                }
            }
        }
        edges.len()
    }
}

#[inline]
fn bits(p: &Xyz) -> [u64; 3] {
    [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()]
}

/// Explicit triangle list
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawMesh {
    pub vertices: Vec<Xyz>,
    pub triangles: Vec<[u32; 3]>,
}

impl RawMesh {
    pub fn new(vertices: Vec<Xyz>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Reference to shared geometry placed by a transform
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstanceReference {
    #[cfg_attr(feature = "serde", serde(default))]
    pub placement: Placement,
    /// Symbol geometry in the instance's local space
    pub geometry: GeometryElement,
}

/// One geometry object retrieved from an element
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum GeometryNode {
    Instance(InstanceReference),
    Solid(Solid),
    Mesh(RawMesh),
    /// Curves, points, text and anything else without surfaces
    Other {
        #[cfg_attr(feature = "serde", serde(default))]
        description: String,
    },
}

impl GeometryNode {
    /// Short kind name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            GeometryNode::Instance(_) => "instance",
            GeometryNode::Solid(_) => "solid",
            GeometryNode::Mesh(_) => "mesh",
            GeometryNode::Other { .. } => "other",
        }
    }
}

/// A geometry node together with its visibility flag
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub node: GeometryNode,
    /// Helper geometry (reference planes, analytical lines) is non-visible
    #[cfg_attr(feature = "serde", serde(default = "visible_default"))]
    pub visible: bool,
}

#[cfg(feature = "serde")]
fn visible_default() -> bool {
    true
}

impl From<GeometryNode> for GeometryItem {
    fn from(node: GeometryNode) -> Self {
        Self {
            node,
            visible: true,
        }
    }
}

/// Geometry container of one element
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct GeometryElement {
    pub items: Vec<GeometryItem>,
}

impl GeometryElement {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builder-style push of a visible node
    pub fn with(mut self, node: GeometryNode) -> Self {
        self.items.push(node.into());
        self
    }

    pub fn push(&mut self, node: GeometryNode) {
        self.items.push(node.into());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GeometryNode> {
        self.items.iter().map(|item| &item.node)
    }

    /// Copy of this container without non-visible items, applied recursively
    /// through instance references
    pub fn visible_only(&self) -> GeometryElement {
        let items = self
            .items
            .iter()
            .filter(|item| item.visible)
            .map(|item| {
                let node = match &item.node {
                    GeometryNode::Instance(inst) => GeometryNode::Instance(InstanceReference {
                        placement: inst.placement,
                        geometry: inst.geometry.visible_only(),
                    }),
                    other => other.clone(),
                };
                GeometryItem {
                    node,
                    visible: true,
                }
            })
            .collect();
        GeometryElement { items }
    }
}

impl FromIterator<GeometryNode> for GeometryElement {
    fn from_iter<T: IntoIterator<Item = GeometryNode>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().map(GeometryItem::from).collect(),
        }
    }
}
