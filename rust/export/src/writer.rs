// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! glTF 2.0 writer
//!
//! Each scene node becomes one node/mesh pair with a single indexed
//! TRIANGLES primitive (POSITION + NORMAL, float32 VEC3; u32 indices). All
//! primitives reference material 0. Vertex and index data live in one binary
//! buffer, written next to the JSON or embedded as a data URI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use bim2gltf_geometry::{Material, Mesh, SceneGraph};
use serde::Serialize;

use crate::error::{ExportError, Result};

/// Where the binary buffer goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferLayout {
    /// `<stem>.bin` next to the `.gltf`
    #[default]
    Separate,
    /// base64 data URI inside the JSON
    Embedded,
}

/// Files produced by [`write_gltf`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenAsset {
    pub gltf_path: PathBuf,
    /// `None` for embedded buffers and for scenes without geometry
    pub bin_path: Option<PathBuf>,
}

// ============================================================================
// glTF JSON schema (write side)
// ============================================================================

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const MODE_TRIANGLES: u32 = 4;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GltfRoot {
    asset: Asset,
    scene: usize,
    scenes: Vec<SceneOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<NodeOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<MeshOut>,
    materials: Vec<MaterialOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    accessors: Vec<AccessorOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferViewOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffers: Vec<BufferOut>,
}

#[derive(Debug, Serialize)]
struct Asset {
    version: String,
    generator: String,
}

#[derive(Debug, Serialize)]
struct SceneOut {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct NodeOut {
    name: String,
    mesh: usize,
}

#[derive(Debug, Serialize)]
struct MeshOut {
    name: String,
    primitives: Vec<PrimitiveOut>,
}

#[derive(Debug, Serialize)]
struct PrimitiveOut {
    attributes: BTreeMap<&'static str, usize>,
    indices: usize,
    material: usize,
    mode: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaterialOut {
    name: String,
    pbr_metallic_roughness: PbrOut,
    double_sided: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PbrOut {
    base_color_factor: [f32; 4],
    metallic_factor: f32,
    roughness_factor: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessorOut {
    buffer_view: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    accessor_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<[f32; 3]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewOut {
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    target: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferOut {
    byte_length: usize,
    uri: String,
}

// ============================================================================
// Writer
// ============================================================================

/// In-memory glTF document built from a [`SceneGraph`]
#[derive(Debug)]
pub struct GltfDocument {
    root: GltfRoot,
    binary: Vec<u8>,
}

impl GltfDocument {
    pub fn from_scene(scene: &SceneGraph) -> Result<Self> {
        let mut writer = Writer::default();
        let mut scene_nodes = Vec::with_capacity(scene.len());

        for node in scene.nodes() {
            let mesh_index = writer.push_mesh(&node.mesh.name, &node.mesh.mesh);
            let node_index = writer.nodes.len();
            writer.nodes.push(NodeOut {
                name: node.name.clone(),
                mesh: mesh_index,
            });
            scene_nodes.push(node_index);
        }

        if writer.binary.len() > u32::MAX as usize {
            return Err(ExportError::BufferTooLarge(writer.binary.len()));
        }

        let root = GltfRoot {
            asset: Asset {
                version: "2.0".to_string(),
                generator: format!("bim2gltf {}", env!("CARGO_PKG_VERSION")),
            },
            scene: 0,
            scenes: vec![SceneOut { nodes: scene_nodes }],
            nodes: writer.nodes,
            meshes: writer.meshes,
            materials: vec![material_out(scene.material())],
            accessors: writer.accessors,
            buffer_views: writer.buffer_views,
            buffers: Vec::new(),
        };

        Ok(Self {
            root,
            binary: writer.binary,
        })
    }

    /// Binary buffer contents
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Serialize the JSON part, pointing the buffer at `uri`.
    ///
    /// The buffer entry is omitted when there is no binary data.
    pub fn to_json(&mut self, uri: &str) -> Result<Vec<u8>> {
        self.root.buffers.clear();
        if !self.binary.is_empty() {
            self.root.buffers.push(BufferOut {
                byte_length: self.binary.len(),
                uri: uri.to_string(),
            });
        }
        Ok(serde_json::to_vec_pretty(&self.root)?)
    }

    /// Serialize with the buffer embedded as a data URI
    pub fn to_embedded_json(&mut self) -> Result<Vec<u8>> {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.binary)
        );
        self.to_json(&uri)
    }
}

fn material_out(material: &Material) -> MaterialOut {
    MaterialOut {
        name: material.name.clone(),
        pbr_metallic_roughness: PbrOut {
            base_color_factor: material.base_color,
            metallic_factor: material.metallic,
            roughness_factor: material.roughness,
        },
        double_sided: material.double_sided,
    }
}

#[derive(Default)]
struct Writer {
    nodes: Vec<NodeOut>,
    meshes: Vec<MeshOut>,
    accessors: Vec<AccessorOut>,
    buffer_views: Vec<BufferViewOut>,
    binary: Vec<u8>,
}

impl Writer {
    fn push_mesh(&mut self, name: &str, mesh: &Mesh) -> usize {
        let (min, max) = mesh.bounds();
        let vertex_count = mesh.vertex_count();

        let positions = self.push_view(f32_bytes(&mesh.positions), TARGET_ARRAY_BUFFER);
        let position_accessor = self.push_accessor(AccessorOut {
            buffer_view: positions,
            component_type: COMPONENT_FLOAT,
            count: vertex_count,
            accessor_type: "VEC3",
            min: Some([min.x, min.y, min.z]),
            max: Some([max.x, max.y, max.z]),
        });

        let normals = self.push_view(f32_bytes(&mesh.normals), TARGET_ARRAY_BUFFER);
        let normal_accessor = self.push_accessor(AccessorOut {
            buffer_view: normals,
            component_type: COMPONENT_FLOAT,
            count: vertex_count,
            accessor_type: "VEC3",
            min: None,
            max: None,
        });

        let indices = self.push_view(u32_bytes(&mesh.indices), TARGET_ELEMENT_ARRAY_BUFFER);
        let index_accessor = self.push_accessor(AccessorOut {
            buffer_view: indices,
            component_type: COMPONENT_UNSIGNED_INT,
            count: mesh.indices.len(),
            accessor_type: "SCALAR",
            min: None,
            max: None,
        });

        let mut attributes = BTreeMap::new();
        attributes.insert("POSITION", position_accessor);
        attributes.insert("NORMAL", normal_accessor);

        let mesh_index = self.meshes.len();
        self.meshes.push(MeshOut {
            name: name.to_string(),
            primitives: vec![PrimitiveOut {
                attributes,
                indices: index_accessor,
                material: 0,
                mode: MODE_TRIANGLES,
            }],
        });
        mesh_index
    }

    fn push_view(&mut self, bytes: Vec<u8>, target: u32) -> usize {
        // Accessor offsets must be aligned to the component size
        while self.binary.len() % 4 != 0 {
            self.binary.push(0);
        }
        let byte_offset = self.binary.len();
        self.binary.extend_from_slice(&bytes);

        let index = self.buffer_views.len();
        self.buffer_views.push(BufferViewOut {
            buffer: 0,
            byte_offset,
            byte_length: bytes.len(),
            target,
        });
        index
    }

    fn push_accessor(&mut self, accessor: AccessorOut) -> usize {
        let index = self.accessors.len();
        self.accessors.push(accessor);
        index
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u32_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// ============================================================================
// File output
// ============================================================================

/// Serialize `scene` to `output` (a `.gltf` path).
///
/// Creates the parent directory when missing. With [`BufferLayout::Separate`]
/// the buffer goes to `<stem>.bin` in the same directory, so `output` itself
/// must not have a `.bin` extension.
pub fn write_gltf(scene: &SceneGraph, output: &Path, layout: BufferLayout) -> Result<WrittenAsset> {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ExportError::InvalidPath(output.to_path_buf()))?;

    // The buffer file is `<stem>.bin`; a `.bin` output would overwrite it
    let is_bin = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));
    if is_bin {
        return Err(ExportError::InvalidPath(output.to_path_buf()));
    }

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            tracing::debug!(dir = %dir.display(), "Created output directory");
        }
    }

    let mut document = GltfDocument::from_scene(scene)?;

    let (json, bin_path) = match layout {
        BufferLayout::Embedded => (document.to_embedded_json()?, None),
        BufferLayout::Separate if document.binary().is_empty() => (document.to_json("")?, None),
        BufferLayout::Separate => {
            let bin_name = format!("{}.bin", stem);
            let bin_path = output.with_file_name(&bin_name);
            write_file(&bin_path, document.binary())?;
            (document.to_json(&bin_name)?, Some(bin_path))
        }
    };

    write_file(output, &json)?;

    tracing::info!(
        path = %output.display(),
        nodes = scene.len(),
        triangles = scene.triangle_count(),
        buffer_bytes = document.binary().len(),
        "Wrote glTF"
    );

    Ok(WrittenAsset {
        gltf_path: output.to_path_buf(),
        bin_path,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
