// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document to glTF conversion
//!
//! walk elements -> flatten + build per element (optionally on rayon) ->
//! assemble in element order -> serialize once. Each element's geometry is
//! only held while that element is being built.

use std::path::{Path, PathBuf};
use std::time::Instant;

use bim2gltf_core::{ElementId, GeometryElement, ModelDocument};
use bim2gltf_export::{package_zip, write_gltf, WrittenAsset};
use bim2gltf_geometry::{
    flatten_geometry, ElementMesh, FlattenStats, MeshBuilder, NormalMode, SceneGraph,
};
use rayon::prelude::*;

use crate::error::ConvertError;
use crate::options::ConvertOptions;
use crate::walker::SceneWalker;

/// Counters for one conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionStats {
    /// Placed elements visited
    pub elements: usize,
    pub element_types_skipped: usize,
    pub retrieval_failures: usize,
    pub without_geometry: usize,
    /// Elements dropped because flattening or mesh building failed
    pub build_failures: usize,
    /// Elements whose geometry produced no triangles
    pub empty_elements: usize,
    pub meshes: usize,
    pub triangles: usize,
    pub flatten: FlattenStats,
    pub time_ms: u64,
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub asset: WrittenAsset,
    /// Archive written by this call, if packaging was requested and no
    /// archive existed yet
    pub zip_path: Option<PathBuf>,
    pub stats: ConversionStats,
}

enum ElementOutcome {
    Built {
        mesh: ElementMesh,
        flatten: FlattenStats,
    },
    NoGeometry,
    Failed,
}

/// Flatten an element's geometry and build its mesh
pub fn build_element_mesh(
    id: &ElementId,
    geometry: &GeometryElement,
    normals: NormalMode,
) -> bim2gltf_geometry::Result<(ElementMesh, FlattenStats)> {
    let flat = flatten_geometry(geometry)?;
    let mut builder = MeshBuilder::new(format!("Mesh_{}", id), normals);
    builder.add_triangles(&flat.triangles)?;
    Ok((builder.build(), flat.stats))
}

fn process_element(
    id: ElementId,
    geometry: Option<GeometryElement>,
    normals: NormalMode,
) -> (ElementId, ElementOutcome) {
    let outcome = match geometry {
        None => ElementOutcome::NoGeometry,
        Some(geometry) => match build_element_mesh(&id, &geometry, normals) {
            Ok((mesh, flatten)) => ElementOutcome::Built { mesh, flatten },
            Err(e) => {
                tracing::debug!(element = %id, error = %e, "Skipping element: mesh building failed");
                ElementOutcome::Failed
            }
        },
    };
    (id, outcome)
}

/// Walk the document and assemble the scene graph without writing anything
pub fn build_scene<D: ModelDocument + ?Sized>(
    document: &D,
    options: &ConvertOptions,
) -> (SceneGraph, ConversionStats) {
    let mut walker = SceneWalker::new(document, options.geometry);
    let normals = options.normals;

    // Geometry is retrieved lazily and dropped once its element is built;
    // parallel results are put back into element order afterwards
    let results: Vec<(ElementId, ElementOutcome)> = if options.parallel {
        let mut indexed: Vec<(usize, (ElementId, ElementOutcome))> = walker
            .by_ref()
            .enumerate()
            .par_bridge()
            .map(|(i, (id, geometry))| (i, process_element(id, geometry, normals)))
            .collect();
        indexed.sort_unstable_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, result)| result).collect()
    } else {
        walker
            .by_ref()
            .map(|(id, geometry)| process_element(id, geometry, normals))
            .collect()
    };
    let walk = walker.stats();

    tracing::debug!(
        elements = walk.elements,
        element_types = walk.element_types_skipped,
        parallel = options.parallel,
        "Element walk complete"
    );

    let mut stats = ConversionStats {
        elements: walk.elements,
        element_types_skipped: walk.element_types_skipped,
        retrieval_failures: walk.retrieval_failures,
        without_geometry: walk.without_geometry,
        ..Default::default()
    };

    let mut scene = SceneGraph::new();
    for (id, outcome) in results {
        match outcome {
            ElementOutcome::Built { mesh, flatten } => {
                stats.flatten.merge(&flatten);
                if !scene.add_rigid_mesh(id.to_string(), mesh) {
                    stats.empty_elements += 1;
                    tracing::debug!(element = %id, "Element produced no triangles");
                }
            }
            ElementOutcome::Failed => stats.build_failures += 1,
            ElementOutcome::NoGeometry => {}
        }
    }

    stats.meshes = scene.len();
    stats.triangles = scene.triangle_count();
    (scene, stats)
}

/// Convert `document` to a glTF file at `output`.
///
/// The document is only read. Per-element problems never fail the call; an
/// output that ends up without any mesh is reported as
/// [`ConvertError::NoGeometry`] after the empty scene has been written.
pub fn convert_document<D: ModelDocument + ?Sized>(
    document: &D,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionOutput, ConvertError> {
    let start = Instant::now();
    let output = output.as_ref();

    tracing::info!(output = %output.display(), "Starting conversion");

    let (scene, mut stats) = build_scene(document, options);
    let asset = write_gltf(&scene, output, options.layout)?;
    let zip_path = if options.package_zip {
        package_zip(&asset)?
    } else {
        None
    };

    stats.time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        elements = stats.elements,
        meshes = stats.meshes,
        triangles = stats.triangles,
        retrieval_failures = stats.retrieval_failures,
        build_failures = stats.build_failures,
        empty_elements = stats.empty_elements,
        skipped_solids = stats.flatten.skipped_solids,
        skipped_meshes = stats.flatten.skipped_meshes,
        time_ms = stats.time_ms,
        "Conversion complete"
    );

    let result = ConversionOutput {
        asset,
        zip_path,
        stats,
    };

    if scene.is_empty() {
        tracing::warn!(output = %output.display(), "No usable geometry found");
        return Err(ConvertError::NoGeometry(Box::new(result)));
    }

    Ok(result)
}
