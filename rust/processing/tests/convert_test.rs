// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use bim2gltf_core::{
    Face, GeometryElement, GeometryNode, InMemoryDocument, InstanceReference, Placement, RawMesh,
    Solid,
};
use bim2gltf_export::BufferLayout;
use bim2gltf_geometry::NormalMode;
use bim2gltf_processing::{convert_document, ConvertError, ConvertOptions};
use std::fs;
use std::path::Path;

/// Mesh-level summary of a glTF file as read by a conformant loader
struct Loaded {
    node_names: Vec<String>,
    triangles_per_mesh: Vec<usize>,
    positions: Vec<Vec<[f32; 3]>>,
    normals: Vec<Vec<[f32; 3]>>,
    material_indices: Vec<Option<usize>>,
    material_count: usize,
}

fn load(path: &Path) -> Loaded {
    let (document, buffers, _) = gltf::import(path).expect("output must be valid glTF");

    let node_names = document
        .nodes()
        .map(|n| n.name().unwrap_or_default().to_string())
        .collect();

    let mut loaded = Loaded {
        node_names,
        triangles_per_mesh: Vec::new(),
        positions: Vec::new(),
        normals: Vec::new(),
        material_indices: Vec::new(),
        material_count: document.materials().count(),
    };

    for mesh in document.meshes() {
        let mut primitives = mesh.primitives();
        let primitive = primitives.next().expect("mesh has a primitive");
        assert!(primitives.next().is_none(), "exactly one primitive per mesh");
        assert_eq!(primitive.mode(), gltf::mesh::Mode::Triangles);

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
        loaded.triangles_per_mesh.push(indices.len() / 3);
        loaded
            .positions
            .push(reader.read_positions().unwrap().collect());
        loaded.normals.push(reader.read_normals().unwrap().collect());
        loaded.material_indices.push(primitive.material().index());
    }

    loaded
}

fn quad(z: f64) -> Face {
    Face::new(vec![
        [0.0, 0.0, z],
        [2.0, 0.0, z],
        [2.0, 1.0, z],
        [0.0, 1.0, z],
    ])
}

fn strip_mesh(triangles: u32) -> RawMesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for i in 0..triangles {
        let x = i as f64;
        let base = vertices.len() as u32;
        vertices.push([x, 0.0, 0.0]);
        vertices.push([x + 1.0, 0.0, 0.0]);
        vertices.push([x, 0.0, 1.0]);
        indices.push([base, base + 1, base + 2]);
    }
    RawMesh::new(vertices, indices)
}

/// A: solid with two quads (4 triangles), B: no geometry, C: mesh with 6 triangles
fn three_element_document() -> InMemoryDocument {
    let mut doc = InMemoryDocument::new();
    doc.add_element(
        "A",
        Some(GeometryElement::new().with(GeometryNode::Solid(Solid::new(vec![quad(0.0), quad(3.0)])))),
    )
    .unwrap();
    doc.add_element("B", None).unwrap();
    doc.add_element(
        "C",
        Some(GeometryElement::new().with(GeometryNode::Mesh(strip_mesh(6)))),
    )
    .unwrap();
    doc
}

#[test]
fn test_three_element_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.gltf");

    let result = convert_document(&three_element_document(), &output, &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.stats.meshes, 2);
    assert_eq!(result.stats.triangles, 10);
    assert_eq!(result.stats.without_geometry, 1);
    assert_eq!(result.asset.bin_path, Some(dir.path().join("output.bin")));

    let loaded = load(&output);
    assert_eq!(loaded.node_names, vec!["A", "C"]);
    assert_eq!(loaded.triangles_per_mesh, vec![4, 6]);
}

#[test]
fn test_coordinates_are_converted_to_y_up() {
    let mesh = RawMesh::new(
        vec![[1.5, 2.5, 3.5], [-4.0, 10.25, 0.0], [0.1, 0.2, 0.3]],
        vec![[0, 1, 2]],
    );
    let mut doc = InMemoryDocument::new();
    doc.add_element("1", Some(GeometryElement::new().with(GeometryNode::Mesh(mesh)))).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("axes.gltf");
    convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    let positions = &load(&output).positions[0];
    assert_eq!(positions[0], [1.5, 3.5, 2.5]);
    assert_eq!(positions[1], [-4.0, 0.0, 10.25]);
    assert_relative_eq!(positions[2][0], 0.1f32);
    assert_relative_eq!(positions[2][1], 0.3f32);
    assert_relative_eq!(positions[2][2], 0.2f32);
}

#[test]
fn test_placeholder_normals_and_shared_material() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.gltf");
    convert_document(&three_element_document(), &output, &ConvertOptions::default()).unwrap();

    let loaded = load(&output);
    assert_eq!(loaded.material_count, 1);
    assert!(loaded.material_indices.iter().all(|m| *m == Some(0)));
    for normals in &loaded.normals {
        assert!(normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }
}

#[test]
fn test_face_normals_option() {
    // Source floor facing +Z; after conversion the winding is mirrored
    let mesh = RawMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![[0, 1, 2]],
    );
    let mut doc = InMemoryDocument::new();
    doc.add_element("1", Some(GeometryElement::new().with(GeometryNode::Mesh(mesh)))).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("normals.gltf");
    let options = ConvertOptions {
        normals: NormalMode::Face,
        ..Default::default()
    };
    convert_document(&doc, &output, &options).unwrap();

    let normals = &load(&output).normals[0];
    for n in normals {
        assert_relative_eq!(n[1], -1.0);
    }
}

#[test]
fn test_empty_elements_are_excluded() {
    let mut doc = three_element_document();
    doc.add_element(
        "D",
        Some(
            GeometryElement::new()
                .with(GeometryNode::Solid(Solid::default()))
                .with(GeometryNode::Mesh(RawMesh::default())),
        ),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.gltf");
    let result = convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(result.stats.empty_elements, 1);
    assert_eq!(result.stats.flatten.skipped_solids, 1);
    assert_eq!(result.stats.flatten.skipped_meshes, 1);
    assert_eq!(load(&output).node_names, vec!["A", "C"]);
}

#[test]
fn test_degenerate_triangles_are_kept() {
    let collinear = RawMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]],
        vec![[0, 1, 2]],
    );
    let mut doc = InMemoryDocument::new();
    doc.add_element("1", Some(GeometryElement::new().with(GeometryNode::Mesh(collinear)))).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("degenerate.gltf");
    convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(load(&output).triangles_per_mesh, vec![1]);
}

#[test]
fn test_no_geometry_writes_empty_scene() {
    let mut doc = InMemoryDocument::new();
    doc.add_element("1", None).unwrap();
    let line = GeometryNode::Other {
        description: "model line".into(),
    };
    doc.add_element("2", Some(GeometryElement::new().with(line)))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.gltf");
    let err = convert_document(&doc, &output, &ConvertOptions::default()).unwrap_err();

    assert!(!err.is_fatal());
    match err {
        ConvertError::NoGeometry(result) => {
            assert_eq!(result.asset.gltf_path, output);
            assert_eq!(result.stats.empty_elements, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    let loaded = load(&output);
    assert!(loaded.node_names.is_empty());
    assert!(loaded.triangles_per_mesh.is_empty());
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();

    let output = blocker.join("job").join("output.gltf");
    let err = convert_document(&three_element_document(), &output, &ConvertOptions::default())
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, ConvertError::Io(_)));
    assert!(!output.exists());
}

#[test]
fn test_failed_element_does_not_affect_others() {
    let mut doc = three_element_document();
    doc.add_element(
        "broken",
        Some(GeometryElement::new().with(GeometryNode::Mesh(RawMesh::new(
            vec![[0.0, 0.0, 0.0]],
            vec![[0, 5, 9]],
        )))),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.gltf");
    let result = convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(result.stats.build_failures, 1);
    assert_eq!(load(&output).triangles_per_mesh, vec![4, 6]);
}

#[test]
fn test_parallel_and_sequential_output_match() {
    let mut doc = InMemoryDocument::new();
    for i in 0..64u32 {
        doc.add_element(
            format!("E{i}"),
            Some(GeometryElement::new().with(GeometryNode::Mesh(strip_mesh(i % 5)))),
        )
        .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let sequential = dir.path().join("seq.gltf");
    let parallel = dir.path().join("par.gltf");

    let options = ConvertOptions {
        layout: BufferLayout::Embedded,
        ..Default::default()
    };
    convert_document(&doc, &parallel, &options).unwrap();
    convert_document(
        &doc,
        &sequential,
        &ConvertOptions {
            parallel: false,
            ..options
        },
    )
    .unwrap();

    assert_eq!(fs::read(&sequential).unwrap(), fs::read(&parallel).unwrap());
}

#[test]
fn test_instances_are_placed_in_world_space() {
    let symbol = GeometryElement::new().with(GeometryNode::Mesh(strip_mesh(1)));
    let mut doc = InMemoryDocument::new();
    doc.add_element(
        "door",
        Some(GeometryElement::new().with(GeometryNode::Instance(InstanceReference {
            placement: Placement::translation(5.0, 6.0, 7.0),
            geometry: symbol,
        }))),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("instance.gltf");
    convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    // Source (5, 6, 7) in Y-up
    assert_eq!(load(&output).positions[0][0], [5.0, 7.0, 6.0]);
}

#[test]
fn test_zip_package_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.gltf");
    let options = ConvertOptions {
        package_zip: true,
        ..Default::default()
    };

    let first = convert_document(&three_element_document(), &output, &options).unwrap();
    assert_eq!(first.zip_path, Some(dir.path().join("output.zip")));

    let second = convert_document(&three_element_document(), &output, &options).unwrap();
    assert_eq!(second.zip_path, None);
    assert!(dir.path().join("output.zip").exists());
}

#[test]
fn test_json_document_round_trip() {
    let json = r#"{
        "title": "Sample",
        "elements": [
            {"id": "wall-type", "is_element_type": true,
             "geometry": [{"kind": "mesh", "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,2]]}]},
            {"id": "wall-1", "category": "Walls",
             "geometry": [
                {"kind": "solid", "faces": [
                    {"outer": [[0,0,0],[4,0,0],[4,0,3],[0,0,3]]},
                    {"outer": [[0,0,0],[4,0,0],[4,0,3],[0,0,3]],
                     "holes": [[[1,0,1],[1,0,2],[2,0,2],[2,0,1]]]}
                ]},
                {"kind": "other", "description": "location line"},
                {"kind": "mesh", "visible": false,
                 "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,2]]}
             ]},
            {"id": "level-1"}
        ]
    }"#;
    let doc: InMemoryDocument = serde_json::from_str(json).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("model.gltf");
    let result = convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(result.stats.elements, 2);
    assert_eq!(result.stats.element_types_skipped, 1);
    assert_eq!(result.stats.meshes, 1);
    assert_eq!(result.stats.flatten.meshes, 0);

    let loaded = load(&output);
    assert_eq!(loaded.node_names, vec!["wall-1"]);
    // Plain quad gives 2 triangles, quad with a hole gives more
    assert!(loaded.triangles_per_mesh[0] > 4);
}

#[test]
fn test_each_element_keeps_its_own_geometry() {
    let mut doc = InMemoryDocument::new();
    for (id, x) in [("7", 0.0), ("8", 100.0)] {
        let mesh = RawMesh::new(
            vec![[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]],
            vec![[0, 1, 2]],
        );
        doc.add_element(id, Some(GeometryElement::new().with(GeometryNode::Mesh(mesh))))
            .unwrap();
    }
    assert!(doc.add_element("7", None).is_err());

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ids.gltf");
    convert_document(&doc, &output, &ConvertOptions::default()).unwrap();

    let loaded = load(&output);
    assert_eq!(loaded.node_names, vec!["7", "8"]);
    assert_eq!(loaded.positions[0][0], [0.0, 0.0, 0.0]);
    assert_eq!(loaded.positions[1][0], [100.0, 0.0, 0.0]);
}

#[test]
fn test_json_document_with_repeated_id_is_rejected() {
    let json = r#"{"elements": [
        {"id": "7", "geometry": [{"kind": "mesh", "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,2]]}]},
        {"id": "7", "geometry": [{"kind": "mesh", "vertices": [[100,0,0],[101,0,0],[100,1,0]], "triangles": [[0,1,2]]}]}
    ]}"#;
    assert!(serde_json::from_str::<InMemoryDocument>(json).is_err());
}
