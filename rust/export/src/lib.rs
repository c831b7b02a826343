// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM2glTF Export
//!
//! Serializes a [`bim2gltf_geometry::SceneGraph`] as a glTF 2.0 document and
//! optionally packages the result into a zip archive.

pub mod error;
pub mod writer;
pub mod package;

pub use error::{ExportError, Result};
pub use writer::{write_gltf, BufferLayout, GltfDocument, WrittenAsset};
pub use package::{package_zip, zip_path};
