// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM2glTF conversion pipeline
//!
//! [`convert_document`] is the entry point: a read-only [`ModelDocument`] and
//! an output path in, a glTF 2.0 file (plus binary buffer) out.
//!
//! ```rust,ignore
//! use bim2gltf_processing::{convert_document, ConvertOptions};
//!
//! let output = convert_document(&document, "jobs/42/output.gltf", &ConvertOptions::default())?;
//! println!("{} meshes", output.stats.meshes);
//! ```

pub mod convert;
pub mod error;
pub mod options;
pub mod walker;

pub use bim2gltf_core::ModelDocument;
pub use convert::{build_element_mesh, build_scene, convert_document, ConversionOutput, ConversionStats};
pub use error::ConvertError;
pub use options::ConvertOptions;
pub use walker::{SceneWalker, WalkStats};
