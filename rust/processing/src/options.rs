// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion options

use bim2gltf_core::GeometryOptions;
use bim2gltf_export::BufferLayout;
use bim2gltf_geometry::NormalMode;

/// Options for one conversion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Geometry retrieval (fine detail, no helper geometry by default)
    pub geometry: GeometryOptions,
    pub normals: NormalMode,
    pub layout: BufferLayout,
    /// Also write `<stem>.zip` next to the output
    pub package_zip: bool,
    /// Flatten and build element meshes on the rayon pool
    pub parallel: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            geometry: GeometryOptions::default(),
            normals: NormalMode::Placeholder,
            layout: BufferLayout::Separate,
            package_zip: false,
            parallel: true,
        }
    }
}
