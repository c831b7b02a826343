// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::convert::ConversionOutput;
use bim2gltf_export::ExportError;
use thiserror::Error;

/// Conversion failures reported to the caller
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Nothing in the document produced triangles. An empty but valid scene
    /// was still written; the output is attached.
    #[error("No usable geometry found; wrote empty scene to {}", .0.asset.gltf_path.display())]
    NoGeometry(Box<ConversionOutput>),

    /// Output directory or file could not be written
    #[error("I/O failure writing output: {0}")]
    Io(#[source] ExportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Whether the conversion produced no usable output
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConvertError::NoGeometry(_))
    }
}

impl From<ExportError> for ConvertError {
    fn from(err: ExportError) -> Self {
        if err.is_io() {
            ConvertError::Io(err)
        } else {
            ConvertError::Internal(err.to_string())
        }
    }
}
