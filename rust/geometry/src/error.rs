// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Mesh too large: {0} vertices exceed u32 indexing")]
    TooManyVertices(usize),
}
