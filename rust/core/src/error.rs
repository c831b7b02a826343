// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for document access
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading elements and geometry from a model document
#[derive(Error, Debug)]
pub enum Error {
    #[error("Element {0} not found")]
    ElementNotFound(String),

    #[error("Duplicate element id {0}")]
    DuplicateElement(String),

    #[error("Geometry retrieval failed for element {id}: {reason}")]
    GeometryRetrieval { id: String, reason: String },
}

impl Error {
    /// Convenience constructor for retrieval failures
    pub fn retrieval(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::GeometryRetrieval {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
