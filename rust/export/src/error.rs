// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur when writing glTF output
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid output path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Binary buffer too large: {0} bytes")]
    BufferTooLarge(usize),
}

impl ExportError {
    /// True for filesystem failures and unusable output paths
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ExportError::CreateDir { .. }
                | ExportError::Write { .. }
                | ExportError::Read { .. }
                | ExportError::InvalidPath(_)
                | ExportError::Zip(zip::result::ZipError::Io(_))
        )
    }

    /// Path the failure concerns, when known
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ExportError::CreateDir { path, .. }
            | ExportError::Write { path, .. }
            | ExportError::Read { path, .. } => Some(path),
            ExportError::InvalidPath(path) => Some(path),
            _ => None,
        }
    }
}
