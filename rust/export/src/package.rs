// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zip packaging of a written asset

use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ExportError, Result};
use crate::writer::WrittenAsset;

/// Path of the archive [`package_zip`] writes for an asset
pub fn zip_path(asset: &WrittenAsset) -> PathBuf {
    asset.gltf_path.with_extension("zip")
}

/// Package the `.gltf` (and `.bin`, if any) into `<stem>.zip` next to them.
///
/// Existing archives are left untouched; returns `None` in that case. The
/// archive is assembled in a temporary file and only appears under its final
/// name once complete, so a failed call leaves nothing behind.
pub fn package_zip(asset: &WrittenAsset) -> Result<Option<PathBuf>> {
    let archive_path = zip_path(asset);
    if archive_path == asset.gltf_path {
        return Err(ExportError::InvalidPath(archive_path));
    }
    if archive_path.exists() {
        tracing::debug!(path = %archive_path.display(), "Zip package already exists, skipping");
        return Ok(None);
    }

    let dir = archive_path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staging = NamedTempFile::new_in(dir).map_err(|source| ExportError::Write {
        path: archive_path.clone(),
        source,
    })?;

    let mut zip = ZipWriter::new(staging);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries = std::iter::once(&asset.gltf_path).chain(asset.bin_path.as_ref());
    for entry in entries {
        add_entry(&mut zip, entry, &archive_path, options)?;
    }

    let staging = zip.finish()?;
    match staging.persist_noclobber(&archive_path) {
        Ok(_) => {}
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %archive_path.display(), "Zip package appeared concurrently, skipping");
            return Ok(None);
        }
        Err(e) => {
            return Err(ExportError::Write {
                path: archive_path,
                source: e.error,
            })
        }
    }

    tracing::info!(path = %archive_path.display(), "Wrote zip package");
    Ok(Some(archive_path))
}

fn add_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    archive_path: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExportError::InvalidPath(path.to_path_buf()))?;

    let contents = fs::read(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    zip.start_file(name, options)?;
    zip.write_all(&contents).map_err(|source| ExportError::Write {
        path: archive_path.to_path_buf(),
        source,
    })?;
    Ok(())
}
