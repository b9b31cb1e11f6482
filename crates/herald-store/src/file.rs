// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic full-file rewrite helper shared by the stores.

use std::path::Path;

use herald_core::HeraldError;

/// Write `contents` to `path` via a sibling temp file and rename.
///
/// The rename is atomic on POSIX filesystems, so readers never observe a
/// partially written document.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), HeraldError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(HeraldError::store)?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(HeraldError::store)?;
    Ok(())
}

/// Read `path` if it exists; a missing file yields `None`.
pub(crate) async fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, HeraldError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(HeraldError::store(e)),
    }
}
