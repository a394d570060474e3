//! Bucket layout of stored files and on-disk path derivation.
//!
//! Modern backups store each file at `<root>/<id[0..2]>/<id>`; older tools
//! wrote every file directly into the root as `<root>/<id>`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Result, ResultExt};

/// How stored files are arranged under the backup root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketLayout {
    /// `<root>/<id[0..2]>/<id>`
    Bucketed,
    /// `<root>/<id>`
    Flat,
}

impl BucketLayout {
    /// Detects the layout by looking for two-hex-digit bucket directories.
    pub fn detect(root: &Path) -> Result<Self> {
        let entries =
            fs::read_dir(root).with_context(|| format!("Failed to list {}", root.display()))?;

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_bucket_name(name) && entry.file_type()?.is_dir() {
                debug!(bucket = name, "Detected bucketed layout");
                return Ok(Self::Bucketed);
            }
        }

        debug!("No bucket directories, assuming flat layout");
        Ok(Self::Flat)
    }
}

/// Where a manifest file ID lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredFile {
    /// Found at `<root>/<id[0..2]>/<id>`.
    Bucketed(PathBuf),
    /// Found at `<root>/<id>`.
    Flat(PathBuf),
    /// Neither candidate exists; `expected` follows the backup's layout.
    Missing { expected: PathBuf },
    /// The ID is not a hex string and cannot name a stored file.
    Malformed,
}

impl StoredFile {
    /// Path of the stored file if it exists.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Bucketed(p) | Self::Flat(p) => Some(p),
            Self::Missing { .. } | Self::Malformed => None,
        }
    }

    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Bucketed(_) | Self::Flat(_))
    }
}

/// Returns true for a two-character lowercase or uppercase hex name.
pub fn is_bucket_name(name: &str) -> bool {
    name.len() == 2 && name.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns true if `file_id` can name a stored file: at least two
/// characters, all hex digits. Length parity is not checked.
pub fn is_valid_file_id(file_id: &str) -> bool {
    file_id.len() >= 2 && file_id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Path of `file_id` under `root` for the given layout. No I/O.
pub fn layout_path(root: &Path, file_id: &str, layout: BucketLayout) -> PathBuf {
    match layout {
        BucketLayout::Bucketed => root.join(file_id.get(..2).unwrap_or(file_id)).join(file_id),
        BucketLayout::Flat => root.join(file_id),
    }
}

/// Locates the stored copy of `file_id`.
///
/// The bucketed path wins when both exist. Only existence checks touch the
/// filesystem, so the result is stable for an unchanged backup.
pub fn derive_disk_path(root: &Path, file_id: &str, layout: BucketLayout) -> StoredFile {
    if !is_valid_file_id(file_id) {
        trace!(file_id, "Malformed file ID");
        return StoredFile::Malformed;
    }

    let bucketed = layout_path(root, file_id, BucketLayout::Bucketed);
    if bucketed.is_file() {
        return StoredFile::Bucketed(bucketed);
    }

    let flat = layout_path(root, file_id, BucketLayout::Flat);
    if flat.is_file() {
        return StoredFile::Flat(flat);
    }

    trace!(file_id, ?layout, "Stored file missing");
    StoredFile::Missing {
        expected: match layout {
            BucketLayout::Bucketed => bucketed,
            BucketLayout::Flat => flat,
        },
    }
}
