//! Row types of the `Manifest.db` `Files` table.

use serde::{Serialize, Serializer};

/// Kind of filesystem object a manifest row describes (`flags` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown(i64),
}

impl EntryKind {
    pub const fn from_flags(flags: i64) -> Self {
        match flags {
            1 => Self::File,
            2 => Self::Directory,
            4 => Self::Symlink,
            other => Self::Unknown(other),
        }
    }

    /// Returns true if the row may have content stored under its file ID.
    ///
    /// Directories and symlinks only exist as manifest rows.
    pub const fn has_content(self) -> bool {
        !matches!(self, Self::Directory | Self::Symlink)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One row of the `Files` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub file_id: String,
    pub domain: String,
    pub relative_path: String,
    pub kind: EntryKind,
}
