//! Backup root discovery and validation.
//!
//! # Directory Structure
//!
//! ```text
//! <backup root>/
//! ├── Info.plist        # device + iOS version
//! ├── Manifest.plist    # encryption flag, installed apps
//! ├── Manifest.db       # (domain, relativePath) -> fileID
//! ├── Status.plist      # snapshot state
//! ├── 3d/
//! │   └── 3d0d7e5fb2ce288813306e4d4636395e047a3d28
//! └── ...
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ibl::backup::Backup;
//!
//! let backup = Backup::open("/path/to/backup")?;
//! println!("iOS {}", backup.info().ios_version);
//! ```

mod info;
mod layout;
mod version;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

pub use info::{
    ApplicationEntry, BackupInfo, INFO_PLIST, InfoPlist, MANIFEST_PLIST, ManifestPlist,
    STATUS_PLIST, StatusPlist, read_plist,
};
pub use layout::{
    BucketLayout, StoredFile, derive_disk_path, is_bucket_name, is_valid_file_id, layout_path,
};
pub use version::{IosVersion, MIN_SUPPORTED_VERSION};

use crate::error::{LocateError, Result};

/// File name of the manifest store inside a backup root.
pub const MANIFEST_DB: &str = "Manifest.db";

/// A validated, read-only view of a backup directory.
#[derive(Debug, Clone)]
pub struct Backup {
    root: PathBuf,
    info: BackupInfo,
    applications: BTreeMap<String, ApplicationEntry>,
    layout: BucketLayout,
}

impl Backup {
    /// Opens and validates the backup rooted at `root`.
    ///
    /// Fails if the directory is missing or unreadable, if `Info.plist` is
    /// absent or unparseable, if the recorded iOS version is older than
    /// [`MIN_SUPPORTED_VERSION`], or if `Manifest.plist` marks the backup as
    /// encrypted. An unfinished `Status.plist` only logs a warning.
    #[instrument(skip_all, fields(path = %root.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        let display = root.display().to_string();

        let meta = match fs::metadata(&root) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LocateError::BackupNotFound { path: display });
            }
            Err(e) => {
                return Err(LocateError::BackupUnreadable {
                    path: display,
                    reason: e.to_string(),
                });
            }
        };
        if !meta.is_dir() {
            return Err(LocateError::NotADirectory { path: display });
        }
        if let Err(e) = fs::read_dir(&root) {
            return Err(LocateError::BackupUnreadable {
                path: display,
                reason: e.to_string(),
            });
        }

        let info_path = root.join(INFO_PLIST);
        if !info_path.is_file() {
            return Err(LocateError::MetadataMissing {
                path: info_path.display().to_string(),
            });
        }
        let raw_info: InfoPlist = read_plist(&info_path)?;
        let raw_version = raw_info
            .product_version
            .as_deref()
            .ok_or(LocateError::MissingProductVersion)?;
        let ios_version: IosVersion = raw_version.parse()?;
        if !ios_version.is_supported() {
            return Err(LocateError::UnsupportedVersion {
                found: ios_version.to_string(),
                minimum: MIN_SUPPORTED_VERSION.to_string(),
            });
        }
        let mut info = BackupInfo::new(raw_info, ios_version);

        let manifest_plist = root.join(MANIFEST_PLIST);
        let applications = if manifest_plist.is_file() {
            let manifest: ManifestPlist = read_plist(&manifest_plist)?;
            if manifest.is_encrypted {
                return Err(LocateError::EncryptedBackup { path: display });
            }
            debug!(
                apps = manifest.applications.len(),
                version = manifest.version.as_deref().unwrap_or("unknown"),
                "Read Manifest.plist"
            );
            manifest.applications
        } else {
            debug!("No Manifest.plist, skipping encryption check");
            BTreeMap::new()
        };

        let status_path = root.join(STATUS_PLIST);
        if status_path.is_file() {
            match read_plist::<StatusPlist>(&status_path) {
                Ok(status) => {
                    if !status.is_finished() {
                        warn!(
                            state = status.snapshot_state.as_deref().unwrap_or_default(),
                            "Last backup did not finish; some files may be missing"
                        );
                    }
                    info.snapshot_state = status.snapshot_state;
                }
                Err(e) => warn!(error = %e, "Ignoring unreadable Status.plist"),
            }
        }

        let layout = BucketLayout::detect(&root)?;

        info!(
            ios = %info.ios_version,
            device = info.device_name.as_deref().unwrap_or("unknown"),
            ?layout,
            "Backup validated"
        );
        Ok(Self {
            root,
            info,
            applications,
            layout,
        })
    }

    /// Absolute backup root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn info(&self) -> &BackupInfo {
        &self.info
    }

    pub const fn layout(&self) -> BucketLayout {
        self.layout
    }

    /// Path of `Manifest.db` (may not exist).
    pub fn manifest_db_path(&self) -> PathBuf {
        self.root.join(MANIFEST_DB)
    }

    /// Installed application record from `Manifest.plist`, if listed.
    pub fn application(&self, bundle_id: &str) -> Option<&ApplicationEntry> {
        self.applications.get(bundle_id)
    }

    /// Locates the stored copy of `file_id` in this backup.
    pub fn stored_file(&self, file_id: &str) -> StoredFile {
        derive_disk_path(&self.root, file_id, self.layout)
    }
}
