//! Property-list metadata stored alongside a backup.
//!
//! A backup root carries up to three plists:
//!
//! - `Info.plist`: device and OS details, always present
//! - `Manifest.plist`: encryption flag and installed applications
//! - `Status.plist`: whether the last backup run finished

use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::version::IosVersion;
use crate::error::{LocateError, Result};

pub const INFO_PLIST: &str = "Info.plist";
pub const MANIFEST_PLIST: &str = "Manifest.plist";
pub const STATUS_PLIST: &str = "Status.plist";

/// Raw `Info.plist` contents. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoPlist {
    #[serde(rename = "Product Version")]
    pub product_version: Option<String>,
    #[serde(rename = "Device Name")]
    pub device_name: Option<String>,
    #[serde(rename = "Product Type")]
    pub product_type: Option<String>,
    #[serde(rename = "Target Identifier")]
    pub target_identifier: Option<String>,
    #[serde(rename = "Last Backup Date")]
    pub last_backup_date: Option<plist::Date>,
}

/// Raw `Manifest.plist` contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestPlist {
    #[serde(rename = "IsEncrypted", default)]
    pub is_encrypted: bool,
    #[serde(rename = "Version")]
    pub version: Option<String>,
    #[serde(rename = "Applications", default)]
    pub applications: BTreeMap<String, ApplicationEntry>,
}

/// An installed application as listed in `Manifest.plist`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApplicationEntry {
    #[serde(rename = "CFBundleIdentifier")]
    pub bundle_id: Option<String>,
    #[serde(rename = "CFBundleVersion")]
    pub bundle_version: Option<String>,
    #[serde(rename = "Path")]
    pub path: Option<String>,
    #[serde(rename = "ContainerContentClass")]
    pub container_class: Option<String>,
}

/// Raw `Status.plist` contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPlist {
    #[serde(rename = "SnapshotState")]
    pub snapshot_state: Option<String>,
    #[serde(rename = "IsFullBackup")]
    pub is_full_backup: Option<bool>,
}

impl StatusPlist {
    /// Returns true unless the plist records an unfinished snapshot.
    pub fn is_finished(&self) -> bool {
        self.snapshot_state.as_deref().is_none_or(|s| s == "finished")
    }
}

/// Validated summary of a backup's metadata.
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub ios_version: IosVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_state: Option<String>,
}

impl BackupInfo {
    pub fn new(info: InfoPlist, ios_version: IosVersion) -> Self {
        Self {
            ios_version,
            device_name: info.device_name,
            product_type: info.product_type,
            target_identifier: info.target_identifier,
            last_backup_date: info
                .last_backup_date
                .map(|d| DateTime::<Utc>::from(SystemTime::from(d))),
            snapshot_state: None,
        }
    }
}

/// Reads a binary or XML plist into `T`.
pub fn read_plist<T: DeserializeOwned>(path: &Path) -> Result<T> {
    trace!(path = %path.display(), "Reading plist");
    plist::from_file(path).map_err(|e| LocateError::MetadataParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
