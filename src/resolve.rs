//! Turning lookup keys into stored-file locations.
//!
//! Both lookups return a [`Resolution`]: every matching manifest row paired
//! with where its content lives on disk, plus non-fatal [`Warning`]s for rows
//! whose content is missing. An empty resolution is a normal outcome.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::backup::{Backup, BackupInfo, BucketLayout, StoredFile};
use crate::domain::{BundleDomains, DomainPath, PathQuery};
use crate::error::Result;
use crate::manifest::{EntryKind, ManifestDb, ManifestEntry};

/// Which lookup produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    DevicePath,
    Bundle,
}

/// State of a row's stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    /// Content found on disk.
    Present,
    /// Content expected but absent.
    Missing,
    /// Directory or symlink row; nothing is stored.
    NotStored,
    /// The file ID cannot name a stored file.
    Malformed,
}

/// One manifest row and its on-disk location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnDiskLocation {
    /// Absolute path of the stored file when present, the expected path when
    /// missing, `None` otherwise.
    pub disk_path: Option<PathBuf>,
    pub domain: String,
    pub relative_path: String,
    pub file_id: String,
    pub kind: EntryKind,
    pub status: LocationStatus,
}

impl OnDiskLocation {
    /// Returns true if the content is on disk.
    pub fn is_present(&self) -> bool {
        self.status == LocationStatus::Present
    }

    /// Returns true for rows that hold file content.
    pub const fn has_content(&self) -> bool {
        self.kind.has_content()
    }
}

/// Non-fatal problems found while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Manifest row exists but its file is not in the backup.
    MissingOnDisk {
        file_id: String,
        domain: String,
        relative_path: String,
        expected: PathBuf,
    },
    /// Manifest row has an unusable file ID.
    MalformedFileId {
        file_id: String,
        domain: String,
        relative_path: String,
    },
    /// More than one row matched a single path.
    Ambiguous { query: String, matches: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOnDisk {
                domain,
                relative_path,
                expected,
                ..
            } => write!(
                f,
                "manifest entry present but file missing on disk: \
                 {domain}-{relative_path} (expected {})",
                expected.display()
            ),
            Self::MalformedFileId {
                file_id,
                domain,
                relative_path,
            } => write!(
                f,
                "malformed file ID '{file_id}' for {domain}-{relative_path}"
            ),
            Self::Ambiguous { query, matches } => write!(
                f,
                "{matches} manifest entries match '{query}'; all are listed"
            ),
        }
    }
}

/// Outcome of one lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub mode: LookupMode,
    pub query: String,
    pub backup_root: PathBuf,
    /// Metadata of the backup that was searched.
    pub backup: BackupInfo,
    pub layout: BucketLayout,
    /// Domain decompositions tried (device-path lookups only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<DomainPath>,
    pub locations: Vec<OnDiskLocation>,
    pub warnings: Vec<Warning>,
}

impl Resolution {
    /// Returns true if no manifest row matched.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations to report.
    ///
    /// A device-path lookup reports every matching row, directories
    /// included. A bundle lookup reports content rows, plus directories and
    /// symlinks when `include_dirs` is set.
    pub fn visible(&self, include_dirs: bool) -> impl Iterator<Item = &OnDiskLocation> {
        let all = include_dirs || self.mode == LookupMode::DevicePath;
        self.locations.iter().filter(move |l| all || l.has_content())
    }

    /// Number of rows whose content was found on disk.
    pub fn present_count(&self) -> usize {
        self.locations.iter().filter(|l| l.is_present()).count()
    }
}

/// Resolves a device path or manifest key (the `--device-path` lookup).
pub fn resolve_path(
    backup: &Backup,
    manifest: &ManifestDb,
    device_path: &str,
) -> Result<Resolution> {
    let query = PathQuery::parse(device_path)?;
    resolve_query(backup, manifest, device_path, &query)
}

/// Resolves an already parsed path query.
///
/// Every candidate decomposition is queried and the union returned. The
/// manifest has no revision column to pick a winner from, so when more than
/// one row matches all are kept and an [`Warning::Ambiguous`] is recorded.
#[instrument(skip(backup, manifest, query))]
pub fn resolve_query(
    backup: &Backup,
    manifest: &ManifestDb,
    raw: &str,
    query: &PathQuery,
) -> Result<Resolution> {
    let mut entries = match query {
        PathQuery::Device { candidates, .. } => {
            let mut rows = Vec::new();
            for candidate in candidates {
                debug!(
                    domain = %candidate.domain,
                    relative_path = %candidate.relative_path,
                    "Trying candidate"
                );
                rows.extend(manifest.find_exact(&candidate.domain, &candidate.relative_path)?);
            }
            rows
        }
        PathQuery::Manifest { key } => manifest.find_by_key(key)?,
    };
    sort_entries(&mut entries);

    let mut resolution = build_resolution(backup, LookupMode::DevicePath, raw, entries);
    resolution.candidates = query.candidates().to_vec();

    if resolution.locations.len() > 1 {
        debug!(matches = resolution.locations.len(), "Ambiguous path lookup");
        resolution.warnings.push(Warning::Ambiguous {
            query: raw.to_string(),
            matches: resolution.locations.len(),
        });
    }

    info!(
        found = resolution.locations.len(),
        present = resolution.present_count(),
        "Path lookup complete"
    );
    Ok(resolution)
}

/// Resolves every file belonging to `bundle_id` (the `--bundle-paths` lookup).
#[instrument(skip(backup, manifest))]
pub fn resolve_bundle(
    backup: &Backup,
    manifest: &ManifestDb,
    bundle_id: &str,
) -> Result<Resolution> {
    let bundle_id = bundle_id.trim();
    if let Some(app) = backup.application(bundle_id) {
        debug!(
            container = app.container_class.as_deref().unwrap_or("unknown"),
            "Bundle is an installed application"
        );
    } else {
        debug!("Bundle not listed in Manifest.plist applications");
    }

    let domains = BundleDomains::for_bundle(bundle_id);
    let mut entries = manifest.find_in_domains(&domains)?;
    sort_entries(&mut entries);

    let resolution = build_resolution(backup, LookupMode::Bundle, bundle_id, entries);
    info!(
        found = resolution.locations.len(),
        present = resolution.present_count(),
        "Bundle lookup complete"
    );
    Ok(resolution)
}

fn sort_entries(entries: &mut Vec<ManifestEntry>) {
    entries.sort_by(|a, b| {
        (&a.domain, &a.relative_path, &a.file_id).cmp(&(&b.domain, &b.relative_path, &b.file_id))
    });
    entries.dedup_by(|a, b| a.file_id == b.file_id && a.domain == b.domain);
}

fn build_resolution(
    backup: &Backup,
    mode: LookupMode,
    query: &str,
    entries: Vec<ManifestEntry>,
) -> Resolution {
    let mut locations = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();

    for entry in entries {
        let (location, warning) = locate(backup, entry);
        if let Some(w) = warning {
            debug!(warning = %w, "Backup integrity issue");
            warnings.push(w);
        }
        locations.push(location);
    }

    Resolution {
        mode,
        query: query.to_string(),
        backup_root: backup.root().to_path_buf(),
        backup: backup.info().clone(),
        layout: backup.layout(),
        candidates: Vec::new(),
        locations,
        warnings,
    }
}

/// Pairs a manifest row with its stored file.
fn locate(backup: &Backup, entry: ManifestEntry) -> (OnDiskLocation, Option<Warning>) {
    let ManifestEntry {
        file_id,
        domain,
        relative_path,
        kind,
    } = entry;

    if !kind.has_content() {
        let location = OnDiskLocation {
            disk_path: None,
            domain,
            relative_path,
            file_id,
            kind,
            status: LocationStatus::NotStored,
        };
        return (location, None);
    }

    let (disk_path, status, warning) = match backup.stored_file(&file_id) {
        StoredFile::Bucketed(path) | StoredFile::Flat(path) => {
            (Some(path), LocationStatus::Present, None)
        }
        StoredFile::Missing { expected } => {
            let warning = Warning::MissingOnDisk {
                file_id: file_id.clone(),
                domain: domain.clone(),
                relative_path: relative_path.clone(),
                expected: expected.clone(),
            };
            (Some(expected), LocationStatus::Missing, Some(warning))
        }
        StoredFile::Malformed => {
            let warning = Warning::MalformedFileId {
                file_id: file_id.clone(),
                domain: domain.clone(),
                relative_path: relative_path.clone(),
            };
            (None, LocationStatus::Malformed, Some(warning))
        }
    };

    let location = OnDiskLocation {
        disk_path,
        domain,
        relative_path,
        file_id,
        kind,
        status,
    };
    (location, warning)
}
