//! Mapping between device paths and manifest domains.
//!
//! The manifest never stores absolute device paths. Each row names a domain
//! (a logical root such as `HomeDomain` for `/var/mobile`) and a path
//! relative to that root. [`DOMAIN_RULES`] lists the well-known roots; a
//! device path can match several rules, and every match becomes a candidate
//! `(domain, relativePath)` pair.

use serde::Serialize;

use crate::error::{LocateError, Result};

/// One entry of the device-path to domain table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainRule {
    /// Device paths under this prefix may belong to `domain`.
    pub device_prefix: &'static str,
    /// Manifest domain name.
    pub domain: &'static str,
    /// Device directory that `relativePath` is relative to.
    pub root: &'static str,
}

const fn rule(device_prefix: &'static str, domain: &'static str, root: &'static str) -> DomainRule {
    DomainRule {
        device_prefix,
        domain,
        root,
    }
}

/// Well-known system domains, most specific prefix first.
pub const DOMAIN_RULES: &[DomainRule] = &[
    rule("/var/mobile/Media/DCIM/", "CameraRollDomain", "/var/mobile"),
    rule("/var/mobile/Media/PhotoData/", "CameraRollDomain", "/var/mobile"),
    rule("/var/mobile/Media/iTunes_Control/Ringtones/", "TonesDomain", "/var/mobile"),
    rule("/var/mobile/Media/Books/", "BooksDomain", "/var/mobile/Media/Books"),
    rule("/var/mobile/Media/", "MediaDomain", "/var/mobile"),
    rule("/var/mobile/Library/Health/", "HealthDomain", "/var/mobile/Library"),
    rule("/var/mobile/Library/homed/", "HomeKitDomain", "/var/mobile"),
    rule("/var/mobile/", "HomeDomain", "/var/mobile"),
    rule("/var/root/", "RootDomain", "/var/root"),
    rule("/var/Keychains/", "KeychainDomain", "/var/Keychains"),
    rule("/var/wireless/", "WirelessDomain", "/var/wireless"),
    rule("/var/Managed Preferences/", "ManagedPreferencesDomain", "/var/Managed Preferences"),
    rule("/var/preferences/", "SystemPreferencesDomain", "/var/preferences"),
    rule("/var/db/", "DatabaseDomain", "/var/db"),
    rule("/var/MobileDevice/", "MobileDeviceDomain", "/var/MobileDevice"),
    rule("/var/installd/", "InstallDomain", "/var/installd"),
    rule("/var/protected/", "ProtectedDomain", "/var/protected"),
    rule("/var/networkd/", "NetworkDomain", "/var/networkd"),
];

/// A `(domain, relativePath)` pair as stored in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainPath {
    pub domain: String,
    pub relative_path: String,
}

/// A parsed `--device-path` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathQuery {
    /// Absolute device path with its candidate domain decompositions.
    Device {
        path: String,
        candidates: Vec<DomainPath>,
    },
    /// Manifest-native key: `Domain-relative/path` or a bare relative path.
    Manifest { key: String },
}

impl PathQuery {
    /// Parses a lookup argument without touching the backup.
    ///
    /// Absolute paths must fall under a known domain root.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            if trimmed.is_empty() {
                return Err(LocateError::PathNotMappable {
                    path: raw.to_string(),
                });
            }
            return Ok(Self::Manifest {
                key: trimmed.to_string(),
            });
        }

        let path = normalize_device_path(trimmed);
        let candidates = domain_candidates(&path);
        if candidates.is_empty() {
            return Err(LocateError::PathNotMappable {
                path: raw.to_string(),
            });
        }
        Ok(Self::Device { path, candidates })
    }

    /// Candidate decompositions (empty for manifest-native keys).
    pub fn candidates(&self) -> &[DomainPath] {
        match self {
            Self::Device { candidates, .. } => candidates,
            Self::Manifest { .. } => &[],
        }
    }
}

/// Canonical form of a device path.
///
/// Strips the `/private` firmlink prefix, collapses repeated slashes and
/// drops a trailing slash.
pub fn normalize_device_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for segment in raw.split('/').filter(|s| !s.is_empty() && *s != ".") {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }

    match out.strip_prefix("/private") {
        Some(rest) if rest.starts_with("/var/") || rest == "/var" => rest.to_string(),
        _ => out,
    }
}

/// All `(domain, relativePath)` decompositions of a normalized device path.
pub fn domain_candidates(path: &str) -> Vec<DomainPath> {
    let mut candidates: Vec<DomainPath> = Vec::new();

    for rule in DOMAIN_RULES {
        let dir = rule.device_prefix.trim_end_matches('/');
        if path != dir && !path.starts_with(rule.device_prefix) {
            continue;
        }
        let Some(rest) = path.strip_prefix(rule.root) else {
            continue;
        };
        let relative_path = rest.trim_start_matches('/').to_string();
        let candidate = DomainPath {
            domain: rule.domain.to_string(),
            relative_path,
        };
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    candidates
}

/// Domains that hold the files of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleDomains {
    /// Domains matched by equality.
    pub exact: Vec<String>,
    /// Domain prefixes, each ending in `.` so matches stop at a bundle-id
    /// component boundary.
    pub prefixes: Vec<String>,
}

impl BundleDomains {
    /// Domains for `bundle_id`:
    ///
    /// - `AppDomain-<id>`: the app's data container
    /// - `AppDomainPlugin-<id>.*`: its extensions
    /// - `AppDomainGroup-group.<id>` and `AppDomainGroup-group.<id>.*`:
    ///   group containers named after it
    /// - `<id>` itself, so a full domain name also works
    pub fn for_bundle(bundle_id: &str) -> Self {
        let id = bundle_id.trim();
        Self {
            exact: vec![
                id.to_string(),
                format!("AppDomain-{id}"),
                format!("AppDomainGroup-group.{id}"),
            ],
            prefixes: vec![
                format!("AppDomainPlugin-{id}."),
                format!("AppDomainGroup-group.{id}."),
            ],
        }
    }

    /// Returns true if `domain` belongs to this bundle.
    pub fn matches(&self, domain: &str) -> bool {
        self.exact.iter().any(|d| d == domain)
            || self.prefixes.iter().any(|p| domain.starts_with(p.as_str()))
    }
}
