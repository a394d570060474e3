//! iOS version numbers as recorded in `Info.plist`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::LocateError;

/// Oldest iOS release whose backups use `Manifest.db`.
pub const MIN_SUPPORTED_VERSION: IosVersion = IosVersion::new(11, 0, 0);

/// A `major.minor.bugfix` iOS version. Missing components are zero.
///
/// Ordering is lexicographic over `(major, minor, bugfix)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IosVersion {
    pub major: u32,
    pub minor: u32,
    pub bugfix: u32,
}

impl IosVersion {
    pub const fn new(major: u32, minor: u32, bugfix: u32) -> Self {
        Self {
            major,
            minor,
            bugfix,
        }
    }

    /// Returns true if backups of this version can be read.
    pub fn is_supported(&self) -> bool {
        *self >= MIN_SUPPORTED_VERSION
    }
}

impl FromStr for IosVersion {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LocateError::InvalidVersion {
            value: s.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0u32; 3];
        for (i, component) in trimmed.split('.').enumerate() {
            if i >= parts.len() {
                return Err(invalid());
            }
            parts[i] = component.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for IosVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.bugfix)
    }
}

/// Serialized in its dotted form, e.g. `"17.4.1"`.
impl Serialize for IosVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
