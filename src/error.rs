//! Error types for backup lookup operations.

use thiserror::Error;

/// Primary error type for backup lookups.
#[derive(Error, Debug)]
pub enum LocateError {
    // Configuration errors
    #[error("No lookup mode selected: pass --device-path or --bundle-paths")]
    NoLookupMode,

    #[error("Path is not mappable to a backup domain: {path}")]
    PathNotMappable { path: String },

    // Backup validation errors
    #[error("Backup directory not found: {path}")]
    BackupNotFound { path: String },

    #[error("Backup path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Backup directory is not readable: {path}: {reason}")]
    BackupUnreadable { path: String, reason: String },

    #[error("Backup metadata not found: {path}")]
    MetadataMissing { path: String },

    #[error("Failed to parse backup metadata {path}: {reason}")]
    MetadataParse { path: String, reason: String },

    #[error("Backup metadata has no 'Product Version' entry")]
    MissingProductVersion,

    #[error("Invalid iOS version string '{value}'")]
    InvalidVersion { value: String },

    #[error("Backup of iOS {found} is not supported (minimum {minimum})")]
    UnsupportedVersion { found: String, minimum: String },

    #[error("Backup is encrypted: {path}")]
    EncryptedBackup { path: String },

    // Manifest errors
    #[error("Manifest database not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Failed to open manifest database {path}: {reason}")]
    ManifestOpen { path: String, reason: String },

    #[error("Manifest query failed: {0}")]
    ManifestQuery(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl LocateError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoLookupMode
                | Self::PathNotMappable { .. }
                | Self::BackupNotFound { .. }
                | Self::NotADirectory { .. }
                | Self::MetadataMissing { .. }
                | Self::EncryptedBackup { .. }
        )
    }

    /// Returns true for argument problems detected before the backup is opened.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::NoLookupMode | Self::PathNotMappable { .. })
    }

    /// Process exit code for this error.
    ///
    /// Configuration errors share clap's usage exit code.
    pub const fn exit_code(&self) -> i32 {
        if self.is_configuration_error() { 2 } else { 1 }
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoLookupMode => Some("Use --device-path <PATH> or --bundle-paths <BUNDLE>"),
            Self::PathNotMappable { .. } => Some(
                "Use a path under /var/mobile, /var/root, ... or a domain-qualified key \
                 such as HomeDomain-Library/SMS/sms.db",
            ),
            Self::BackupNotFound { .. } | Self::NotADirectory { .. } => Some(
                "Point --backup-path at the backup folder that contains Info.plist and Manifest.db",
            ),
            Self::MetadataMissing { .. } | Self::ManifestNotFound { .. } => {
                Some("The folder does not look like a complete device backup")
            }
            Self::UnsupportedVersion { .. } => {
                Some("Only backups of iOS 11.0 or later are supported")
            }
            Self::EncryptedBackup { .. } => {
                Some("Create an unencrypted backup or decrypt it first")
            }
            _ => None,
        }
    }
}

/// Convenience type alias for Results using LocateError.
pub type Result<T> = std::result::Result<T, LocateError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| LocateError::Other(format!("{}: {e}", f().into())))
    }
}
