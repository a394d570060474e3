//! Robot mode JSON output implementation.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::backup::{BackupInfo, BucketLayout};
use crate::domain::DomainPath;
use crate::error::LocateError;
use crate::resolve::{LookupMode, OnDiskLocation, Resolution, Warning};

use super::{Output, ReportOptions, RobotFormat};

/// JSON output implementation for AI agents and scripting.
pub struct RobotOutput {
    format: RobotFormat,
}

/// JSON document for one lookup.
#[derive(Debug, Serialize)]
pub struct RobotResolution<'a> {
    pub ok: bool,
    pub mode: LookupMode,
    pub query: &'a str,
    pub backup_root: &'a Path,
    pub backup: &'a BackupInfo,
    pub layout: BucketLayout,
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub candidates: &'a [DomainPath],
    pub found: usize,
    pub present: usize,
    pub matches: Vec<&'a OnDiskLocation>,
    pub warnings: &'a [Warning],
}

fn is_empty_slice<T>(slice: &&[T]) -> bool {
    slice.is_empty()
}

impl<'a> RobotResolution<'a> {
    pub fn new(resolution: &'a Resolution, options: ReportOptions) -> Self {
        let matches: Vec<&OnDiskLocation> = resolution.visible(options.include_dirs).collect();
        Self {
            ok: true,
            mode: resolution.mode,
            query: &resolution.query,
            backup_root: &resolution.backup_root,
            backup: &resolution.backup,
            layout: resolution.layout,
            candidates: &resolution.candidates,
            found: matches.len(),
            present: matches.iter().filter(|l| l.is_present()).count(),
            matches,
            warnings: &resolution.warnings,
        }
    }
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    /// Serialize `data`, falling back to an error document.
    fn to_json<T: Serialize + ?Sized>(data: &T, pretty: bool) -> String {
        let result = if pretty {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };
        result.unwrap_or_else(|e| {
            format!(r#"{{"error":true,"message":"serialization failed: {e}"}}"#)
        })
    }

    /// Output any serializable data as JSON to stdout.
    #[instrument(skip(self, data), fields(format = ?self.format))]
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let json = Self::to_json(data, matches!(self.format, RobotFormat::Json));
        trace!(json_len = json.len(), "JSON serialized");
        println!("{json}");
    }

    /// Output pretty JSON to stderr.
    fn output_json_pretty_stderr<T: Serialize>(&self, data: &T) {
        let json = Self::to_json(data, true);
        trace!(json_len = json.len(), "JSON error serialized");
        eprintln!("{json}");
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &LocateError) {
        debug!(error = %error, "Robot: error");
        self.output_json_pretty_stderr(&serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
            "exit_code": error.exit_code(),
        }));
    }

    #[instrument(skip_all, fields(query = %resolution.query))]
    fn resolution(&self, resolution: &Resolution, options: ReportOptions) {
        debug!(found = resolution.locations.len(), "Robot: resolution");
        self.output_json(&RobotResolution::new(resolution, options));
    }
}
