//! Human-friendly text output.
//!
//! Stdout carries one line per stored file so the output can be piped:
//! the bare path for device-path lookups, `<path> -> <domain>-<relative path>`
//! for bundle lookups.

use colored::Colorize;
use tracing::{debug, instrument};

use crate::error::LocateError;
use crate::resolve::{LocationStatus, LookupMode, OnDiskLocation, Resolution};

use super::{Output, ReportOptions};

/// Terminal output implementation for human users.
pub struct HumanOutput {
    quiet: bool,
}

impl HumanOutput {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// The stdout line for one location, if it has one.
    pub fn format_location(mode: LookupMode, location: &OnDiskLocation) -> Option<String> {
        let manifest_key = format!("{}-{}", location.domain, location.relative_path);
        match (location.status, &location.disk_path) {
            (LocationStatus::Present, Some(path)) => Some(match mode {
                LookupMode::DevicePath => path.display().to_string(),
                LookupMode::Bundle => format!("{} -> {manifest_key}", path.display()),
            }),
            (LocationStatus::NotStored, _) => {
                Some(format!("({}) -> {manifest_key}", location.kind.as_str()))
            }
            _ => None,
        }
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &LocateError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        eprintln!("{}: {}", "Error".red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", "Hint".yellow(), suggestion);
        }
    }

    #[instrument(skip_all, fields(query = %resolution.query))]
    fn resolution(&self, resolution: &Resolution, options: ReportOptions) {
        for warning in &resolution.warnings {
            eprintln!("{}: {}", "Warning".yellow().bold(), warning);
        }

        let visible: Vec<&OnDiskLocation> = resolution.visible(options.include_dirs).collect();
        if visible.is_empty() {
            println!("No match for '{}' in manifest", resolution.query);
            return;
        }

        for location in &visible {
            if let Some(line) = Self::format_location(resolution.mode, location) {
                println!("{line}");
            }
        }

        if !self.quiet {
            eprintln!(
                "{}",
                format!(
                    "{} of {} entries found on disk",
                    resolution.present_count(),
                    visible.len()
                )
                .dimmed()
            );
        }
    }
}
