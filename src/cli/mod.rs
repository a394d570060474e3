//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};

use crate::error::{LocateError, Result};

/// Locate files inside a local iOS backup by device path or bundle identifier.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "ibl", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("lookup")
        .args(["device_path", "bundle_paths"])
        .multiple(false)
))]
pub struct Cli {
    /// Root folder of the backup (contains Info.plist and Manifest.db)
    #[arg(long, value_name = "BACKUP_PATH", env = "IBL_BACKUP_PATH")]
    pub backup_path: PathBuf,

    /// Look up one iOS path (e.g. /var/mobile/Library/SMS/sms.db) or a
    /// manifest key (e.g. HomeDomain-Library/SMS/sms.db)
    #[arg(long, short = 'd', value_name = "PATH")]
    pub device_path: Option<String>,

    /// Look up every backed-up file of a bundle identifier
    /// (e.g. com.apple.MobileSMS)
    #[arg(long, short = 'b', value_name = "BUNDLE")]
    pub bundle_paths: Option<String>,

    /// Also list directory and symlink entries, which have no stored file
    #[arg(long)]
    pub include_dirs: bool,

    /// Output format (text for humans, json for agents/scripts)
    #[arg(long, short = 'f', default_value = "text", env = "IBL_FORMAT")]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long)]
    pub robot: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

/// The lookup requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    DevicePath(String),
    Bundle(String),
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }

    /// The selected lookup mode. Clap rejects both modes together; this
    /// rejects neither.
    pub fn lookup(&self) -> Result<Lookup> {
        match (&self.device_path, &self.bundle_paths) {
            (Some(path), None) => Ok(Lookup::DevicePath(path.clone())),
            (None, Some(bundle)) => Ok(Lookup::Bundle(bundle.clone())),
            _ => Err(LocateError::NoLookupMode),
        }
    }
}
