//! Output mode abstraction for robot and human output.

use crate::cli::Cli;
use crate::error::LocateError;
use crate::resolve::Resolution;

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// What to include when reporting a resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// List directory and symlink rows too.
    pub include_dirs: bool,
}

/// Determines how results are rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for AI agents and scripting.
    Robot(RobotFormat),
    /// Plain or colored terminal output for human users.
    Human { quiet: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human { quiet: cli.quiet }
        }
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human { quiet } => Box::new(HumanOutput::new(quiet)),
        }
    }
}

/// Trait for all output operations.
///
/// Lookups call these methods without knowing the output mode. Results go to
/// stdout; errors and warnings go to stderr.
pub trait Output {
    /// Report a fatal error.
    fn error(&self, error: &LocateError);

    /// Report the outcome of a lookup, including its warnings.
    fn resolution(&self, resolution: &Resolution, options: ReportOptions);
}
