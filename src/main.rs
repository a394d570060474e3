//! iOS backup locator CLI - resolve device paths and bundle identifiers to
//! stored files inside a local backup.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};

use clap::Parser;
use tracing::debug;

use ibl::backup::Backup;
use ibl::cli::{Cli, Lookup};
use ibl::domain::PathQuery;
use ibl::error::Result;
use ibl::logging;
use ibl::manifest::ManifestDb;
use ibl::output::{Output, OutputMode, ReportOptions};
use ibl::resolve;

fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    logging::init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let output = OutputMode::from_cli(&cli).into_output();

    if let Err(e) = run(&cli, output.as_ref()) {
        output.error(&e);
        std::process::exit(e.exit_code());
    }
}

/// A lookup validated against the command line, before any disk access.
enum Request {
    Path { raw: String, query: PathQuery },
    Bundle(String),
}

fn run(cli: &Cli, output: &dyn Output) -> Result<()> {
    // Argument problems surface before the backup is touched.
    let request = match cli.lookup()? {
        Lookup::DevicePath(raw) => {
            let query = PathQuery::parse(&raw)?;
            Request::Path { raw, query }
        }
        Lookup::Bundle(bundle) => Request::Bundle(bundle),
    };

    let backup = Backup::open(&cli.backup_path)?;
    let manifest = ManifestDb::open(backup.manifest_db_path())?;
    debug!(manifest = %manifest.path().display(), "Manifest opened");

    let resolution = match &request {
        Request::Path { raw, query } => resolve::resolve_query(&backup, &manifest, raw, query)?,
        Request::Bundle(bundle) => resolve::resolve_bundle(&backup, &manifest, bundle)?,
    };

    output.resolution(
        &resolution,
        ReportOptions {
            include_dirs: cli.include_dirs,
        },
    );
    Ok(())
}
