//! Common test utilities for the backup locator.
//!
//! - `cli`: CLI runner with output verification and fluent assertions
//! - `fixtures`: Fixture backups with a real `Manifest.db`
//! - `assertions`: Output shape checks
#![allow(dead_code)]


use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
