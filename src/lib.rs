//! iOS backup locator library - find where a device file lives inside a
//! local Finder/iTunes backup.
//!
//! This library exposes the core functionality of the `ibl` CLI for use in
//! tests and potentially other applications.
//!
//! # Modules
//!
//! - `backup`: Backup validation, metadata plists and bucket layout
//! - `domain`: Device path to manifest domain mapping
//! - `manifest`: Read-only `Manifest.db` queries
//! - `resolve`: Path and bundle lookups
//! - `output`: Output mode abstraction (robot/human)
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod backup;
pub mod cli;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod resolve;
