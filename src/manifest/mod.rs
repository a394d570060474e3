//! Read-only access to a backup's `Manifest.db`.
//!
//! The manifest is a SQLite database with a single table of interest:
//!
//! ```text
//! CREATE TABLE Files (
//!     fileID TEXT PRIMARY KEY,
//!     domain TEXT,
//!     relativePath TEXT,
//!     flags INTEGER,
//!     file BLOB
//! );
//! ```

mod db;
mod schema;

pub use db::ManifestDb;
pub use schema::{EntryKind, ManifestEntry};
