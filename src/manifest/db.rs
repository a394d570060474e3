//! SQLite queries against `Manifest.db`.
//!
//! The connection is opened with `SQLITE_OPEN_READ_ONLY`; nothing in this
//! module can modify the backup. The connection closes when [`ManifestDb`]
//! is dropped.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Row, params, params_from_iter};
use tracing::{debug, info, instrument, trace};

use super::schema::{EntryKind, ManifestEntry};
use crate::domain::BundleDomains;
use crate::error::{LocateError, Result};

const SELECT_FILES: &str = "SELECT fileID, domain, relativePath, flags FROM Files";

/// Read-only handle on a manifest database.
pub struct ManifestDb {
    conn: Connection,
    path: PathBuf,
}

impl ManifestDb {
    /// Opens the manifest at `path` read-only and checks for the `Files` table.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LocateError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        debug!(path = %path.display(), "Opening manifest database");
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| LocateError::ManifestOpen {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.check_schema()?;
        info!(path = %path.display(), "Manifest database ready");
        Ok(db)
    }

    /// Creates an in-memory manifest holding `rows` of
    /// `(fileID, domain, relativePath, flags)`.
    #[cfg(test)]
    pub(crate) fn in_memory(rows: &[(&str, &str, &str, i64)]) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| LocateError::ManifestOpen {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        conn.execute_batch(
            "CREATE TABLE Files (
                fileID TEXT PRIMARY KEY, domain TEXT, relativePath TEXT, flags INTEGER, file BLOB
             );
             CREATE INDEX FilesDomainIdx ON Files(domain);
             CREATE INDEX FilesRelativePathIdx ON Files(relativePath);",
        )
        .map_err(|e| LocateError::ManifestQuery(e.to_string()))?;
        for (file_id, domain, relative_path, flags) in rows {
            conn.execute(
                "INSERT INTO Files (fileID, domain, relativePath, flags) VALUES (?1, ?2, ?3, ?4)",
                params![file_id, domain, relative_path, flags],
            )
            .map_err(|e| LocateError::ManifestQuery(e.to_string()))?;
        }
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Path the manifest was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fails unless the database is readable and has a `Files` table.
    fn check_schema(&self) -> Result<()> {
        let open_error = |reason: String| LocateError::ManifestOpen {
            path: self.path.display().to_string(),
            reason,
        };

        let tables: i64 = self
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'Files'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| open_error(e.to_string()))?;

        if tables == 0 {
            return Err(open_error("no Files table".to_string()));
        }
        Ok(())
    }

    /// Rows stored under exactly `(domain, relative_path)`.
    #[instrument(skip(self))]
    pub fn find_exact(&self, domain: &str, relative_path: &str) -> Result<Vec<ManifestEntry>> {
        let sql = format!("{SELECT_FILES} WHERE domain = ?1 AND relativePath = ?2 ORDER BY fileID");
        let entries = self.query(&sql, params![domain, relative_path])?;
        debug!(count = entries.len(), "Exact lookup");
        Ok(entries)
    }

    /// Rows whose `relativePath` or `domain-relativePath` equals `key`.
    #[instrument(skip(self))]
    pub fn find_by_key(&self, key: &str) -> Result<Vec<ManifestEntry>> {
        let sql = format!(
            "{SELECT_FILES} WHERE relativePath = ?1 OR domain || '-' || relativePath = ?1
             ORDER BY domain, relativePath, fileID"
        );
        let entries = self.query(&sql, params![key])?;
        debug!(count = entries.len(), "Key lookup");
        Ok(entries)
    }

    /// Rows in any of the bundle's domains, ordered by domain then path.
    ///
    /// Prefixes are compared with `substr` rather than `LIKE`, which is
    /// case-insensitive and treats `_` as a wildcard.
    #[instrument(
        skip(self),
        fields(exact = domains.exact.len(), prefixes = domains.prefixes.len())
    )]
    pub fn find_in_domains(&self, domains: &BundleDomains) -> Result<Vec<ManifestEntry>> {
        let mut clauses = Vec::new();
        let mut values: Vec<&str> = Vec::new();

        if !domains.exact.is_empty() {
            let placeholders: Vec<String> = (0..domains.exact.len())
                .map(|i| format!("?{}", values.len() + i + 1))
                .collect();
            clauses.push(format!("domain IN ({})", placeholders.join(", ")));
            values.extend(domains.exact.iter().map(String::as_str));
        }
        for prefix in &domains.prefixes {
            values.push(prefix);
            let n = values.len();
            clauses.push(format!("substr(domain, 1, length(?{n})) = ?{n}"));
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{SELECT_FILES} WHERE {} ORDER BY domain, relativePath, fileID",
            clauses.join(" OR ")
        );
        let entries = self.query(&sql, params_from_iter(values))?;
        debug!(count = entries.len(), "Domain lookup");
        Ok(entries)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<ManifestEntry>> {
        trace!(sql, "Preparing manifest query");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| LocateError::ManifestQuery(format!("Failed to prepare statement: {e}")))?;

        stmt.query_map(params, entry_from_row)
            .map_err(|e| LocateError::ManifestQuery(format!("Failed to query Files: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| LocateError::ManifestQuery(format!("Failed to read Files row: {e}")))
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ManifestEntry> {
    let file_id: Option<String> = row.get(0)?;
    let domain: Option<String> = row.get(1)?;
    let relative_path: Option<String> = row.get(2)?;
    let flags: Option<i64> = row.get(3)?;

    Ok(ManifestEntry {
        file_id: file_id.unwrap_or_default(),
        domain: domain.unwrap_or_default(),
        relative_path: relative_path.unwrap_or_default(),
        kind: EntryKind::from_flags(flags.unwrap_or_default()),
    })
}
