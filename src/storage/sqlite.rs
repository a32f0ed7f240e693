//! SQLite database layer

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;
use crate::storage::migrations;

/// How long a writer waits for a competing import to release the database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite database holding the content tree and the processed-node table.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        let schema_version = migrations::run_migrations(&conn)?;
        tracing::debug!(path = %path.display(), schema_version, "database opened");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
            schema_version,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            path: None,
            schema_version,
        })
    }

    /// Get a reference to the connection
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing this database, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::trace!(journal_mode, "journal mode set");
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("cri.db");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
        assert_eq!(db.schema_version(), migrations::SCHEMA_VERSION);
    }

    #[test]
    fn reopen_keeps_schema_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cri.db");

        drop(Database::open(&path).unwrap());
        let db = Database::open(&path).unwrap();
        assert_eq!(db.schema_version(), migrations::SCHEMA_VERSION);
    }

    #[test]
    fn in_memory_database_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.path().is_none());
        let count: i64 = db
            .conn()
            .query_row("SELECT count(*) FROM processed_nodes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
