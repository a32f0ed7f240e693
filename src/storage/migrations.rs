//! Database migrations

use rusqlite::Connection;

use crate::error::{CriError, Result};

const MIGRATIONS: [&str; 2] = [
    include_str!("../../migrations/001_content_nodes.sql"),
    include_str!("../../migrations/002_processed_nodes.sql"),
];

pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Run all pending migrations, tracking progress in `PRAGMA user_version`.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let current_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let target_version = (idx + 1) as u32;
        if current_version >= target_version {
            continue;
        }

        tracing::debug!(target_version, "applying migration");
        conn.execute_batch(sql).map_err(|err| {
            tracing::error!(target_version, error = %err, "migration failed");
            CriError::Database(err)
        })?;
        conn.pragma_update(None, "user_version", target_version)?;
    }

    Ok(SCHEMA_VERSION)
}
