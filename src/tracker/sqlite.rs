//! Processed-node entries stored in the `processed_nodes` table.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};

use crate::content::NodeRef;
use crate::error::Result;
use crate::storage::Database;

use super::{ProcessedNode, ProcessedNodeStore};

const COLUMNS: &str =
    "importer_kind, external_identifier, node_identifier, node_path, workspace, processed_at";

fn processed_from_row(row: &Row<'_>) -> rusqlite::Result<ProcessedNode> {
    let raw: String = row.get(5)?;
    let processed_at = DateTime::parse_from_rfc3339(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err)))?
        .with_timezone(&Utc);
    Ok(ProcessedNode {
        importer_kind: row.get(0)?,
        external_identifier: row.get(1)?,
        node_identifier: row.get(2)?,
        node_path: row.get(3)?,
        workspace: row.get(4)?,
        processed_at,
    })
}

impl ProcessedNodeStore for Database {
    fn get(&self, importer_kind: &str, external_identifier: &str) -> Result<Option<ProcessedNode>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM processed_nodes \
             WHERE importer_kind = ?1 AND external_identifier = ?2"
        );
        let entry = self
            .conn()
            .query_row(&sql, params![importer_kind, external_identifier], processed_from_row)
            .optional()?;
        Ok(entry)
    }

    fn set(
        &self,
        importer_kind: &str,
        external_identifier: &str,
        node: &NodeRef,
    ) -> Result<ProcessedNode> {
        let entry = ProcessedNode::new(importer_kind, external_identifier, node);
        self.conn().execute(
            "INSERT INTO processed_nodes \
             (importer_kind, external_identifier, node_identifier, node_path, workspace, processed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(importer_kind, external_identifier) DO UPDATE SET \
             node_identifier = excluded.node_identifier, \
             node_path = excluded.node_path, \
             workspace = excluded.workspace, \
             processed_at = excluded.processed_at",
            params![
                entry.importer_kind,
                entry.external_identifier,
                entry.node_identifier,
                entry.node_path,
                entry.workspace,
                entry.processed_at.to_rfc3339()
            ],
        )?;
        Ok(entry)
    }
}

impl Database {
    /// List processed entries, optionally for one importer kind.
    pub fn list_processed(
        &self,
        importer_kind: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ProcessedNode>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM processed_nodes \
             WHERE ?1 IS NULL OR importer_kind = ?1 \
             ORDER BY importer_kind, processed_at, external_identifier \
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params![importer_kind, limit as i64, offset as i64],
            processed_from_row,
        )?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Count processed entries, optionally for one importer kind.
    pub fn count_processed(&self, importer_kind: Option<&str>) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM processed_nodes WHERE ?1 IS NULL OR importer_kind = ?1",
            params![importer_kind],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Forget processed entries so the next run imports the records again.
    ///
    /// Returns the number of removed entries.
    pub fn reset_processed(&self, importer_kind: Option<&str>) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM processed_nodes WHERE ?1 IS NULL OR importer_kind = ?1",
            params![importer_kind],
        )?;
        tracing::info!(importer_kind = ?importer_kind, removed, "processed entries reset");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn node(identifier: &str) -> NodeRef {
        NodeRef {
            identifier: identifier.into(),
            workspace: "live".into(),
            path: format!("/sites/demo/products/{identifier}"),
            name: identifier.into(),
            node_type: "product".into(),
            hidden: false,
        }
    }

    #[test]
    fn get_missing_entry_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get("ProductImporter", "SKU-1").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_and_get_reads_back() {
        let db = Database::open_in_memory().unwrap();
        db.set("ProductImporter", "SKU-1", &node("a")).unwrap();
        db.set("ProductImporter", "SKU-1", &node("b")).unwrap();

        let entry = db.get("ProductImporter", "SKU-1").unwrap().unwrap();
        assert_eq!(entry.node_identifier, "b");
        assert_eq!(entry.node_path, "/sites/demo/products/b");
        assert_eq!(db.count_processed(None).unwrap(), 1);
    }

    #[test]
    fn entries_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cri.db");
        {
            let db = Database::open(&path).unwrap();
            db.set("ProductImporter", "SKU-1", &node("a")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        let entry = db.get("ProductImporter", "SKU-1").unwrap().unwrap();
        assert_eq!(entry.node_identifier, "a");
    }

    #[test]
    fn list_count_and_reset_by_kind() {
        let db = Database::open_in_memory().unwrap();
        db.set("ProductImporter", "1", &node("p1")).unwrap();
        db.set("ProductImporter", "2", &node("p2")).unwrap();
        db.set("CategoryImporter", "1", &node("c1")).unwrap();

        assert_eq!(db.count_processed(Some("ProductImporter")).unwrap(), 2);
        assert_eq!(db.list_processed(Some("CategoryImporter"), 10, 0).unwrap().len(), 1);
        assert_eq!(db.list_processed(None, 2, 0).unwrap().len(), 2);

        assert_eq!(db.reset_processed(Some("ProductImporter")).unwrap(), 2);
        assert_eq!(db.count_processed(None).unwrap(), 1);
        assert!(db.get("CategoryImporter", "1").unwrap().is_some());

        assert_eq!(db.reset_processed(None).unwrap(), 1);
        assert_eq!(db.count_processed(None).unwrap(), 0);
    }
}
