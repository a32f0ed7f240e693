//! Content tree stored in the `content_nodes` table.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CriError, Result};
use crate::storage::Database;

use super::path::{self, ROOT_PATH};
use super::{ContentContext, ContentRepository, NewNode, NodeRef};

const NODE_COLUMNS: &str = "identifier, workspace, path, name, node_type, hidden";

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<NodeRef> {
    Ok(NodeRef {
        identifier: row.get(0)?,
        workspace: row.get(1)?,
        path: row.get(2)?,
        name: row.get(3)?,
        node_type: row.get(4)?,
        hidden: row.get(5)?,
    })
}

impl Database {
    fn find_node(
        &self,
        context: &ContentContext,
        workspace: &str,
        node_path: &str,
    ) -> Result<Option<NodeRef>> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM content_nodes \
             WHERE workspace = ?1 AND path = ?2 AND (?3 OR hidden = 0)"
        );
        let node = self
            .conn()
            .query_row(
                &sql,
                params![workspace, node_path, context.invisible_content_shown],
                node_from_row,
            )
            .optional()?;
        Ok(node)
    }
}

impl ContentRepository for Database {
    fn root_node(&self, context: &ContentContext) -> Result<NodeRef> {
        self.conn().execute(
            "INSERT OR IGNORE INTO content_nodes \
             (identifier, workspace, path, parent_path, name, node_type, hidden, created_at) \
             VALUES (?1, ?2, ?3, NULL, '', 'root', 0, ?4)",
            params![
                Uuid::new_v4().to_string(),
                context.workspace_name,
                ROOT_PATH,
                Utc::now().to_rfc3339()
            ],
        )?;
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM content_nodes WHERE workspace = ?1 AND path = ?2"
        );
        let root = self.conn().query_row(
            &sql,
            params![context.workspace_name, ROOT_PATH],
            node_from_row,
        )?;
        Ok(root)
    }

    fn node(&self, context: &ContentContext, node_path: &str) -> Result<Option<NodeRef>> {
        let normalized = path::normalize(node_path)?;
        if normalized == ROOT_PATH {
            return self.root_node(context).map(Some);
        }
        self.find_node(context, &context.workspace_name, &normalized)
    }

    fn child(
        &self,
        context: &ContentContext,
        parent: &NodeRef,
        name: &str,
    ) -> Result<Option<NodeRef>> {
        path::validate_node_name(name)?;
        self.find_node(context, &parent.workspace, &path::join(&parent.path, name))
    }

    fn create_child(&self, parent: &NodeRef, name: &str, node: NewNode) -> Result<NodeRef> {
        path::validate_node_name(name)?;
        let child_path = path::join(&parent.path, name);
        let properties_json = serde_json::to_string(&Value::Object(node.properties))?;
        let created = NodeRef {
            identifier: Uuid::new_v4().to_string(),
            workspace: parent.workspace.clone(),
            path: child_path,
            name: name.to_string(),
            node_type: node.node_type,
            hidden: node.hidden,
        };

        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO content_nodes \
             (identifier, workspace, path, parent_path, name, node_type, hidden, properties_json, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                created.identifier,
                created.workspace,
                created.path,
                parent.path,
                created.name,
                created.node_type,
                created.hidden,
                properties_json,
                Utc::now().to_rfc3339()
            ],
        )?;
        if inserted == 0 {
            return Err(CriError::NodeExists(created.path));
        }
        Ok(created)
    }

    fn children(&self, context: &ContentContext, parent: &NodeRef) -> Result<Vec<NodeRef>> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM content_nodes \
             WHERE workspace = ?1 AND parent_path = ?2 AND (?3 OR hidden = 0) \
             ORDER BY name"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params![parent.workspace, parent.path, context.invisible_content_shown],
            node_from_row,
        )?;
        let mut children = Vec::new();
        for row in rows {
            children.push(row?);
        }
        Ok(children)
    }

    fn properties(&self, node: &NodeRef) -> Result<Map<String, Value>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT properties_json FROM content_nodes WHERE identifier = ?1",
                [&node.identifier],
                |row| row.get(0),
            )
            .optional()?;
        let raw = raw.ok_or_else(|| CriError::NodeNotFound(node.path.clone()))?;
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn update_properties(&self, node: &NodeRef, properties: Map<String, Value>) -> Result<()> {
        let mut merged = self.properties(node)?;
        merged.extend(properties);
        let properties_json = serde_json::to_string(&Value::Object(merged))?;
        let updated = self.conn().execute(
            "UPDATE content_nodes SET properties_json = ?1 WHERE identifier = ?2",
            params![properties_json, node.identifier],
        )?;
        if updated == 0 {
            return Err(CriError::NodeNotFound(node.path.clone()));
        }
        Ok(())
    }
}
