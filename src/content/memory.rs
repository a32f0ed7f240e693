//! Process-local content repository.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CriError, Result};

use super::path::{self, ROOT_PATH};
use super::{ContentContext, ContentRepository, NewNode, NodeRef};

#[derive(Debug, Clone)]
struct StoredNode {
    node: NodeRef,
    properties: Map<String, Value>,
}

/// Content repository kept in memory, keyed by (workspace, path).
#[derive(Debug, Default)]
pub struct MemoryContentRepository {
    nodes: Mutex<BTreeMap<(String, String), StoredNode>>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes across all workspaces, roots included.
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }

    fn visible(context: &ContentContext, stored: &StoredNode) -> bool {
        context.invisible_content_shown || !stored.node.hidden
    }
}

impl ContentRepository for MemoryContentRepository {
    fn root_node(&self, context: &ContentContext) -> Result<NodeRef> {
        let mut nodes = self.nodes.lock();
        let key = (context.workspace_name.clone(), ROOT_PATH.to_string());
        let stored = nodes.entry(key).or_insert_with(|| StoredNode {
            node: NodeRef {
                identifier: Uuid::new_v4().to_string(),
                workspace: context.workspace_name.clone(),
                path: ROOT_PATH.to_string(),
                name: String::new(),
                node_type: "root".to_string(),
                hidden: false,
            },
            properties: Map::new(),
        });
        Ok(stored.node.clone())
    }

    fn node(&self, context: &ContentContext, node_path: &str) -> Result<Option<NodeRef>> {
        let normalized = path::normalize(node_path)?;
        if normalized == ROOT_PATH {
            return self.root_node(context).map(Some);
        }
        let nodes = self.nodes.lock();
        Ok(nodes
            .get(&(context.workspace_name.clone(), normalized))
            .filter(|stored| Self::visible(context, stored))
            .map(|stored| stored.node.clone()))
    }

    fn child(
        &self,
        context: &ContentContext,
        parent: &NodeRef,
        name: &str,
    ) -> Result<Option<NodeRef>> {
        path::validate_node_name(name)?;
        let nodes = self.nodes.lock();
        Ok(nodes
            .get(&(parent.workspace.clone(), path::join(&parent.path, name)))
            .filter(|stored| Self::visible(context, stored))
            .map(|stored| stored.node.clone()))
    }

    fn create_child(&self, parent: &NodeRef, name: &str, node: NewNode) -> Result<NodeRef> {
        path::validate_node_name(name)?;
        let child_path = path::join(&parent.path, name);
        let key = (parent.workspace.clone(), child_path.clone());

        let mut nodes = self.nodes.lock();
        if nodes.contains_key(&key) {
            return Err(CriError::NodeExists(child_path));
        }
        let created = NodeRef {
            identifier: Uuid::new_v4().to_string(),
            workspace: parent.workspace.clone(),
            path: child_path,
            name: name.to_string(),
            node_type: node.node_type,
            hidden: node.hidden,
        };
        nodes.insert(
            key,
            StoredNode {
                node: created.clone(),
                properties: node.properties,
            },
        );
        Ok(created)
    }

    fn children(&self, context: &ContentContext, parent: &NodeRef) -> Result<Vec<NodeRef>> {
        let nodes = self.nodes.lock();
        Ok(nodes
            .iter()
            .filter(|((workspace, child_path), stored)| {
                *workspace == parent.workspace
                    && path::parent(child_path) == Some(parent.path.as_str())
                    && Self::visible(context, stored)
            })
            .map(|(_, stored)| stored.node.clone())
            .collect())
    }

    fn properties(&self, node: &NodeRef) -> Result<Map<String, Value>> {
        let nodes = self.nodes.lock();
        nodes
            .get(&(node.workspace.clone(), node.path.clone()))
            .map(|stored| stored.properties.clone())
            .ok_or_else(|| CriError::NodeNotFound(node.path.clone()))
    }

    fn update_properties(&self, node: &NodeRef, properties: Map<String, Value>) -> Result<()> {
        let mut nodes = self.nodes.lock();
        let stored = nodes
            .get_mut(&(node.workspace.clone(), node.path.clone()))
            .ok_or_else(|| CriError::NodeNotFound(node.path.clone()))?;
        stored.properties.extend(properties);
        Ok(())
    }
}
