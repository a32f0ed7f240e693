//! Content repository access.
//!
//! The importer only needs a small slice of a content repository: the root
//! node of a workspace, lookup by path, and child lookup and creation by
//! name. [`ContentRepository`] captures that slice. The SQLite implementation
//! lives on [`Database`](crate::storage::Database); [`MemoryContentRepository`]
//! is a process-local stand-in.

mod memory;
pub mod path;
mod sqlite;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

pub use memory::MemoryContentRepository;

/// Node type used for intermediate nodes created on demand.
pub const UNSTRUCTURED_NODE_TYPE: &str = "unstructured";

/// Settings a content context is created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentContext {
    pub workspace_name: String,
    pub invisible_content_shown: bool,
}

impl Default for ContentContext {
    fn default() -> Self {
        Self {
            workspace_name: "live".to_string(),
            invisible_content_shown: true,
        }
    }
}

/// Reference to a node in the content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub identifier: String,
    pub workspace: String,
    pub path: String,
    pub name: String,
    pub node_type: String,
    pub hidden: bool,
}

/// A node about to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNode {
    pub node_type: String,
    pub properties: Map<String, Value>,
    pub hidden: bool,
}

impl NewNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }
}

/// The operations the importer performs against the content tree.
pub trait ContentRepository {
    /// Root node of the context's workspace, created on first access.
    fn root_node(&self, context: &ContentContext) -> Result<NodeRef>;

    /// Node at `path` (absolute, or relative to the root).
    fn node(&self, context: &ContentContext, path: &str) -> Result<Option<NodeRef>>;

    /// Direct child of `parent` called `name`.
    fn child(&self, context: &ContentContext, parent: &NodeRef, name: &str)
    -> Result<Option<NodeRef>>;

    /// Create the child `name` below `parent`.
    ///
    /// Fails with `NodeExists` if a child of that name is already present,
    /// hidden or not.
    fn create_child(&self, parent: &NodeRef, name: &str, node: NewNode) -> Result<NodeRef>;

    /// Children of `parent`, ordered by name.
    fn children(&self, context: &ContentContext, parent: &NodeRef) -> Result<Vec<NodeRef>>;

    /// Properties stored on `node`.
    fn properties(&self, node: &NodeRef) -> Result<Map<String, Value>>;

    /// Merge `properties` into the properties of `node`, overwriting keys
    /// that are already set. Fails with `NodeNotFound` for unknown nodes.
    fn update_properties(&self, node: &NodeRef, properties: Map<String, Value>) -> Result<()>;
}

/// Resolve `path` below `from`, creating missing nodes as `node_type`.
pub fn ensure_path(
    repository: &dyn ContentRepository,
    context: &ContentContext,
    from: &NodeRef,
    path: &str,
    node_type: &str,
) -> Result<NodeRef> {
    let mut current = from.clone();
    for name in path::segments(path)? {
        current = match repository.child(context, &current, name)? {
            Some(child) => child,
            None => {
                tracing::debug!(parent = %current.path, name, "creating intermediate node");
                repository.create_child(&current, name, NewNode::new(node_type))?
            }
        };
    }
    Ok(current)
}
