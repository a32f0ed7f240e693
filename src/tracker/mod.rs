//! Tracking of external records that were already turned into nodes.
//!
//! Entries are keyed by importer kind and external identifier, so two
//! importers never see each other's records even when identifiers collide.
//! The core only reads and writes entries; [`Database`](crate::storage::Database)
//! additionally offers listing and reset for the management commands.

mod memory;
mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::NodeRef;
use crate::error::Result;

pub use memory::MemoryTracker;

/// Node registered for an external record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedNode {
    pub importer_kind: String,
    pub external_identifier: String,
    pub node_identifier: String,
    pub node_path: String,
    pub workspace: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedNode {
    pub fn new(importer_kind: &str, external_identifier: &str, node: &NodeRef) -> Self {
        Self {
            importer_kind: importer_kind.to_string(),
            external_identifier: external_identifier.to_string(),
            node_identifier: node.identifier.clone(),
            node_path: node.path.clone(),
            workspace: node.workspace.clone(),
            processed_at: Utc::now(),
        }
    }
}

/// Durable mapping from (importer kind, external identifier) to a node.
pub trait ProcessedNodeStore {
    /// Entry for the key, `None` when the record was never registered.
    fn get(&self, importer_kind: &str, external_identifier: &str) -> Result<Option<ProcessedNode>>;

    /// Register `node` for the key, replacing any previous entry.
    fn set(
        &self,
        importer_kind: &str,
        external_identifier: &str,
        node: &NodeRef,
    ) -> Result<ProcessedNode>;
}
