use std::collections::HashMap;

use parking_lot::Mutex;

use crate::content::NodeRef;
use crate::error::Result;

use super::{ProcessedNode, ProcessedNodeStore};

/// Tracker that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    entries: Mutex<HashMap<(String, String), ProcessedNode>>,
    writes: Mutex<usize>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of `set` calls so far, overwrites included.
    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

impl ProcessedNodeStore for MemoryTracker {
    fn get(&self, importer_kind: &str, external_identifier: &str) -> Result<Option<ProcessedNode>> {
        Ok(self
            .entries
            .lock()
            .get(&(importer_kind.to_string(), external_identifier.to_string()))
            .cloned())
    }

    fn set(
        &self,
        importer_kind: &str,
        external_identifier: &str,
        node: &NodeRef,
    ) -> Result<ProcessedNode> {
        let entry = ProcessedNode::new(importer_kind, external_identifier, node);
        self.entries.lock().insert(
            (importer_kind.to_string(), external_identifier.to_string()),
            entry.clone(),
        );
        *self.writes.lock() += 1;
        Ok(entry)
    }
}
