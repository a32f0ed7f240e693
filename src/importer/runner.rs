//! Shared importer machinery: content context, site node, skip policy,
//! processed-node registration and prefixed logging.

use serde::{Deserialize, Serialize};

use crate::content::{ContentContext, ContentRepository, NodeRef};
use crate::error::{CriError, Result};
use crate::tracker::{ProcessedNode, ProcessedNodeStore};
use crate::utils::generate_log_prefix;

use super::log::{ImportLogger, Severity};

/// Options every importer is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImporterOptions {
    /// Absolute path of the site node below the root node.
    pub site_node_path: String,
    /// Content context the importer works in.
    #[serde(default)]
    pub context: ContentContext,
}

impl ImporterOptions {
    pub fn new(site_node_path: impl Into<String>) -> Self {
        Self {
            site_node_path: site_node_path.into(),
            context: ContentContext::default(),
        }
    }
}

/// Identity of the record being checked.
#[derive(Debug, Clone, Copy)]
pub struct RecordKey<'r> {
    /// Human readable name used in log lines.
    pub name: &'r str,
    pub external_identifier: &'r str,
    /// Name of the node the record would be stored as.
    pub node_name: &'r str,
}

/// Which records [`ImportRunner::skip_node_processing`] skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipPolicy {
    pub skip_existing_node: bool,
    pub skip_already_processed: bool,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self {
            skip_existing_node: true,
            skip_already_processed: true,
        }
    }
}

/// Why a record was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The tracker already holds an entry for the record.
    AlreadyProcessed(ProcessedNode),
    /// A node of the same name exists; it has been registered for the record.
    ExistingNode(NodeRef),
}

/// State shared by all importers of one kind.
///
/// Concrete importers own a runner and call into it for everything that is
/// not specific to their record type.
pub struct ImportRunner<'a> {
    kind: String,
    options: ImporterOptions,
    repository: &'a dyn ContentRepository,
    tracker: &'a dyn ProcessedNodeStore,
    logger: &'a dyn ImportLogger,
    log_prefix: String,
    root_node: Option<NodeRef>,
    site_node: Option<NodeRef>,
}

impl std::fmt::Debug for ImportRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportRunner")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("log_prefix", &self.log_prefix)
            .field("site_node", &self.site_node)
            .finish_non_exhaustive()
    }
}

impl<'a> ImportRunner<'a> {
    /// Create a runner for importer `kind`. A random log prefix is assigned
    /// until [`set_log_prefix`](Self::set_log_prefix) replaces it.
    pub fn new(
        kind: impl Into<String>,
        options: ImporterOptions,
        repository: &'a dyn ContentRepository,
        tracker: &'a dyn ProcessedNodeStore,
        logger: &'a dyn ImportLogger,
    ) -> Self {
        Self {
            kind: kind.into(),
            options,
            repository,
            tracker,
            logger,
            log_prefix: generate_log_prefix(),
            root_node: None,
            site_node: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub const fn context(&self) -> &ContentContext {
        &self.options.context
    }

    pub fn repository(&self) -> &'a dyn ContentRepository {
        self.repository
    }

    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// Correlate this runner's lines with another run. Empty prefixes are
    /// ignored.
    pub fn set_log_prefix(&mut self, log_prefix: impl Into<String>) {
        let log_prefix = log_prefix.into();
        if !log_prefix.is_empty() {
            self.log_prefix = log_prefix;
        }
    }

    /// Resolve the root node and the site node.
    ///
    /// Fails with [`CriError::SiteNodeNotFound`] when the configured site
    /// path does not exist.
    pub fn initialize(&mut self) -> Result<()> {
        let context = &self.options.context;
        let root_node = self.repository.root_node(context)?;
        let site_node_path = self.options.site_node_path.as_str();
        let site_node = self
            .repository
            .node(context, site_node_path)?
            .ok_or_else(|| CriError::SiteNodeNotFound(site_node_path.to_string()))?;

        tracing::debug!(
            kind = %self.kind,
            workspace = %context.workspace_name,
            site = %site_node.path,
            "importer initialized"
        );
        self.root_node = Some(root_node);
        self.site_node = Some(site_node);
        Ok(())
    }

    pub fn root_node(&self) -> Result<&NodeRef> {
        self.root_node.as_ref().ok_or_else(|| self.not_initialized())
    }

    pub fn site_node(&self) -> Result<&NodeRef> {
        self.site_node.as_ref().ok_or_else(|| self.not_initialized())
    }

    fn not_initialized(&self) -> CriError {
        CriError::Import(format!("importer {} used before initialize()", self.kind))
    }

    /// Decide whether `record` must be skipped.
    ///
    /// A record already in the tracker is skipped with a notice. Otherwise,
    /// if `storage_node` already has a child named `record.node_name`, that
    /// node is registered for the record and the record is skipped with a
    /// warning. `None` means the caller must create the node.
    pub fn skip_node_processing(
        &self,
        record: &RecordKey<'_>,
        storage_node: &NodeRef,
        policy: SkipPolicy,
    ) -> Result<Option<SkipReason>> {
        if policy.skip_already_processed {
            if let Some(processed) = self.node_processing(record.external_identifier)? {
                self.log(
                    &format!("- Skip already processed node \"{}\" ...", record.name),
                    Severity::Notice,
                );
                return Ok(Some(SkipReason::AlreadyProcessed(processed)));
            }
        }

        if policy.skip_existing_node {
            let existing = self
                .repository
                .child(self.context(), storage_node, record.node_name)?;
            if let Some(node) = existing {
                self.log(
                    &format!("- Skip existing node \"{}\" ...", record.name),
                    Severity::Warning,
                );
                self.register_node_processing(&node, record.external_identifier)?;
                return Ok(Some(SkipReason::ExistingNode(node)));
            }
        }

        Ok(None)
    }

    /// Remember that `node` was created (or reused) for `external_identifier`.
    pub fn register_node_processing(&self, node: &NodeRef, external_identifier: &str) -> Result<()> {
        self.tracker.set(&self.kind, external_identifier, node)?;
        Ok(())
    }

    /// Tracker entry of this importer kind for `external_identifier`.
    pub fn node_processing(&self, external_identifier: &str) -> Result<Option<ProcessedNode>> {
        self.tracker.get(&self.kind, external_identifier)
    }

    /// Emit `message` prefixed with the log prefix.
    pub fn log(&self, message: &str, severity: Severity) {
        self.logger
            .log(&format!("[{}] {message}", self.log_prefix), severity);
    }
}
