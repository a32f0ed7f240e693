//! Configurable importer mapping flat records onto nodes.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::content::{
    ContentRepository, NewNode, NodeRef, UNSTRUCTURED_NODE_TYPE, ensure_path,
};
use crate::datatype::SanitizedString;
use crate::error::{CriError, Result};
use crate::source::SourceRecord;
use crate::tracker::ProcessedNodeStore;
use crate::utils::to_node_name;

use super::log::{ImportLogger, Severity};
use super::runner::{ImportRunner, ImporterOptions, RecordKey, SkipPolicy, SkipReason};
use super::{Importer, RecordOutcome};

/// How records map onto nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOptions {
    /// Path of the storage node relative to the site node.
    pub storage_path: String,
    pub node_type: String,
    /// Record field holding the external identifier.
    pub identifier_field: String,
    /// Record field the node name is derived from; the identifier when unset.
    pub node_name_field: Option<String>,
    /// Record field naming the record in log lines; the identifier when unset.
    pub label_field: Option<String>,
    /// Node property name to record field.
    pub properties: BTreeMap<String, String>,
    pub skip: SkipPolicy,
}

impl MappingOptions {
    pub fn new(
        storage_path: impl Into<String>,
        node_type: impl Into<String>,
        identifier_field: impl Into<String>,
    ) -> Self {
        Self {
            storage_path: storage_path.into(),
            node_type: node_type.into(),
            identifier_field: identifier_field.into(),
            node_name_field: None,
            label_field: None,
            properties: BTreeMap::new(),
            skip: SkipPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>, field: impl Into<String>) -> Self {
        self.properties.insert(property.into(), field.into());
        self
    }

    #[must_use]
    pub fn with_node_name_field(mut self, field: impl Into<String>) -> Self {
        self.node_name_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = Some(field.into());
        self
    }
}

/// Creates one node per record below a storage node.
#[derive(Debug)]
pub struct MappedNodeImporter<'a> {
    runner: ImportRunner<'a>,
    mapping: MappingOptions,
    storage_node: Option<NodeRef>,
}

impl<'a> MappedNodeImporter<'a> {
    pub fn new(
        kind: impl Into<String>,
        options: ImporterOptions,
        mapping: MappingOptions,
        repository: &'a dyn ContentRepository,
        tracker: &'a dyn ProcessedNodeStore,
        logger: &'a dyn ImportLogger,
    ) -> Self {
        Self {
            runner: ImportRunner::new(kind, options, repository, tracker, logger),
            mapping,
            storage_node: None,
        }
    }

    fn storage_node(&self) -> Result<&NodeRef> {
        self.storage_node.as_ref().ok_or_else(|| {
            CriError::Import(format!(
                "importer {} used before initialize()",
                self.runner.kind()
            ))
        })
    }

    fn identifier(&self, record: &SourceRecord) -> Result<String> {
        let field = &self.mapping.identifier_field;
        scalar_text(record.get(field)).ok_or_else(|| {
            CriError::InvalidRecord(format!("missing identifier field \"{field}\""))
        })
    }

    fn node_name(&self, record: &SourceRecord, identifier: &str) -> Result<String> {
        let raw = match &self.mapping.node_name_field {
            Some(field) => scalar_text(record.get(field)).ok_or_else(|| {
                CriError::InvalidRecord(format!(
                    "record {identifier}: missing node name field \"{field}\""
                ))
            })?,
            None => identifier.to_string(),
        };
        to_node_name(&raw).ok_or_else(|| {
            CriError::InvalidRecord(format!(
                "record {identifier}: no usable node name in {raw:?}"
            ))
        })
    }

    fn label(&self, record: &SourceRecord, identifier: &str) -> String {
        self.mapping
            .label_field
            .as_ref()
            .and_then(|field| scalar_text(record.get(field)))
            .map_or_else(
                || identifier.to_string(),
                |label| SanitizedString::new(&label).into_inner(),
            )
    }

    fn properties(&self, record: &SourceRecord) -> Map<String, Value> {
        let mut properties = Map::new();
        for (property, field) in &self.mapping.properties {
            let value = match record.get(field) {
                None | Some(Value::Null) => continue,
                Some(Value::String(text)) => Value::String(SanitizedString::new(text).into_inner()),
                Some(other) => other.clone(),
            };
            properties.insert(property.clone(), value);
        }
        properties
    }
}

impl Importer for MappedNodeImporter<'_> {
    fn kind(&self) -> &str {
        self.runner.kind()
    }

    fn set_log_prefix(&mut self, log_prefix: &str) {
        self.runner.set_log_prefix(log_prefix);
    }

    fn initialize(&mut self) -> Result<()> {
        self.runner.initialize()?;
        let site = self.runner.site_node()?.clone();
        let storage = ensure_path(
            self.runner.repository(),
            self.runner.context(),
            &site,
            &self.mapping.storage_path,
            UNSTRUCTURED_NODE_TYPE,
        )?;
        tracing::debug!(storage = %storage.path, "storage node resolved");
        self.storage_node = Some(storage);
        Ok(())
    }

    fn process_record(&self, record: &SourceRecord) -> Result<RecordOutcome> {
        let storage = self.storage_node()?;
        let identifier = self.identifier(record)?;
        let node_name = self.node_name(record, &identifier)?;
        let label = self.label(record, &identifier);

        let key = RecordKey {
            name: &label,
            external_identifier: &identifier,
            node_name: &node_name,
        };
        match self
            .runner
            .skip_node_processing(&key, storage, self.mapping.skip)?
        {
            Some(SkipReason::AlreadyProcessed(_)) => return Ok(RecordOutcome::AlreadyProcessed),
            Some(SkipReason::ExistingNode(node)) => return Ok(RecordOutcome::Existing(node)),
            None => {}
        }

        let repository = self.runner.repository();
        if let Some(existing) = repository.child(self.runner.context(), storage, &node_name)? {
            repository.update_properties(&existing, self.properties(record))?;
            self.runner.log(
                &format!("~ Updated node \"{label}\" ({})", existing.path),
                Severity::Info,
            );
            self.runner.register_node_processing(&existing, &identifier)?;
            return Ok(RecordOutcome::Updated(existing));
        }

        let node = repository.create_child(
            storage,
            &node_name,
            NewNode::new(&self.mapping.node_type).with_properties(self.properties(record)),
        )?;
        self.runner.log(
            &format!("+ Created node \"{label}\" ({})", node.path),
            Severity::Info,
        );
        self.runner.register_node_processing(&node, &identifier)?;
        Ok(RecordOutcome::Created(node))
    }

    fn log(&self, message: &str, severity: Severity) {
        self.runner.log(message, severity);
    }
}

/// Text of a string or number field; `None` for anything else or blank text.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentContext, MemoryContentRepository};
    use crate::importer::log::MemoryLogger;
    use crate::tracker::MemoryTracker;
    use serde_json::json;

    fn record(value: serde_json::Value) -> SourceRecord {
        value.as_object().cloned().unwrap()
    }

    fn repository_with_site() -> MemoryContentRepository {
        let repository = MemoryContentRepository::new();
        let context = ContentContext::default();
        let root = repository.root_node(&context).unwrap();
        ensure_path(&repository, &context, &root, "/sites/demo", "site").unwrap();
        repository
    }

    fn mapping() -> MappingOptions {
        MappingOptions::new("catalog/products", "product", "sku")
            .with_label_field("title")
            .with_property("title", "title")
            .with_property("price", "price")
    }

    #[test]
    fn initialize_creates_storage_node() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let mut importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            mapping(),
            &repository,
            &tracker,
            &logger,
        );
        importer.initialize().unwrap();

        let storage = repository
            .node(&ContentContext::default(), "/sites/demo/catalog/products")
            .unwrap()
            .unwrap();
        assert_eq!(storage.node_type, UNSTRUCTURED_NODE_TYPE);
    }

    #[test]
    fn creates_node_with_sanitized_properties() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let mut importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            mapping(),
            &repository,
            &tracker,
            &logger,
        );
        importer.set_log_prefix("abc");
        importer.initialize().unwrap();

        let outcome = importer
            .process_record(&record(json!({
                "sku": "SKU-1",
                "title": " <b>Oak</b>\n chair ",
                "price": 120,
                "ignored": "x",
            })))
            .unwrap();

        let RecordOutcome::Created(node) = outcome else {
            panic!("expected a created node, got {outcome:?}");
        };
        assert_eq!(node.path, "/sites/demo/catalog/products/sku-1");
        assert_eq!(node.node_type, "product");

        let properties = repository.properties(&node).unwrap();
        assert_eq!(properties["title"], json!("Oak chair"));
        assert_eq!(properties["price"], json!(120));
        assert!(!properties.contains_key("ignored"));

        let entry = tracker.get("ProductImporter", "SKU-1").unwrap().unwrap();
        assert_eq!(entry.node_identifier, node.identifier);
        assert!(logger.contains(Severity::Info, "[abc] + Created node \"Oak chair\""));
    }

    #[test]
    fn second_pass_reports_already_processed() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let mut importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            mapping(),
            &repository,
            &tracker,
            &logger,
        );
        importer.initialize().unwrap();
        let row = record(json!({ "sku": 7, "title": "Stool" }));

        assert!(matches!(importer.process_record(&row).unwrap(), RecordOutcome::Created(_)));
        assert_eq!(importer.process_record(&row).unwrap(), RecordOutcome::AlreadyProcessed);
        assert!(logger.contains(Severity::Notice, "Skip already processed node \"Stool\""));
    }

    #[test]
    fn preexisting_node_is_adopted() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let mut importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            mapping(),
            &repository,
            &tracker,
            &logger,
        );
        importer.initialize().unwrap();
        let storage = importer.storage_node().unwrap().clone();
        let manual = repository
            .create_child(&storage, "sku-9", NewNode::new("product"))
            .unwrap();

        let outcome = importer
            .process_record(&record(json!({ "sku": "SKU-9" })))
            .unwrap();
        assert_eq!(outcome, RecordOutcome::Existing(manual.clone()));
        assert_eq!(
            tracker.get("ProductImporter", "SKU-9").unwrap().unwrap().node_identifier,
            manual.identifier
        );
    }

    #[test]
    fn existing_node_is_updated_when_not_skipped() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let mut options = mapping();
        options.skip.skip_existing_node = false;
        let mut importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            options,
            &repository,
            &tracker,
            &logger,
        );
        importer.initialize().unwrap();
        let storage = importer.storage_node().unwrap().clone();
        let manual = repository
            .create_child(&storage, "sku-4", NewNode::new("product"))
            .unwrap();
        let row = record(json!({ "sku": "SKU-4", "title": "<i>Bench</i>" }));

        let outcome = importer.process_record(&row).unwrap();
        assert_eq!(outcome, RecordOutcome::Updated(manual.clone()));
        assert_eq!(repository.properties(&manual).unwrap()["title"], json!("Bench"));
        assert_eq!(
            tracker.get("ProductImporter", "SKU-4").unwrap().unwrap().node_identifier,
            manual.identifier
        );
        assert!(logger.contains(Severity::Info, "~ Updated node \"Bench\""));

        assert_eq!(importer.process_record(&row).unwrap(), RecordOutcome::AlreadyProcessed);
    }

    #[test]
    fn node_name_field_and_invalid_records() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let mut importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            mapping().with_node_name_field("slug"),
            &repository,
            &tracker,
            &logger,
        );
        importer.initialize().unwrap();

        let created = importer
            .process_record(&record(json!({ "sku": "1", "slug": "Red Chair!" })))
            .unwrap();
        assert!(matches!(created, RecordOutcome::Created(node) if node.name == "red-chair"));

        let missing_slug = importer
            .process_record(&record(json!({ "sku": "2" })))
            .unwrap_err();
        assert!(matches!(missing_slug, CriError::InvalidRecord(_)));

        let blank_id = importer
            .process_record(&record(json!({ "sku": "  ", "slug": "x" })))
            .unwrap_err();
        assert!(matches!(blank_id, CriError::InvalidRecord(_)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn process_before_initialize_fails() {
        let repository = repository_with_site();
        let tracker = MemoryTracker::new();
        let logger = MemoryLogger::new();
        let importer = MappedNodeImporter::new(
            "ProductImporter",
            ImporterOptions::new("/sites/demo"),
            mapping(),
            &repository,
            &tracker,
            &logger,
        );
        let err = importer
            .process_record(&record(json!({ "sku": "1" })))
            .unwrap_err();
        assert!(matches!(err, CriError::Import(_)));
    }
}
