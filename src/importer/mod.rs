//! Importers turn source records into content nodes.
//!
//! Every importer composes an [`ImportRunner`] for the shared work and
//! implements [`Importer`] for its record type. [`process_batch`] drives one
//! batch of a preset part through an importer.

pub mod log;
mod mapped;
mod runner;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::content::NodeRef;
use crate::error::{CriError, Result};
use crate::preset::{CommandArguments, PresetPartDefinition};
use crate::source::{RecordSource, SourceRecord};

pub use log::{ImportLogger, MemoryLogger, Severity, TracingLogger};
pub use mapped::{MappedNodeImporter, MappingOptions};
pub use runner::{ImportRunner, ImporterOptions, RecordKey, SkipPolicy, SkipReason};

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Created(NodeRef),
    /// Skipped because the tracker already knew the record.
    AlreadyProcessed,
    /// Skipped because a node of the same name existed; that node was
    /// registered for the record.
    Existing(NodeRef),
    /// A node of the same name existed and received the record's
    /// properties; that node was registered for the record.
    Updated(NodeRef),
}

/// A concrete importer.
pub trait Importer {
    /// Identity under which processed records are tracked.
    fn kind(&self) -> &str;

    fn set_log_prefix(&mut self, log_prefix: &str);

    /// Resolve everything needed before the first record. Failing here
    /// aborts the batch before any record is touched.
    fn initialize(&mut self) -> Result<()>;

    fn process_record(&self, record: &SourceRecord) -> Result<RecordOutcome>;

    /// Emit a prefixed log line.
    fn log(&self, message: &str, severity: Severity);
}

/// Result of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub preset: String,
    pub part: String,
    pub kind: String,
    pub log_prefix: String,
    pub current_batch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub fetched: u64,
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
    pub skipped_processed: u64,
    pub skipped_existing: u64,
    pub failed: u64,
    /// No further batch is needed.
    pub exhausted: bool,
    pub duration_ms: u64,
    /// Arguments of the following invocation, absent when exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<CommandArguments>,
}

impl BatchReport {
    pub const fn skipped(&self) -> u64 {
        self.skipped_processed + self.skipped_existing
    }
}

/// Run the batch described by `cursor` through `importer`.
///
/// The importer inherits the cursor's log prefix. Records failing with a
/// storage or I/O error abort the batch; any other record error is logged,
/// counted as failed and left unregistered so the next run retries it.
pub fn process_batch(
    importer: &mut dyn Importer,
    source: &dyn RecordSource,
    cursor: &PresetPartDefinition,
) -> Result<BatchReport> {
    let started = Instant::now();
    importer.set_log_prefix(cursor.log_prefix());
    importer.initialize()?;

    let offset = cursor.offset().unwrap_or(0);
    let records = source.fetch(offset, cursor.batch_size())?;
    let fetched = records.len() as u64;
    importer.log(
        &format!(
            "Batch {} of {}.{}: {fetched} records from {} (offset {offset})",
            cursor.current_batch(),
            cursor.preset_name(),
            cursor.part_name(),
            source.describe(),
        ),
        Severity::Info,
    );

    let mut report = BatchReport {
        preset: cursor.preset_name().to_string(),
        part: cursor.part_name().to_string(),
        kind: importer.kind().to_string(),
        log_prefix: cursor.log_prefix().to_string(),
        current_batch: cursor.current_batch(),
        batch_size: cursor.batch_size(),
        offset: cursor.offset(),
        fetched,
        created: 0,
        updated: 0,
        skipped_processed: 0,
        skipped_existing: 0,
        failed: 0,
        exhausted: cursor.batch_size().is_none_or(|size| fetched < size),
        duration_ms: 0,
        next: None,
    };

    for (position, record) in records.iter().enumerate() {
        match importer.process_record(record) {
            Ok(RecordOutcome::Created(_)) => report.created += 1,
            Ok(RecordOutcome::Updated(_)) => report.updated += 1,
            Ok(RecordOutcome::AlreadyProcessed) => report.skipped_processed += 1,
            Ok(RecordOutcome::Existing(_)) => report.skipped_existing += 1,
            Err(err @ (CriError::Database(_) | CriError::Io(_))) => return Err(err),
            Err(err) => {
                report.failed += 1;
                importer.log(
                    &format!("! Record {} failed: {err}", offset + position as u64 + 1),
                    Severity::Error,
                );
            }
        }
    }

    if !report.exhausted {
        let mut next = cursor.clone();
        next.next_batch();
        report.next = Some(next.command_arguments());
    }
    report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    importer.log(
        &format!(
            "Batch {} done: {} created, {} updated, {} skipped, {} failed",
            report.current_batch,
            report.created,
            report.updated,
            report.skipped(),
            report.failed
        ),
        Severity::Info,
    );
    Ok(report)
}
