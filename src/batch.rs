//! Batch driver: runs every batch of a preset part until the source is
//! exhausted.
//!
//! A batch is executed either in this process or by a fresh `cri import`
//! child process that receives the cursor as command line flags and prints
//! its [`BatchReport`] as JSON.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{CriError, Result};
use crate::importer::{ImportLogger, MappedNodeImporter, process_batch};
use crate::preset::PresetPartDefinition;
use crate::source::JsonFileSource;
use crate::storage::Database;

pub use crate::importer::BatchReport;

/// Run one batch of the part `cursor` points at, inside this process.
pub fn import_batch(
    db: &Database,
    config: &Config,
    cursor: &PresetPartDefinition,
    logger: &dyn ImportLogger,
) -> Result<BatchReport> {
    let preset = cursor.preset_name();
    let part = config.part(preset, cursor.part_name())?;
    part.validate()?;
    let source = JsonFileSource::new(config.source_path(part));
    let mut importer = MappedNodeImporter::new(
        part.importer_kind(preset),
        part.importer_options(&config.context),
        part.mapping(),
        db,
        db,
        logger,
    );
    process_batch(&mut importer, &source, cursor)
}

/// Executes a single batch.
pub trait BatchExecutor {
    fn execute(&self, cursor: &PresetPartDefinition) -> Result<BatchReport>;
}

/// Runs batches in the current process.
pub struct InProcessExecutor<'a> {
    db: &'a Database,
    config: &'a Config,
    logger: &'a dyn ImportLogger,
}

impl<'a> InProcessExecutor<'a> {
    pub fn new(db: &'a Database, config: &'a Config, logger: &'a dyn ImportLogger) -> Self {
        Self { db, config, logger }
    }
}

impl BatchExecutor for InProcessExecutor<'_> {
    fn execute(&self, cursor: &PresetPartDefinition) -> Result<BatchReport> {
        import_batch(self.db, self.config, cursor, self.logger)
    }
}

/// Runs every batch as a `cri import` child process.
#[derive(Debug, Clone)]
pub struct ChildProcessExecutor {
    program: PathBuf,
    root: PathBuf,
    config_path: PathBuf,
    verbosity: u8,
}

impl ChildProcessExecutor {
    pub const fn new(program: PathBuf, root: PathBuf, config_path: PathBuf, verbosity: u8) -> Self {
        Self {
            program,
            root,
            config_path,
            verbosity,
        }
    }

    /// Executor re-invoking the running binary.
    pub fn current(root: PathBuf, config_path: PathBuf, verbosity: u8) -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?, root, config_path, verbosity))
    }

    fn command(&self, cursor: &PresetPartDefinition) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--robot")
            .arg("--root")
            .arg(&self.root)
            .arg("--config")
            .arg(&self.config_path);
        if self.verbosity > 0 {
            command.arg(format!("-{}", "v".repeat(usize::from(self.verbosity))));
        }
        command
            .arg("import")
            .args(cursor.command_arguments().to_cli_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        command
    }
}

impl BatchExecutor for ChildProcessExecutor {
    fn execute(&self, cursor: &PresetPartDefinition) -> Result<BatchReport> {
        tracing::debug!(
            program = %self.program.display(),
            batch = cursor.current_batch(),
            "spawning batch process"
        );
        let output = self.command(cursor).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let message = serde_json::from_str::<serde_json::Value>(&stdout)
                .ok()
                .and_then(|value| value["message"].as_str().map(ToString::to_string))
                .unwrap_or_else(|| format!("exited with {}", output.status));
            return Err(CriError::BatchFailed(format!(
                "batch {} of {}.{}: {message}",
                cursor.current_batch(),
                cursor.preset_name(),
                cursor.part_name()
            )));
        }

        serde_json::from_str(&stdout).map_err(|err| {
            CriError::BatchFailed(format!(
                "batch {} of {}.{}: unreadable report: {err}",
                cursor.current_batch(),
                cursor.preset_name(),
                cursor.part_name()
            ))
        })
    }
}

/// Totals of all batches of one part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSummary {
    pub preset: String,
    pub part: String,
    pub kind: String,
    pub log_prefix: String,
    pub batches: u64,
    pub fetched: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped_processed: u64,
    pub skipped_existing: u64,
    pub failed: u64,
    pub duration_ms: u64,
}

impl PartSummary {
    fn add(&mut self, report: &BatchReport) {
        self.kind.clone_from(&report.kind);
        self.batches += 1;
        self.fetched += report.fetched;
        self.created += report.created;
        self.updated += report.updated;
        self.skipped_processed += report.skipped_processed;
        self.skipped_existing += report.skipped_existing;
        self.failed += report.failed;
    }
}

/// Drive `cursor` through `executor` until a batch reports exhaustion.
///
/// Every batch shares the cursor's log prefix. The first failing batch
/// aborts the part.
pub fn drive_part(
    executor: &dyn BatchExecutor,
    mut cursor: PresetPartDefinition,
) -> Result<PartSummary> {
    let started = Instant::now();
    let mut summary = PartSummary {
        preset: cursor.preset_name().to_string(),
        part: cursor.part_name().to_string(),
        log_prefix: cursor.log_prefix().to_string(),
        ..PartSummary::default()
    };
    tracing::info!(
        preset = %summary.preset,
        part = %summary.part,
        label = cursor.label(),
        log_prefix = %summary.log_prefix,
        batch_size = ?cursor.batch_size(),
        "starting part"
    );

    loop {
        let report = executor.execute(&cursor)?;
        summary.add(&report);
        if report.exhausted {
            break;
        }
        cursor.next_batch();
    }

    summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        preset = %summary.preset,
        part = %summary.part,
        batches = summary.batches,
        created = summary.created,
        failed = summary.failed,
        "part finished"
    );
    Ok(summary)
}
