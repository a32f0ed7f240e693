//! Record sources feeding the importers.
//!
//! A source hands out flat records by position, so a batch is simply
//! `(offset, limit)`. Sources must return records in a stable order across
//! invocations, otherwise offsets from a previous batch point elsewhere.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{CriError, Result};

/// One flat source row.
pub type SourceRecord = Map<String, Value>;

/// Positional access to source records.
pub trait RecordSource {
    /// Up to `limit` records starting at `offset`; all remaining when `limit`
    /// is `None`.
    fn fetch(&self, offset: u64, limit: Option<u64>) -> Result<Vec<SourceRecord>>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Records read from a JSON file.
///
/// Files ending in `.jsonl` or `.ndjson` hold one object per line; any other
/// file holds a single array of objects.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_line_delimited(&self) -> bool {
        matches!(
            self.path.extension().and_then(|ext| ext.to_str()),
            Some("jsonl" | "ndjson")
        )
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path)
            .map_err(|err| CriError::Source(format!("open {}: {err}", self.path.display())))
    }

    fn fetch_lines(&self, offset: u64, limit: Option<u64>) -> Result<Vec<SourceRecord>> {
        let reader = BufReader::new(self.open()?);
        let mut records = Vec::new();
        let mut position = 0u64;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if position >= offset {
                if limit.is_some_and(|limit| records.len() as u64 >= limit) {
                    break;
                }
                records.push(self.to_record(serde_json::from_str(&line), line_no + 1)?);
            }
            position += 1;
        }
        Ok(records)
    }

    fn fetch_array(&self, offset: u64, limit: Option<u64>) -> Result<Vec<SourceRecord>> {
        let value: Value = serde_json::from_reader(BufReader::new(self.open()?))
            .map_err(|err| CriError::Source(format!("parse {}: {err}", self.path.display())))?;
        let Value::Array(items) = value else {
            return Err(CriError::Source(format!(
                "{} must contain a JSON array of objects",
                self.path.display()
            )));
        };
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        items
            .into_iter()
            .enumerate()
            .skip(start)
            .take(take)
            .map(|(idx, item)| self.to_record(Ok(item), idx + 1))
            .collect()
    }

    fn to_record(
        &self,
        parsed: std::result::Result<Value, serde_json::Error>,
        position: usize,
    ) -> Result<SourceRecord> {
        match parsed {
            Ok(Value::Object(record)) => Ok(record),
            Ok(other) => Err(CriError::Source(format!(
                "{} record {position} is not an object: {other}",
                self.path.display()
            ))),
            Err(err) => Err(CriError::Source(format!(
                "{} record {position}: {err}",
                self.path.display()
            ))),
        }
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&self, offset: u64, limit: Option<u64>) -> Result<Vec<SourceRecord>> {
        if self.is_line_delimited() {
            self.fetch_lines(offset, limit)
        } else {
            self.fetch_array(offset, limit)
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<SourceRecord>,
}

impl MemorySource {
    pub const fn new(records: Vec<SourceRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MemorySource {
    fn fetch(&self, offset: u64, limit: Option<u64>) -> Result<Vec<SourceRecord>> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(self.records.iter().skip(start).take(take).cloned().collect())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}
