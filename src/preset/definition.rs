//! Preset part definition: the cursor describing which slice of a preset
//! part one invocation processes.

use serde_json::{Map, Value};

use crate::error::{CriError, Result};
use crate::utils::generate_log_prefix;

use super::arguments::CommandArguments;

/// Flat settings map a part definition is built from.
pub type PartSettings = Map<String, Value>;

/// Settings key naming the preset the part belongs to.
pub const PRESET_NAME_KEY: &str = "__currentPresetName";
/// Settings key naming the part inside its preset.
pub const PART_NAME_KEY: &str = "__currentPartName";

/// One step of a batched import of a preset part.
///
/// The definition is immutable from the outside except through
/// [`next_batch`](Self::next_batch). Its position leaves the process only
/// as [`CommandArguments`]; the display label is not part of them and is
/// re-applied from the part configuration with [`with_label`](Self::with_label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetPartDefinition {
    preset_name: String,
    part_name: String,
    label: String,
    log_prefix: String,
    current_batch: u64,
    batch_size: Option<u64>,
    offset: Option<u64>,
}

impl PresetPartDefinition {
    /// Build a definition from part settings.
    ///
    /// `settings` must carry [`PRESET_NAME_KEY`] and [`PART_NAME_KEY`].
    /// `label` and `batchSize` are optional; a zero batch size means no
    /// batching. An empty or missing `log_prefix` is replaced by a random one.
    pub fn new(settings: &PartSettings, log_prefix: Option<String>) -> Result<Self> {
        let preset_name = identity(settings, PRESET_NAME_KEY)?;
        let part_name = identity(settings, PART_NAME_KEY)?;
        let label = match settings.get("label") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(label)) => label.clone(),
            Some(other) => other.to_string(),
        };
        let batch_size = batch_size(settings.get("batchSize"))?;

        Ok(Self {
            preset_name,
            part_name,
            label,
            log_prefix: log_prefix
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or_else(generate_log_prefix),
            current_batch: 1,
            batch_size,
            offset: batch_size.map(|_| 0),
        })
    }

    /// Rebuild a definition from the arguments a previous step emitted.
    ///
    /// The result has an empty label.
    #[must_use]
    pub fn from_command_arguments(arguments: &CommandArguments) -> Self {
        let batch_size = arguments.batch_size.filter(|size| *size > 0);
        Self {
            preset_name: arguments.preset_name.clone(),
            part_name: arguments.part_name.clone(),
            label: String::new(),
            log_prefix: if arguments.log_prefix.is_empty() {
                generate_log_prefix()
            } else {
                arguments.log_prefix.clone()
            },
            current_batch: arguments.current_batch.max(1),
            batch_size,
            offset: batch_size.map(|_| arguments.offset.unwrap_or(0)),
        }
    }

    /// Attach a display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Advance to the next batch.
    pub fn next_batch(&mut self) {
        self.current_batch += 1;
        if let (Some(size), Some(offset)) = (self.batch_size, self.offset.as_mut()) {
            *offset += size;
        }
    }

    /// Arguments for the invocation that processes the current batch.
    #[must_use]
    pub fn command_arguments(&self) -> CommandArguments {
        CommandArguments {
            preset_name: self.preset_name.clone(),
            part_name: self.part_name.clone(),
            log_prefix: self.log_prefix.clone(),
            current_batch: self.current_batch,
            batch_size: self.batch_size.filter(|size| *size > 0),
            offset: self.offset.filter(|offset| *offset > 0),
        }
    }

    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    pub const fn current_batch(&self) -> u64 {
        self.current_batch
    }

    pub const fn batch_size(&self) -> Option<u64> {
        self.batch_size
    }

    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }
}

fn identity(settings: &PartSettings, key: &str) -> Result<String> {
    match settings.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(CriError::InvalidConfiguration(format!(
            "Missing or invalid \"{key}\" in preset part settings"
        ))),
    }
}

fn batch_size(value: Option<&Value>) -> Result<Option<u64>> {
    let size = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => Some(number.as_u64().ok_or_else(|| {
            CriError::InvalidConfiguration(format!("invalid batchSize {number}"))
        })?),
        Some(Value::String(raw)) => Some(raw.trim().parse::<u64>().map_err(|err| {
            CriError::InvalidConfiguration(format!("invalid batchSize {raw:?}: {err}"))
        })?),
        Some(other) => {
            return Err(CriError::InvalidConfiguration(format!(
                "invalid batchSize {other}"
            )));
        }
    };
    Ok(size.filter(|size| *size > 0))
}
