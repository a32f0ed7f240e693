//! Arguments handed from one batch invocation to the next.

use serde::{Deserialize, Serialize};

/// Serialized progress of a preset part.
///
/// `batch_size` and `offset` are only present when non-zero; a receiver
/// treats a missing `offset` next to a `batch_size` as offset 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandArguments {
    pub preset_name: String,
    pub part_name: String,
    pub log_prefix: String,
    pub current_batch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl CommandArguments {
    /// Render as flags of the `cri import` command.
    ///
    /// Text values are attached with `=` so a value starting with `-` is
    /// never read as a flag.
    #[must_use]
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--preset={}", self.preset_name),
            format!("--part={}", self.part_name),
            format!("--log-prefix={}", self.log_prefix),
            "--current-batch".to_string(),
            self.current_batch.to_string(),
        ];
        if let Some(batch_size) = self.batch_size {
            args.push("--batch-size".to_string());
            args.push(batch_size.to_string());
        }
        if let Some(offset) = self.offset {
            args.push("--offset".to_string());
            args.push(offset.to_string());
        }
        args
    }
}
