//! cri import - Import exactly one batch of a preset part

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::batch::{BatchReport, import_batch};
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::config::Config;
use crate::error::Result;
use crate::importer::TracingLogger;
use crate::preset::{CommandArguments, PresetPartDefinition};
use crate::utils::format_duration_ms;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Preset name
    #[arg(long)]
    pub preset: String,

    /// Part name within the preset
    #[arg(long)]
    pub part: String,

    /// Prefix correlating the log lines of all batches of one run
    #[arg(long)]
    pub log_prefix: Option<String>,

    /// Number of this batch, starting at 1
    #[arg(long, default_value_t = 1)]
    pub current_batch: u64,

    /// Records per batch (default: the part's batchSize)
    #[arg(long)]
    pub batch_size: Option<u64>,

    /// Records to skip before this batch
    #[arg(long)]
    pub offset: Option<u64>,
}

impl ImportArgs {
    /// Cursor for this invocation; the part's configured batch size applies
    /// when none is passed.
    fn cursor(&self, config: &Config) -> Result<PresetPartDefinition> {
        let part = config.part(&self.preset, &self.part)?;
        let arguments = CommandArguments {
            preset_name: self.preset.clone(),
            part_name: self.part.clone(),
            log_prefix: self.log_prefix.clone().unwrap_or_default(),
            current_batch: self.current_batch,
            batch_size: self.batch_size.or(part.batch_size),
            offset: self.offset,
        };
        let cursor = PresetPartDefinition::from_command_arguments(&arguments);
        Ok(match &part.label {
            Some(label) => cursor.with_label(label.clone()),
            None => cursor,
        })
    }
}

pub fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let cursor = args.cursor(&ctx.config)?;
    let report = import_batch(&ctx.db, &ctx.config, &cursor, &TracingLogger)?;

    if ctx.robot_mode {
        return emit_json(&report);
    }
    emit_human(render(&report));
    Ok(())
}

fn render(report: &BatchReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout
        .title(&format!(
            "Batch {} of {}.{}",
            report.current_batch, report.preset, report.part
        ))
        .kv("Importer", &report.kind)
        .kv("Log prefix", &report.log_prefix)
        .kv("Fetched", &report.fetched.to_string())
        .kv("Created", &style(report.created).green().to_string())
        .kv("Updated", &report.updated.to_string())
        .kv("Already processed", &report.skipped_processed.to_string())
        .kv("Existing", &report.skipped_existing.to_string())
        .kv(
            "Failed",
            &if report.failed > 0 {
                style(report.failed).red().to_string()
            } else {
                report.failed.to_string()
            },
        )
        .kv("Duration", &format_duration_ms(u128::from(report.duration_ms)));

    layout.blank();
    match &report.next {
        Some(next) => {
            layout.push_line(format!("Next: cri import {}", next.to_cli_args().join(" ")));
        }
        None => {
            layout.push_line(style("Source exhausted").dim().to_string());
        }
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PartConfig, PresetConfig};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config(batch_size: Option<u64>) -> Config {
        let mut config = Config::default();
        config.presets.insert(
            "catalog".into(),
            PresetConfig {
                label: None,
                parts: vec![PartConfig {
                    name: "products".into(),
                    label: Some("Products".into()),
                    importer: None,
                    batch_size,
                    source: PathBuf::from("products.json"),
                    site_node_path: "/sites/demo".into(),
                    storage_path: "products".into(),
                    node_type: "product".into(),
                    identifier_field: "sku".into(),
                    node_name_field: None,
                    label_field: None,
                    properties: BTreeMap::new(),
                    skip_existing_node: true,
                    skip_already_processed: true,
                }],
            },
        );
        config
    }

    fn args(batch_size: Option<u64>, offset: Option<u64>) -> ImportArgs {
        ImportArgs {
            preset: "catalog".into(),
            part: "products".into(),
            log_prefix: Some("sharedprefix".into()),
            current_batch: 3,
            batch_size,
            offset,
        }
    }

    #[test]
    fn cursor_uses_flags() {
        let cursor = args(Some(10), Some(20)).cursor(&config(Some(50))).unwrap();
        assert_eq!(cursor.batch_size(), Some(10));
        assert_eq!(cursor.offset(), Some(20));
        assert_eq!(cursor.current_batch(), 3);
        assert_eq!(cursor.log_prefix(), "sharedprefix");
        assert_eq!(cursor.label(), "Products");
    }

    #[test]
    fn cursor_falls_back_to_configured_batch_size() {
        let cursor = args(None, None).cursor(&config(Some(50))).unwrap();
        assert_eq!(cursor.batch_size(), Some(50));
        assert_eq!(cursor.offset(), Some(0));

        let unbatched = args(None, Some(5)).cursor(&config(None)).unwrap();
        assert_eq!(unbatched.batch_size(), None);
        assert_eq!(unbatched.offset(), None);
    }

    #[test]
    fn unknown_part_fails() {
        let mut bad = args(None, None);
        bad.part = "missing".into();
        assert!(bad.cursor(&config(None)).is_err());
    }
}
