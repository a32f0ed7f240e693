//! cri presets - List configured presets and their parts

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::config::Config;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Only show this preset
    #[arg(long)]
    pub preset: Option<String>,
}

#[derive(Debug, Serialize)]
struct PresetEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    parts: Vec<PartEntry>,
}

#[derive(Debug, Serialize)]
struct PartEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    importer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_size: Option<u64>,
    source: String,
    site_node_path: String,
    storage_path: String,
    node_type: String,
}

pub fn run(ctx: &AppContext, args: &PresetsArgs) -> Result<()> {
    let entries = collect(&ctx.config, args.preset.as_deref())?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "count": entries.len(),
            "presets": entries,
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title("Presets");
    if entries.is_empty() {
        layout.push_line(format!(
            "No presets configured in {}",
            ctx.config_path.display()
        ));
    }
    for entry in &entries {
        let heading = match &entry.label {
            Some(label) => format!("{} ({label})", entry.name),
            None => entry.name.clone(),
        };
        layout.section(&heading);
        for part in &entry.parts {
            let batching = part
                .batch_size
                .map_or_else(|| "unbatched".to_string(), |size| format!("batches of {size}"));
            layout.bullet(&format!(
                "{} {} {}",
                style(&part.name).bold(),
                style(format!("[{}]", part.importer)).dim(),
                batching
            ));
            layout.push_line(format!(
                "  {} -> {}/{} ({})",
                part.source, part.site_node_path, part.storage_path, part.node_type
            ));
        }
        layout.blank();
    }
    emit_human(layout);
    Ok(())
}

fn collect(config: &Config, only: Option<&str>) -> Result<Vec<PresetEntry>> {
    if let Some(name) = only {
        config.preset(name)?;
    }
    Ok(config
        .presets
        .iter()
        .filter(|(name, _)| only.is_none_or(|only| only == name.as_str()))
        .map(|(name, preset)| PresetEntry {
            name: name.clone(),
            label: preset.label.clone(),
            parts: preset
                .parts
                .iter()
                .map(|part| PartEntry {
                    name: part.name.clone(),
                    label: part.label.clone(),
                    importer: part.importer_kind(name),
                    batch_size: part.batch_size.filter(|size| *size > 0),
                    source: config.source_path(part).display().to_string(),
                    site_node_path: part.site_node_path.clone(),
                    storage_path: part.storage_path.clone(),
                    node_type: part.node_type.clone(),
                })
                .collect(),
        })
        .collect())
}
