//! cri run - Import every batch of a preset, part by part

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::batch::{
    BatchExecutor, ChildProcessExecutor, InProcessExecutor, PartSummary, drive_part,
};
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::config::PartConfig;
use crate::error::Result;
use crate::importer::TracingLogger;
use crate::preset::PresetPartDefinition;
use crate::utils::format_duration_ms;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Preset name
    #[arg(long)]
    pub preset: String,

    /// Only run this part
    #[arg(long)]
    pub part: Option<String>,

    /// Run batches inside this process instead of one child process per batch
    #[arg(long)]
    pub in_process: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    status: &'static str,
    preset: String,
    mode: &'static str,
    parts: Vec<PartSummary>,
}

pub fn run(ctx: &AppContext, args: &RunArgs) -> Result<()> {
    let preset = ctx.config.preset(&args.preset)?;
    let parts: Vec<&PartConfig> = match &args.part {
        Some(name) => vec![ctx.config.part(&args.preset, name)?],
        None => preset.parts.iter().collect(),
    };

    let logger = TracingLogger;
    let executor: Box<dyn BatchExecutor + '_> = if args.in_process {
        Box::new(InProcessExecutor::new(&ctx.db, &ctx.config, &logger))
    } else {
        Box::new(ChildProcessExecutor::current(
            ctx.root.clone(),
            ctx.config_path.clone(),
            ctx.verbosity,
        )?)
    };

    let mut summaries = Vec::with_capacity(parts.len());
    for part in parts {
        let settings = part.settings(&args.preset)?;
        let cursor = PresetPartDefinition::new(&settings, None)?;
        summaries.push(drive_part(executor.as_ref(), cursor)?);
    }

    let summary = RunSummary {
        status: "ok",
        preset: args.preset.clone(),
        mode: if args.in_process {
            "in-process"
        } else {
            "child-process"
        },
        parts: summaries,
    };

    if ctx.robot_mode {
        return emit_json(&summary);
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Preset {}", summary.preset));
    for part in &summary.parts {
        layout.section(&part.part);
        layout
            .kv("Importer", &part.kind)
            .kv("Log prefix", &part.log_prefix)
            .kv("Batches", &part.batches.to_string())
            .kv("Created", &style(part.created).green().to_string())
            .kv("Updated", &part.updated.to_string())
            .kv(
                "Skipped",
                &(part.skipped_processed + part.skipped_existing).to_string(),
            )
            .kv("Failed", &part.failed.to_string())
            .kv("Duration", &format_duration_ms(u128::from(part.duration_ms)))
            .blank();
    }
    emit_human(layout);
    Ok(())
}
