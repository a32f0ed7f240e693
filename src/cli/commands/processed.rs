//! cri processed - Inspect or reset processed-record tracking

use clap::{Args, Subcommand};
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ProcessedArgs {
    #[command(subcommand)]
    pub command: ProcessedCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProcessedCommand {
    /// List processed records
    List {
        /// Only entries of this importer kind
        #[arg(long)]
        kind: Option<String>,

        /// Maximum number of entries
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Entries to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Forget processed records so they are imported again
    Reset {
        /// Only entries of this importer kind
        #[arg(long)]
        kind: Option<String>,
    },
}

pub fn run(ctx: &AppContext, args: &ProcessedArgs) -> Result<()> {
    match &args.command {
        ProcessedCommand::List {
            kind,
            limit,
            offset,
        } => list(ctx, kind.as_deref(), *limit, *offset),
        ProcessedCommand::Reset { kind } => reset(ctx, kind.as_deref()),
    }
}

fn list(ctx: &AppContext, kind: Option<&str>, limit: usize, offset: usize) -> Result<()> {
    let total = ctx.db.count_processed(kind)?;
    let entries = ctx.db.list_processed(kind, limit, offset)?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "total": total,
            "count": entries.len(),
            "entries": entries,
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Processed records ({total})"));
    for entry in &entries {
        layout.push_line(format!(
            "{} {} -> {} {}",
            style(&entry.importer_kind).dim(),
            entry.external_identifier,
            entry.node_path,
            style(entry.processed_at.format("%Y-%m-%d %H:%M:%S")).dim()
        ));
    }
    if (entries.len() as u64) < total {
        layout.blank().push_line(format!(
            "Showing {} of {total}; use --offset/--limit for more",
            entries.len()
        ));
    }
    emit_human(layout);
    Ok(())
}

fn reset(ctx: &AppContext, kind: Option<&str>) -> Result<()> {
    let removed = ctx.db.reset_processed(kind)?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "kind": kind,
            "removed": removed,
        }));
    }

    let scope = kind.map_or_else(|| "all importers".to_string(), |kind| kind.to_string());
    println!(
        "{} Removed {removed} processed entries ({scope})",
        style("✓").green().bold()
    );
    Ok(())
}
