//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Content Repository Importer - batched, resumable imports into a content tree
#[derive(Parser, Debug)]
#[command(name = "cri")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the database and the default config file
    #[arg(long, global = true, env = "CRI_ROOT", default_value = ".cri")]
    pub root: PathBuf,

    /// Config file path (default: <root>/cri.toml)
    #[arg(long, global = true, env = "CRI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable JSON output for machine consumption
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and the site nodes
    Init(commands::init::InitArgs),

    /// List configured presets and their parts
    Presets(commands::presets::PresetsArgs),

    /// Import exactly one batch of a preset part
    Import(commands::import::ImportArgs),

    /// Import every batch of a preset
    Run(commands::run::RunArgs),

    /// Inspect or reset processed-record tracking
    Processed(commands::processed::ProcessedArgs),

    /// Print the content tree
    Tree(commands::tree::TreeArgs),
}
