//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod import;
pub mod init;
pub mod presets;
pub mod processed;
pub mod run;
pub mod tree;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Init(args) => init::run(ctx, args),
        Commands::Presets(args) => presets::run(ctx, args),
        Commands::Import(args) => import::run(ctx, args),
        Commands::Run(args) => run::run(ctx, args),
        Commands::Processed(args) => processed::run(ctx, args),
        Commands::Tree(args) => tree::run(ctx, args),
    }
}
