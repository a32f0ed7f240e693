//! Shared state handed to every command.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::Result;
use crate::storage::Database;

pub struct AppContext {
    /// Directory holding the database and the default config file.
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub db: Database,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = cli.root.clone();
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
        let config = Config::load(Some(config_path.as_path()), &root)?;
        let db_path = config.database_path(&root);
        let db = Database::open(&db_path)?;
        tracing::debug!(
            root = %root.display(),
            config = %config_path.display(),
            db = %db_path.display(),
            "context ready"
        );

        Ok(Self {
            root,
            config_path,
            config,
            db,
            robot_mode: cli.robot,
            verbosity: cli.verbose,
        })
    }
}
