pub mod app;
pub mod batch;
pub mod cli;
pub mod config;
pub mod content;
pub mod datatype;
pub mod error;
pub mod importer;
pub mod preset;
pub mod source;
pub mod storage;
pub mod tracker;
pub mod utils;

pub use error::{CriError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
