//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Preset errors
//! - 2xx: Content tree errors
//! - 3xx: Config errors
//! - 4xx: Source errors
//! - 6xx: Storage errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `InvalidConfiguration` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Preset errors (1xx)
    // ========================================
    /// E101: Preset part settings lack a required identity key
    InvalidConfiguration,
    /// E102: Requested preset is not configured
    PresetNotFound,
    /// E103: Requested part is not configured in the preset
    PartNotFound,

    // ========================================
    // Content tree errors (2xx)
    // ========================================
    /// E201: Configured site node does not exist
    SiteNodeNotFound,
    /// E202: Content node was not found
    NodeNotFound,
    /// E203: Node path or node name is malformed
    InvalidNodePath,
    /// E204: A child with the same name already exists
    NodeExists,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,
    /// E302: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Source errors (4xx)
    // ========================================
    /// E401: Record source could not be read
    SourceUnreadable,
    /// E402: A source record is unusable
    RecordInvalid,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Database operation failed
    DatabaseError,
    /// E602: Serialization/deserialization failed
    SerializationError,
    /// E603: IO operation failed
    IoError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: A batch child process failed
    BatchFailed,
    /// E902: Import operation failed
    ImportFailed,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `InvalidConfiguration` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::InvalidConfiguration => 101,
            Self::PresetNotFound => 102,
            Self::PartNotFound => 103,

            Self::SiteNodeNotFound => 201,
            Self::NodeNotFound => 202,
            Self::InvalidNodePath => 203,
            Self::NodeExists => 204,

            Self::ConfigInvalid => 301,
            Self::ConfigMissingRequired => 302,

            Self::SourceUnreadable => 401,
            Self::RecordInvalid => 402,

            Self::DatabaseError => 601,
            Self::SerializationError => 602,
            Self::IoError => 603,

            Self::BatchFailed => 901,
            Self::ImportFailed => 902,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => {
                "Pass both a preset name and a part name (--preset, --part)"
            }
            Self::PresetNotFound => "Run 'cri presets' to list the configured presets",
            Self::PartNotFound => "Run 'cri presets' to list the parts of each preset",
            Self::SiteNodeNotFound => {
                "Create the site node first with 'cri init --site <path>' or fix siteNodePath"
            }
            Self::NodeNotFound => "Run 'cri tree' to inspect the content tree",
            Self::InvalidNodePath => "Node paths are absolute and use '/' separated segments",
            Self::NodeExists => "Choose another node name or skip existing nodes",
            Self::ConfigInvalid => "Check the syntax of cri.toml",
            Self::ConfigMissingRequired => "Add the missing key to the part configuration",
            Self::SourceUnreadable => "Check that the part's source file exists and is JSON",
            Self::RecordInvalid => "Check the identifier field of the offending record",
            Self::DatabaseError => "The database may be locked by another import; retry later",
            Self::SerializationError => "Report this as a bug with the failing input",
            Self::IoError => "Check file permissions and available disk space",
            Self::BatchFailed => "Inspect the batch log lines sharing the same log prefix",
            Self::ImportFailed => "Re-run the same command; processed records are skipped",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidConfiguration
            | Self::PresetNotFound
            | Self::PartNotFound
            | Self::SiteNodeNotFound
            | Self::NodeNotFound
            | Self::InvalidNodePath
            | Self::NodeExists
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::SourceUnreadable
            | Self::RecordInvalid
            | Self::DatabaseError
            | Self::IoError
            | Self::BatchFailed
            | Self::ImportFailed => true,

            Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "preset",
            2 => "content",
            3 => "config",
            4 => "source",
            6 => "storage",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over every error code.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::InvalidConfiguration,
            Self::PresetNotFound,
            Self::PartNotFound,
            Self::SiteNodeNotFound,
            Self::NodeNotFound,
            Self::InvalidNodePath,
            Self::NodeExists,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::SourceUnreadable,
            Self::RecordInvalid,
            Self::DatabaseError,
            Self::SerializationError,
            Self::IoError,
            Self::BatchFailed,
            Self::ImportFailed,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
