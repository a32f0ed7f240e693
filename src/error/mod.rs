//! Error handling for cri.
//!
//! This module provides:
//! - [`CriError`]: The main error enum for all cri operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestion and context

mod codes;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for cri operations.
#[derive(Error, Debug)]
pub enum CriError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Part '{part}' not found in preset '{preset}'")]
    PartNotFound { preset: String, part: String },

    #[error("Site node not found ({0})")]
    SiteNodeNotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid node path: {0}")]
    InvalidNodePath(String),

    #[error("Node already exists: {0}")]
    NodeExists(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Batch failed: {0}")]
    BatchFailed(String),

    #[error("Import error: {0}")]
    Import(String),
}

impl CriError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            Self::PresetNotFound(_) => ErrorCode::PresetNotFound,
            Self::PartNotFound { .. } => ErrorCode::PartNotFound,
            Self::SiteNodeNotFound(_) => ErrorCode::SiteNodeNotFound,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::InvalidNodePath(_) => ErrorCode::InvalidNodePath,
            Self::NodeExists(_) => ErrorCode::NodeExists,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::Source(_) => ErrorCode::SourceUnreadable,
            Self::InvalidRecord(_) => ErrorCode::RecordInvalid,
            Self::BatchFailed(_) => ErrorCode::BatchFailed,
            Self::Import(_) => ErrorCode::ImportFailed,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::PresetNotFound(preset) => Some(serde_json::json!({ "preset": preset })),
            Self::PartNotFound { preset, part } => {
                Some(serde_json::json!({ "preset": preset, "part": part }))
            }
            Self::SiteNodeNotFound(path) => Some(serde_json::json!({ "site_node_path": path })),
            Self::NodeNotFound(path) => Some(serde_json::json!({ "path": path })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_cri_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "SITE_NODE_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "preset", "content")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a `CriError`.
    #[must_use]
    pub fn from_cri_error(err: &CriError) -> Self {
        let mut structured = Self::new(err.code(), err.to_string());
        structured.context = err.context();
        structured
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&CriError> for StructuredError {
    fn from(err: &CriError) -> Self {
        Self::from_cri_error(err)
    }
}

/// Result type alias using `CriError`.
pub type Result<T> = std::result::Result<T, CriError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cri_error_code_mapping() {
        assert_eq!(
            CriError::InvalidConfiguration("x".into()).code(),
            ErrorCode::InvalidConfiguration
        );
        assert_eq!(
            CriError::SiteNodeNotFound("/sites/x".into()).code(),
            ErrorCode::SiteNodeNotFound
        );
        assert_eq!(CriError::Config("bad".into()).code(), ErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_site_node_not_found_message() {
        let err = CriError::SiteNodeNotFound("/sites/demo".into());
        assert_eq!(err.to_string(), "Site node not found (/sites/demo)");
    }

    #[test]
    fn test_structured_error_from_cri_error() {
        let err = CriError::PartNotFound {
            preset: "catalog".into(),
            part: "products".into(),
        };
        let structured = err.to_structured();

        assert_eq!(structured.code, ErrorCode::PartNotFound);
        assert_eq!(structured.numeric_code, 103);
        assert!(structured.message.contains("products"));
        assert_eq!(structured.category, "preset");
        let ctx = structured.context.unwrap();
        assert_eq!(ctx["preset"], "catalog");
    }

    #[test]
    fn test_structured_error_serialization() {
        let err = StructuredError::new(ErrorCode::SiteNodeNotFound, "Site node not found (/x)");
        let json = serde_json::to_string(&err).unwrap();

        assert!(json.contains("SITE_NODE_NOT_FOUND"));
        assert!(json.contains("\"numeric_code\":201"));
        assert!(json.contains("\"category\":\"content\""));
        assert!(!json.contains("\"context\""));
    }

    #[test]
    fn test_structured_error_display() {
        let err = StructuredError::new(ErrorCode::InvalidConfiguration, "missing preset");
        assert_eq!(format!("{err}"), "[E101] missing preset");
    }
}
