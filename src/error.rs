//! Error types for guidance requests
//!
//! Errors are classified by who has to act on them:
//! - Validation: the request itself is malformed (4xx-equivalent)
//! - Configuration: caller/engine mismatch or a bad engine config file
//!
//! Every rule is total, so nothing can fail once the pipeline has started.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::Module;

/// Error types for the guidance pipeline and its configuration layer
#[derive(Debug, Error)]
pub enum AtosError {
    // Validation errors
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Question is {len} characters; the limit is {max}")]
    QuestionTooLong { len: usize, max: usize },

    #[error("Snapshot module '{snapshot}' does not match requested module '{requested}'")]
    ModuleMismatch { requested: String, snapshot: String },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    // Configuration errors
    #[error("Snapshot module is not supported: {0}")]
    UnsupportedSnapshotModule(String),

    #[error("No rule catalogue registered for module: {0}")]
    MissingRuleCatalogue(Module),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Configuration,
}

impl AtosError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtosError::UnknownModule(_)
            | AtosError::QuestionTooLong { .. }
            | AtosError::ModuleMismatch { .. }
            | AtosError::MalformedRequest(_) => ErrorKind::Validation,
            _ => ErrorKind::Configuration,
        }
    }

    /// Returns true if the caller can fix this by changing the request
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AtosError::UnknownModule(_) => "unknown-module",
            AtosError::QuestionTooLong { .. } => "question-too-long",
            AtosError::ModuleMismatch { .. } => "module-mismatch",
            AtosError::MalformedRequest(_) => "malformed-request",
            AtosError::UnsupportedSnapshotModule(_) => "unsupported-snapshot-module",
            AtosError::MissingRuleCatalogue(_) => "missing-rule-catalogue",
            AtosError::InvalidConfig(_) => "invalid-config",
            AtosError::ConfigRead { .. } => "config-read",
            AtosError::ConfigParse(_) => "config-parse",
        }
    }
}

/// Serializable error representation handed back to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AtosError> for ErrorReport {
    fn from(err: &AtosError) -> Self {
        ErrorReport {
            code: err.code().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
