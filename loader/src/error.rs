//! Error types for loading model and configuration files.

use thiserror::Error;

use command_model_core::DefinitionError;

/// Errors that can occur while loading a model or configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The model parsed but does not describe a valid command tree.
    #[error("invalid model: {0}")]
    Definition(#[from] DefinitionError),

    /// A declared default cannot be converted to the argument's value type.
    #[error("invalid default for '{argument}': {reason}")]
    InvalidDefault { argument: String, reason: String },

    /// The file extension names no supported format.
    #[error("unsupported file format: '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    /// The configuration names a documentation dialect that does not exist.
    #[error("unknown documentation dialect '{0}'")]
    UnknownDialect(String),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
