//! Error types for transcoder-iac.
//!
//! Resource-level failures are reported through [`ModuleError`]; this module
//! defines the top-level error used by manifest loading, configuration and
//! the command-line front end.
//!
//! [`ModuleError`]: crate::modules::ModuleError

use std::path::PathBuf;
use thiserror::Error;

use crate::modules::ModuleError;

/// Result type alias for transcoder-iac operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for transcoder-iac.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Manifest Errors
    // ========================================================================
    /// Error parsing a manifest file.
    #[error("Failed to parse manifest '{path}': {message}")]
    ManifestParse {
        /// Path to the manifest file
        path: PathBuf,
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error validating manifest structure.
    #[error("Manifest validation failed: {0}")]
    ManifestValidation(String),

    // ========================================================================
    // Task Errors
    // ========================================================================
    /// Task execution failed.
    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        /// Task name
        task: String,
        /// Underlying module error
        #[source]
        source: ModuleError,
    },

    // ========================================================================
    // Module Errors
    // ========================================================================
    /// Module not found.
    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    /// Invalid module arguments.
    #[error("Invalid arguments for module '{module}': {message}")]
    ModuleArgs {
        /// Module name
        module: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new manifest parse error.
    pub fn manifest_parse(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ManifestParse {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates a new task failed error.
    pub fn task_failed(task: impl Into<String>, source: ModuleError) -> Self {
        Self::TaskFailed {
            task: task.into(),
            source,
        }
    }

    /// Creates a new module args error.
    pub fn module_args(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleArgs {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TaskFailed { .. } => 2,
            Error::ManifestParse { .. }
            | Error::ManifestValidation(_)
            | Error::ModuleNotFound(_)
            | Error::ModuleArgs { .. } => 4,
            Error::Config(_) | Error::InvalidConfig { .. } => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = Error::task_failed(
            "create pipeline",
            ModuleError::ExecutionFailed("boom".to_string()),
        );
        assert_eq!(err.exit_code(), 2);
        assert_eq!(Error::ManifestValidation("empty".into()).exit_code(), 4);
        assert_eq!(Error::Config("bad".into()).exit_code(), 5);
        assert_eq!(Error::Internal("oops".into()).exit_code(), 1);
    }

    #[test]
    fn test_task_failed_message_includes_source() {
        let err = Error::task_failed(
            "media pipeline",
            ModuleError::InvalidParameter("name is too long".to_string()),
        );
        let msg = err.to_string();
        assert!(msg.contains("media pipeline"));
        assert!(msg.contains("name is too long"));
    }
}
