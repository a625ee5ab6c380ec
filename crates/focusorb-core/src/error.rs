//! Core error types for focusorb-core.
//!
//! Almost nothing in the engine is allowed to fail outward: bad input is
//! normalized and collaborator failures degrade to defaults. These types
//! cover what is left: configuration I/O and the failures reported by
//! external capabilities before they are swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusorb-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External capability failures (activity source, oracle, notifier)
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Failures reported by external collaborators.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// A helper process could not be spawned or exited unsuccessfully
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The capability has no implementation on this platform
    #[error("{capability} is not supported on {platform}")]
    Unsupported {
        capability: &'static str,
        platform: &'static str,
    },

    /// Anything else a collaborator wants to surface
    #[error("{0}")]
    Other(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
