//! # Error Handling
//!
//! This module defines the centralized error type for the `config-distro`
//! library. It uses `thiserror` to derive an `Error` enum covering every
//! failure the library can report, each carrying enough context to be acted
//! upon.
//!
//! The merge and pattern-matching cores are total functions and never fail;
//! errors come from the edges: reading settings, loading and writing config
//! storage directories, and serializing reports.
//!
//! The `Result` type alias is used to return `Result<T, Error>` from
//! functions, making it easy to propagate errors up the call stack.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for config-distro operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `.config-distro.yaml` settings file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Settings parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the settings issue
        hint: Option<String>,
    },

    /// A config item in a storage directory could not be read or parsed.
    #[error("Config item error in {path}: {message}")]
    ConfigItem { path: PathBuf, message: String },

    /// An error occurred with a config storage operation.
    #[error("Storage operation error: {message}")]
    Storage { message: String },

    /// A config name is not a valid machine name.
    #[error("Invalid config name '{name}': {message}")]
    InvalidName { name: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
