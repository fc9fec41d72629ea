//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `config-distro` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic, calling into the `config_distro` library.
//!
//! Loading helpers shared by several commands live here.

pub mod filter;
pub mod hash;
pub mod ignored;
pub mod merge;

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use config_distro::config::{self, Settings};
use config_distro::defaults;
use config_distro::storage::MemoryStorage;
use config_distro::suggestions;

/// Load settings from `--settings`, the working directory, or the global
/// settings file, falling back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(suggestions::settings_not_found(path));
        }
    }

    let working_dir = std::env::current_dir().context("Cannot determine working directory")?;
    match defaults::settings_file(explicit, &working_dir) {
        Some(path) => {
            info!("Using settings from {}", path.display());
            let settings = config::from_file(&path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?;
            Ok(settings)
        }
        None => {
            debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
    }
}

/// Load a storage directory given on the command line as `--<role>`.
pub fn load_storage(role: &str, path: &Path) -> Result<MemoryStorage> {
    if !path.is_dir() {
        return Err(suggestions::storage_dir_not_found(role, path));
    }
    let storage = MemoryStorage::from_dir(path)
        .with_context(|| format!("Failed to load {} storage from {}", role, path.display()))?;
    info!("Loaded {} {} items", storage.len(), role);
    Ok(storage)
}

/// Map a collection given on the command line to its storage name.
pub fn collection_arg(collection: &str) -> &str {
    if collection == config_distro::distro::DEFAULT_COLLECTION_KEY {
        config_distro::storage::DEFAULT_COLLECTION
    } else {
        collection
    }
}

/// Render a collection for display.
pub fn collection_label(collection: &str) -> &str {
    if collection.is_empty() {
        config_distro::distro::DEFAULT_COLLECTION_KEY
    } else {
        collection
    }
}
