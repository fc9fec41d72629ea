//! # Ignored Command Implementation
//!
//! This module implements the `ignored` subcommand, which lists the config
//! items of a storage directory that the configured ignore patterns leave
//! alone for a given direction and operation.
//!
//! This command is a safe, read-only operation that does not modify any files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use config_distro::ignore::{ConfigIgnoreConfig, Direction, IgnoreDecision, SyncOperation};
use config_distro::output::{decision_label, emoji, OutputConfig};
use config_distro::suggestions;

use super::{collection_arg, collection_label, load_settings, load_storage};

/// Listing format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Text,
    Json,
}

/// List ignored config items
#[derive(Args, Debug)]
pub struct IgnoredArgs {
    /// Storage directory whose items are checked.
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Only check one collection (`default` for the default collection).
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Synchronization direction (import or export).
    #[arg(long, value_name = "DIRECTION", default_value = "import")]
    pub direction: Direction,

    /// Synchronization operation (create, update or delete).
    #[arg(long, value_name = "OPERATION", default_value = "update")]
    pub operation: SyncOperation,

    /// Path to the settings file.
    ///
    /// Defaults to `.config-distro.yaml` in the working directory.
    /// Can also be set with the `CONFIG_DISTRO_SETTINGS` environment variable.
    #[arg(short, long, value_name = "FILE", env = "CONFIG_DISTRO_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: ListFormat,
}

/// Execute the `ignored` command.
pub fn execute(args: IgnoredArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let settings = load_settings(args.settings.as_deref())?;
    let ignore = ConfigIgnoreConfig::from_settings(&settings.ignore)?;
    let storage = load_storage("source", &args.source)?;

    let collections = match &args.collection {
        Some(requested) => {
            let collection = collection_arg(requested);
            let available = storage.collections();
            if !available.iter().any(|name| name == collection) {
                return Err(suggestions::unknown_collection(requested, &available));
            }
            vec![collection.to_string()]
        }
        None => storage.collections(),
    };

    let mut ignored: BTreeMap<String, BTreeMap<String, IgnoreDecision>> = BTreeMap::new();
    for collection in &collections {
        let decisions = ignore.get_ignored_configs(
            collection,
            storage.list_all(collection, ""),
            args.direction,
            args.operation,
        );
        if !decisions.is_empty() {
            ignored.insert(collection_label(collection).to_string(), decisions);
        }
    }

    match args.format {
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&ignored)
                .context("Failed to serialize ignored items")?;
            println!("{}", json);
        }
        ListFormat::Text => {
            println!(
                "{} Ignored on {} {}:",
                emoji(&out, "🙈", "[IGNORED]"),
                args.direction,
                args.operation
            );
            let mut total = 0;
            for (collection, decisions) in &ignored {
                println!("  {}", collection);
                for (name, decision) in decisions {
                    println!("    {}  {}", name, decision_label(&out, decision));
                    total += 1;
                }
            }
            if total == 0 {
                println!("  (nothing)");
            }
        }
    }
    Ok(())
}
