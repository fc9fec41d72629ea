//! # Filter Command Implementation
//!
//! This module implements the `filter` subcommand, which imports a
//! distribution's configuration into a site while keeping the items and
//! keys the `distro` settings ignore, and items retained at their active
//! version.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use config_distro::distro::DistroIgnoreFilter;
use config_distro::output::{emoji, OutputConfig};

use super::{collection_label, load_settings, load_storage};

/// Import a distribution through the distro ignore filter
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// The distribution's configuration export.
    #[arg(long, value_name = "DIR")]
    pub distro: PathBuf,

    /// The site's active configuration.
    #[arg(long, value_name = "DIR")]
    pub active: PathBuf,

    /// Where to write the filtered configuration.
    ///
    /// Defaults to the active directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Path to the settings file.
    ///
    /// Defaults to `.config-distro.yaml` in the working directory.
    /// Can also be set with the `CONFIG_DISTRO_SETTINGS` environment variable.
    #[arg(short, long, value_name = "FILE", env = "CONFIG_DISTRO_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Show what would be kept without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `filter` command.
pub fn execute(args: FilterArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let settings = load_settings(args.settings.as_deref())?;
    let filter = DistroIgnoreFilter::new(&settings.distro);

    let distro = load_storage("distro", &args.distro)?;
    let active = load_storage("active", &args.active)?;

    println!("{} Filtering distribution", emoji(&out, "🔍", "[FILTER]"));
    let filtered = filter.filter_storage(&distro, &active)?;

    let mut kept = 0;
    for (collection, name, value) in filtered.items() {
        if distro.read(collection, name) == Some(value) {
            continue;
        }
        let label = if collection.is_empty() {
            name.to_string()
        } else {
            format!("{}|{}", collection_label(collection), name)
        };
        println!("  kept  {}", label);
        kept += 1;
    }
    println!(
        "\n{} {} items, {} kept from the site",
        emoji(&out, "📊", "[INFO]"),
        filtered.len(),
        kept
    );

    if args.dry_run {
        return Ok(());
    }

    let output = args.output.unwrap_or(args.active);
    filtered
        .write_dir(&output)
        .with_context(|| format!("Failed to write filtered configuration to {}", output.display()))?;
    println!(
        "{} Wrote filtered configuration to {}",
        emoji(&out, "✅", "[OK]"),
        output.display()
    );
    Ok(())
}
