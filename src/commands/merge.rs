//! # Merge Command Implementation
//!
//! This module implements the `merge` subcommand, which merges an upstream
//! configuration export into a site's active configuration.
//!
//! ## Functionality
//!
//! - **Three-way merge**: Every item of the previous, current and active
//!   storages is merged; local customizations survive upstream changes.
//! - **Plan output**: Lists what happens to each changed item, optionally
//!   with the per-key merge report, as text or JSON.
//! - **Dry run**: `--dry-run` prints the plan without writing anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::info;

use config_distro::merge::MergeOperation;
use config_distro::output::{change_label, emoji, operation_label, OutputConfig};
use config_distro::sync::{merge_storages, ItemChange, SyncPlan};

use super::{collection_label, load_storage};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Merge an upstream export into the active configuration
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Export recorded at the last synchronization.
    #[arg(long, value_name = "DIR")]
    pub previous: PathBuf,

    /// New upstream export.
    #[arg(long, value_name = "DIR")]
    pub current: PathBuf,

    /// The site's active configuration.
    #[arg(long, value_name = "DIR")]
    pub active: PathBuf,

    /// Where to write the merged configuration.
    ///
    /// Defaults to the active directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also print every merge decision, as text or JSON.
    #[arg(long, value_name = "FORMAT")]
    pub report: Option<ReportFormat>,

    /// Show the plan without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `merge` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: MergeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let previous = load_storage("previous", &args.previous)?;
    let current = load_storage("current", &args.current)?;
    let mut active = load_storage("active", &args.active)?;

    let plan = merge_storages(&previous, &current, &active);

    if args.report == Some(ReportFormat::Json) {
        let json = serde_json::to_string_pretty(&plan).context("Failed to serialize merge plan")?;
        println!("{}", json);
    } else {
        print_plan(&out, &plan, args.report == Some(ReportFormat::Text));
    }

    if args.dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }
    // Merging in place with nothing to change leaves the directory alone.
    if !plan.has_changes() && args.output.is_none() {
        return Ok(());
    }

    plan.apply_to(&mut active)?;
    let output = args.output.unwrap_or(args.active);
    active
        .write_dir(&output)
        .with_context(|| format!("Failed to write merged configuration to {}", output.display()))?;

    if args.report != Some(ReportFormat::Json) {
        println!(
            "{} Wrote merged configuration to {}",
            emoji(&out, "✅", "[OK]"),
            output.display()
        );
    }
    Ok(())
}

fn print_plan(out: &OutputConfig, plan: &SyncPlan, with_decisions: bool) {
    println!("{} Merging configuration", emoji(out, "🔀", "[MERGE]"));

    for item in &plan.items {
        if item.change == ItemChange::Unchanged && item.report.is_empty() {
            continue;
        }
        println!(
            "  {} {}{}",
            change_label(out, item.change),
            collection_prefix(&item.collection),
            item.name
        );

        if with_decisions {
            for (operation, entry) in item.report.iter() {
                let path = entry.path();
                let path = if path.is_empty() { "(item)" } else { path.as_str() };
                println!("      {} {}", operation_label(out, operation), path);
            }
        }
    }

    let summary = plan.summary();
    let counts: Vec<String> = [
        ItemChange::Create,
        ItemChange::Update,
        ItemChange::Delete,
        ItemChange::Keep,
    ]
    .into_iter()
    .map(|change| format!("{} {}", summary.get(&change).copied().unwrap_or(0), change))
    .collect();
    println!("\n{} Summary: {}", emoji(out, "📊", "[INFO]"), counts.join(", "));

    if with_decisions {
        let decisions = plan.decision_counts();
        let counts: Vec<String> = MergeOperation::ALL
            .into_iter()
            .map(|operation| format!("{} {}", decisions[&operation], operation))
            .collect();
        println!("   Decisions: {}", counts.join(", "));
    }
}

fn collection_prefix(collection: &str) -> String {
    if collection.is_empty() {
        String::new()
    } else {
        format!("{}|", collection_label(collection))
    }
}
