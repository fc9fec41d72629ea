//! # Hash Command Implementation
//!
//! Prints the content hash of a config item, as used by the `retained`
//! entries of the `distro` settings.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_yaml::Value as YamlValue;

use config_distro::distro::content_hash;
use config_distro::suggestions;

/// Print the content hash of a config item
#[derive(Args, Debug)]
pub struct HashArgs {
    /// The config item file (`*.yml`).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the `hash` command.
pub fn execute(args: HashArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .map_err(|err| suggestions::hash_input_invalid(&args.file, &err))?;
    let value: YamlValue = if content.trim().is_empty() {
        YamlValue::Mapping(Default::default())
    } else {
        serde_yaml::from_str(&content)
            .map_err(|err| suggestions::hash_input_invalid(&args.file, &err))?
    };

    println!("{}", content_hash(&value)?);
    Ok(())
}
