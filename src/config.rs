//! # Settings Schema and Parsing
//!
//! This module defines the data structures for the `.config-distro.yaml`
//! settings file and the logic for parsing it. The file has two optional
//! sections:
//!
//! - **`ignore`**: ignore patterns applied to import and export, organised
//!   by [`IgnoreMode`].
//! - **`distro`**: patterns and retained hashes for the distribution ignore
//!   filter.
//!
//! ```yaml
//! ignore:
//!   mode: intermediate
//!   import: ["system.site", "webform.webform.*"]
//!   export: ["~system.site:page"]
//! distro:
//!   all_collections: ["system.performance"]
//!   collections:
//!     language.fr: ["views.view.*"]
//!   retained:
//!     system.site: 5c1f...
//! ```
//!
//! An empty file yields the default settings, which ignore nothing.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ignore::SyncOperation;

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Ignore patterns for import and export
    #[serde(default)]
    pub ignore: IgnoreSettings,
    /// Distribution ignore filter
    #[serde(default)]
    pub distro: DistroSettings,
}

/// How ignore patterns are organised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreMode {
    /// One list applies to every direction and operation.
    #[default]
    Simple,
    /// Separate lists for import and export.
    Intermediate,
    /// Separate lists per direction and per operation.
    Advanced,
}

/// The `ignore` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreSettings {
    #[serde(default)]
    pub mode: IgnoreMode,
    /// Patterns for simple mode
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Patterns applied on import (intermediate and advanced modes)
    #[serde(default)]
    pub import: PatternList,
    /// Patterns applied on export (intermediate and advanced modes)
    #[serde(default)]
    pub export: PatternList,
}

/// Either a plain list of patterns or one list per operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    List(Vec<String>),
    PerOperation(OperationPatterns),
}

impl Default for PatternList {
    fn default() -> Self {
        PatternList::List(Vec::new())
    }
}

impl PatternList {
    /// The patterns for one operation. A plain list applies to all of them.
    pub fn for_operation(&self, operation: SyncOperation) -> &[String] {
        match self {
            PatternList::List(patterns) => patterns.as_slice(),
            PatternList::PerOperation(lists) => match operation {
                SyncOperation::Create => lists.create.as_slice(),
                SyncOperation::Update => lists.update.as_slice(),
                SyncOperation::Delete => lists.delete.as_slice(),
            },
        }
    }
}

/// Per-operation pattern lists (advanced mode)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationPatterns {
    #[serde(default)]
    pub create: Vec<String>,
    #[serde(default)]
    pub update: Vec<String>,
    #[serde(default)]
    pub delete: Vec<String>,
}

/// The `distro` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistroSettings {
    /// Patterns applied in every collection
    #[serde(default)]
    pub all_collections: Vec<String>,
    /// Patterns applied in one named collection (`default` for the default
    /// collection)
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<String>>,
    /// Items kept at their active version while the upstream content hash
    /// matches. Keys are `name` or `collection|name`.
    #[serde(default)]
    pub retained: BTreeMap<String, String>,
}

/// Parse a settings YAML string
pub fn parse(yaml_content: &str) -> Result<Settings> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str::<Settings>(yaml_content).map_err(|err| {
        let message = err.to_string();
        let hint = if message.contains("unknown variant") {
            Some("Valid ignore modes are: simple, intermediate, advanced".to_string())
        } else if message.contains("unknown field") {
            Some("Valid sections are 'ignore' and 'distro'; see the settings reference".to_string())
        } else if message.contains("did not match any variant of untagged enum PatternList") {
            Some("Give a list of patterns, or a mapping with create/update/delete lists".to_string())
        } else {
            None
        };
        Error::ConfigParse { message, hint }
    })
}

/// Load settings from a file
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
