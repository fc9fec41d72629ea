//! # Config Distro Library
//!
//! This library provides the core functionality for synchronizing exported
//! site configuration with an upstream distribution. It is designed to be
//! used by the `config-distro` command-line tool but can also be integrated
//! into other applications that import and export configuration.
//!
//! ## Quick Example
//!
//! ```
//! use config_distro::ignore::{ConfigIgnoreConfig, Direction, IgnoreDecision, SyncOperation};
//! use config_distro::merge::merge_config_item_states;
//!
//! // Merge an upstream change into a customized site
//! let previous = serde_yaml::from_str("name: Site\npage: /node").unwrap();
//! let current = serde_yaml::from_str("name: Site\npage: /home").unwrap();
//! let active = serde_yaml::from_str("name: My site\npage: /node").unwrap();
//! let (merged, _report) = merge_config_item_states(&previous, &current, &active);
//! assert_eq!(merged["name"].as_str(), Some("My site"));
//! assert_eq!(merged["page"].as_str(), Some("/home"));
//!
//! // Decide what an import leaves alone
//! let ignore = ConfigIgnoreConfig::simple(["system.site:name", "webform.*"]);
//! let decision = ignore.is_ignored("", "system.site", Direction::Import, SyncOperation::Update);
//! assert_eq!(decision, IgnoreDecision::Keys(vec!["name".to_string()]));
//! ```
//!
//! ## Core Concepts
//!
//! - **Merge (`merge`)**: The recursive three-way merge of one config item
//!   (last-synced snapshot, upstream export, active site) and the report of
//!   every decision it takes.
//! - **Ignore patterns (`ignore`)**: Parsing `[~][collection|]name[:key]`
//!   patterns and resolving them into per-item decisions, organised by
//!   direction and operation.
//! - **Distribution filter (`distro`)**: Per-collection ignore patterns and
//!   retained items applied when importing a distribution.
//! - **Storage (`storage`, `sync`)**: In-memory config storages loaded from
//!   export directories, and the storage-wide merge built on the item merge.
//! - **Settings (`config`)**: The `.config-distro.yaml` schema.

pub mod config;
pub mod defaults;
pub mod distro;
pub mod error;
pub mod ignore;
pub mod merge;
pub mod output;
pub mod storage;
pub mod suggestions;
pub mod sync;

#[cfg(test)]
mod merge_proptest;
