//! Distribution ignore filter
//!
//! When a distribution ships updated configuration, a site may want to keep
//! its own version of some items. The filter answers, per collection and
//! item, whether the distribution's value should be replaced by the value
//! in active storage.
//!
//! Patterns come from two lists: one applied in every collection and one
//! per named collection. Items can also be *retained*: kept at their active
//! version for as long as the distribution keeps shipping the exact content
//! that was retained. A retained item is identified by the SHA-256 of its
//! canonical YAML serialization; a new upstream version lifts the retention.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde_yaml::Value as YamlValue;
use sha2::{Digest, Sha256};

use crate::config::DistroSettings;
use crate::error::Result;
use crate::ignore::{apply_ignore_decision, resolve, IgnoreDecision, IgnorePattern};
use crate::storage::{MemoryStorage, DEFAULT_COLLECTION};

/// Settings key naming the default collection.
pub const DEFAULT_COLLECTION_KEY: &str = "default";

/// Content hash of a config item: hex SHA-256 of its YAML serialization.
pub fn content_hash(value: &YamlValue) -> Result<String> {
    let serialized = serde_yaml::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Per-collection ignore filter for distribution updates
#[derive(Debug, Clone, Default)]
pub struct DistroIgnoreFilter {
    all_collections: Vec<IgnorePattern>,
    collections: BTreeMap<String, Vec<IgnorePattern>>,
    retained: BTreeMap<String, String>,
}

impl DistroIgnoreFilter {
    /// Build the filter from the `distro` settings section.
    pub fn new(settings: &DistroSettings) -> Self {
        let collections = settings
            .collections
            .iter()
            .map(|(collection, patterns)| {
                let key = if collection == DEFAULT_COLLECTION_KEY {
                    DEFAULT_COLLECTION.to_string()
                } else {
                    collection.clone()
                };
                (key, IgnorePattern::parse_all(patterns))
            })
            .collect();

        Self {
            all_collections: IgnorePattern::parse_all(&settings.all_collections),
            collections,
            retained: settings.retained.clone(),
        }
    }

    /// Retain the active version of an item while upstream ships `hash`.
    pub fn retain(&mut self, collection: &str, name: &str, hash: impl Into<String>) {
        self.retained.insert(retained_key(collection, name), hash.into());
    }

    /// Patterns that apply in `collection`.
    pub fn patterns_for<'a>(&'a self, collection: &str) -> impl Iterator<Item = &'a IgnorePattern> {
        self.all_collections
            .iter()
            .chain(self.collections.get(collection).into_iter().flatten())
    }

    /// Decide whether the distribution's version of an item is ignored.
    ///
    /// `incoming` is the distribution's value, used to check retained
    /// hashes.
    pub fn decision(&self, collection: &str, name: &str, incoming: Option<&YamlValue>) -> IgnoreDecision {
        let decision = resolve(self.patterns_for(collection), collection, name);
        if decision != IgnoreDecision::NotIgnored {
            return decision;
        }

        let (Some(expected), Some(incoming)) =
            (self.retained.get(&retained_key(collection, name)), incoming)
        else {
            return decision;
        };
        match content_hash(incoming) {
            Ok(hash) if &hash == expected => {
                debug!("Retaining active version of '{}'", name);
                IgnoreDecision::Whole
            }
            Ok(_) => {
                debug!("Upstream version of '{}' changed, retention lifted", name);
                decision
            }
            Err(err) => {
                warn!("Cannot hash '{}': {}", name, err);
                decision
            }
        }
    }

    /// The value to import for one item.
    ///
    /// Returns `None` when the item should not exist after the import.
    pub fn filter_read(
        &self,
        collection: &str,
        name: &str,
        incoming: Option<YamlValue>,
        active: Option<&YamlValue>,
    ) -> Option<YamlValue> {
        let decision = self.decision(collection, name, incoming.as_ref());
        apply_ignore_decision(&decision, incoming, active)
    }

    /// The values to import for several items of one collection.
    pub fn filter_read_multiple<I, S>(
        &self,
        collection: &str,
        names: I,
        distro: &MemoryStorage,
        active: &MemoryStorage,
    ) -> BTreeMap<String, YamlValue>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.filter_read(
                    collection,
                    name,
                    distro.read(collection, name).cloned(),
                    active.read(collection, name),
                )
                .map(|value| (name.to_string(), value))
            })
            .collect()
    }

    /// Filter a whole distribution storage against active storage.
    ///
    /// The result is what active storage should hold after importing the
    /// distribution: distribution items with ignored parts replaced, plus
    /// wholly ignored active items the distribution no longer ships.
    pub fn filter_storage(&self, distro: &MemoryStorage, active: &MemoryStorage) -> Result<MemoryStorage> {
        let mut filtered = MemoryStorage::new();

        for (collection, name, value) in distro.items() {
            if let Some(value) =
                self.filter_read(collection, name, Some(value.clone()), active.read(collection, name))
            {
                filtered.write(collection, name, value)?;
            }
        }

        for (collection, name, value) in active.items() {
            if distro.exists(collection, name) {
                continue;
            }
            if let Some(value) = self.filter_read(collection, name, None, Some(value)) {
                debug!("Keeping ignored item '{}' absent from the distribution", name);
                filtered.write(collection, name, value)?;
            }
        }

        Ok(filtered)
    }
}

fn retained_key(collection: &str, name: &str) -> String {
    if collection == DEFAULT_COLLECTION {
        name.to_string()
    } else {
        format!("{}|{}", collection, name)
    }
}
