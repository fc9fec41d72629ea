//! In-memory configuration storage
//!
//! Items are kept per collection, keyed by machine name, in sorted order.
//! A storage can be loaded from and written to a directory laid out like a
//! configuration export:
//!
//! ```text
//! sync/
//!   system.site.yml          default collection, item `system.site`
//!   language/fr/system.site.yml   collection `language.fr`
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_yaml::Value as YamlValue;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// The name of the default collection.
pub const DEFAULT_COLLECTION: &str = "";

/// File extension of exported items.
pub const EXTENSION: &str = "yml";

/// In-memory storage for configuration items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStorage {
    collections: BTreeMap<String, BTreeMap<String, YamlValue>>,
}

impl MemoryStorage {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an item
    pub fn write(&mut self, collection: &str, name: &str, value: YamlValue) -> Result<()> {
        validate_name(name)?;
        validate_collection(collection)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Get an item
    pub fn read(&self, collection: &str, name: &str) -> Option<&YamlValue> {
        self.collections.get(collection)?.get(name)
    }

    /// Remove an item, returning it
    pub fn delete(&mut self, collection: &str, name: &str) -> Option<YamlValue> {
        let items = self.collections.get_mut(collection)?;
        let removed = items.remove(name);
        if items.is_empty() {
            self.collections.remove(collection);
        }
        removed
    }

    /// Check if an item exists
    pub fn exists(&self, collection: &str, name: &str) -> bool {
        self.read(collection, name).is_some()
    }

    /// Names in a collection starting with `prefix`, sorted
    pub fn list_all(&self, collection: &str, prefix: &str) -> Vec<String> {
        self.collections
            .get(collection)
            .map(|items| {
                items
                    .keys()
                    .filter(|name| name.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Collections holding at least one item, sorted (default first)
    pub fn collections(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    /// Get the number of items across all collections
    pub fn len(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Iterate over all items as (collection, name, value)
    pub fn items(&self) -> impl Iterator<Item = (&str, &str, &YamlValue)> {
        self.collections.iter().flat_map(|(collection, items)| {
            items
                .iter()
                .map(move |(name, value)| (collection.as_str(), name.as_str(), value))
        })
    }

    /// Load every `*.yml` item below `root`
    ///
    /// Files directly in `root` form the default collection; files in
    /// `root/a/b/` form collection `a.b`. Hidden files and directories are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigItem` when an item cannot be parsed, and
    /// `Error::Storage` when `root` is not a directory.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::Storage {
                message: format!("Not a directory: {}", root.display()),
            });
        }

        let mut storage = Self::new();
        for (collection, name, path) in item_files(root)? {
            let content = fs::read_to_string(&path)?;
            let value = if content.trim().is_empty() {
                YamlValue::Mapping(Default::default())
            } else {
                serde_yaml::from_str(&content).map_err(|err| Error::ConfigItem {
                    path: path.clone(),
                    message: err.to_string(),
                })?
            };
            storage.write(&collection, &name, value)?;
        }

        debug!("Loaded {} items from {}", storage.len(), root.display());
        Ok(storage)
    }

    /// Write every item below `root`, replacing the previous export
    ///
    /// Existing `*.yml` files that are not in the storage are removed, so
    /// the directory mirrors the storage afterwards.
    pub fn write_dir<P: AsRef<Path>>(&self, root: P) -> Result<()> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;

        for (collection, name, path) in item_files(root)? {
            if !self.exists(&collection, &name) {
                debug!("Removing stale item {}", path.display());
                fs::remove_file(&path)?;
            }
        }

        for (collection, name, value) in self.items() {
            let dir = collection_dir(root, collection);
            fs::create_dir_all(&dir)?;
            let path = dir.join(format!("{}.{}", name, EXTENSION));
            let content = serde_yaml::to_string(value)?;
            fs::write(&path, content)?;
        }

        info!("Wrote {} items to {}", self.len(), root.display());
        Ok(())
    }
}

/// The directory holding a collection's items below `root`
pub fn collection_dir(root: &Path, collection: &str) -> PathBuf {
    collection
        .split('.')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

fn item_files(root: &Path) -> Result<Vec<(String, String, PathBuf)>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let collection = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .unwrap_or_default();
        files.push((collection, name.to_string(), path.to_path_buf()));
    }

    Ok(files)
}

fn is_hidden(file_name: &std::ffi::OsStr) -> bool {
    file_name.to_str().is_some_and(|name| name.starts_with('.'))
}

fn validate_name(name: &str) -> Result<()> {
    let message = if name.is_empty() {
        "must not be empty"
    } else if name.contains(['/', '\\']) {
        "must not contain path separators"
    } else if name.starts_with('.') {
        "must not start with a dot"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: name.to_string(),
        message: message.to_string(),
    })
}

fn validate_collection(collection: &str) -> Result<()> {
    if collection == DEFAULT_COLLECTION {
        return Ok(());
    }
    if collection.contains(['/', '\\']) || collection.split('.').any(str::is_empty) {
        return Err(Error::Storage {
            message: format!("Invalid collection name '{}'", collection),
        });
    }
    Ok(())
}
