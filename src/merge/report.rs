//! Merge decision log
//!
//! Every leaf decision taken by a three-way merge is recorded in a
//! [`MergeReport`]. The report is an explicit accumulator owned by the
//! caller, so merges can run repeatedly or in parallel without sharing
//! state. Reports are diagnostic only; nothing persists them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_yaml::Value as YamlValue;

/// The decision taken for a single key during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOperation {
    /// The active value was untouched locally and took the upstream value.
    Update,
    /// The active value was customized locally and was kept.
    Ignore,
    /// An indexed list was replaced wholesale by the upstream list.
    Substitute,
}

impl MergeOperation {
    /// All operations, in report order.
    pub const ALL: [MergeOperation; 3] = [
        MergeOperation::Update,
        MergeOperation::Ignore,
        MergeOperation::Substitute,
    ];

    /// The lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeOperation::Update => "update",
            MergeOperation::Ignore => "ignore",
            MergeOperation::Substitute => "substitute",
        }
    }
}

impl fmt::Display for MergeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged merge decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeLogEntry {
    /// The key the decision was taken for.
    pub name: String,
    /// The value at the last sync.
    pub previous: YamlValue,
    /// The value exported upstream.
    pub current: YamlValue,
    /// The value on the site. `Null` when the key is absent.
    pub active: YamlValue,
    /// Keys leading from the item root to `name`, excluding `name`.
    pub parents: Vec<String>,
}

impl MergeLogEntry {
    /// The full dotted key path of this entry.
    pub fn path(&self) -> String {
        self.parents
            .iter()
            .chain(std::iter::once(&self.name))
            .filter(|segment| !segment.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Accumulated merge decisions, grouped by operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergeReport {
    entries: BTreeMap<MergeOperation, Vec<MergeLogEntry>>,
}

impl MergeReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision.
    pub fn record(&mut self, operation: MergeOperation, entry: MergeLogEntry) {
        self.entries.entry(operation).or_default().push(entry);
    }

    /// Entries recorded for one operation, in decision order.
    pub fn entries(&self, operation: MergeOperation) -> &[MergeLogEntry] {
        self.entries
            .get(&operation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over every entry with its operation.
    pub fn iter(&self) -> impl Iterator<Item = (MergeOperation, &MergeLogEntry)> {
        self.entries
            .iter()
            .flat_map(|(operation, entries)| entries.iter().map(move |entry| (*operation, entry)))
    }

    /// Number of entries for one operation.
    pub fn count(&self, operation: MergeOperation) -> usize {
        self.entries(operation).len()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether no decisions were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move every entry of `other` into this report.
    pub fn absorb(&mut self, other: MergeReport) {
        for (operation, entries) in other.entries {
            self.entries.entry(operation).or_default().extend(entries);
        }
    }
}
