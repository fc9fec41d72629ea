//! Storage-level three-way synchronization
//!
//! Applies the item merge to every configuration item of three storages
//! (last-synced snapshot, upstream export, active site) and produces a
//! [`SyncPlan`] describing what happens to each item. Items are independent,
//! so they are merged in parallel; each carries its own merge report.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use serde_yaml::Value as YamlValue;

use crate::error::Result;
use crate::merge::{identical, merge_config_item_states, MergeOperation, MergeReport};
use crate::storage::MemoryStorage;

/// What a synchronization does to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemChange {
    /// New upstream, absent on the site.
    Create,
    /// Merged value differs from the active value.
    Update,
    /// Removed upstream and untouched on the site.
    Delete,
    /// Upstream change not applied because the site customized or deleted
    /// the item.
    Keep,
    /// Nothing to do.
    Unchanged,
}

impl ItemChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemChange::Create => "create",
            ItemChange::Update => "update",
            ItemChange::Delete => "delete",
            ItemChange::Keep => "keep",
            ItemChange::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for ItemChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub collection: String,
    pub name: String,
    pub change: ItemChange,
    /// The value active storage should hold afterwards (`None` when it
    /// should not exist).
    #[serde(skip)]
    pub value: Option<YamlValue>,
    pub report: MergeReport,
}

/// Outcomes for every item, ordered by collection and name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncPlan {
    pub items: Vec<ItemOutcome>,
}

impl SyncPlan {
    /// Items with a given change.
    pub fn with_change(&self, change: ItemChange) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(move |item| item.change == change)
    }

    /// Number of items per change.
    pub fn summary(&self) -> BTreeMap<ItemChange, usize> {
        let mut summary = BTreeMap::new();
        for item in &self.items {
            *summary.entry(item.change).or_default() += 1;
        }
        summary
    }

    /// Whether applying the plan changes active storage.
    pub fn has_changes(&self) -> bool {
        self.items.iter().any(|item| {
            matches!(
                item.change,
                ItemChange::Create | ItemChange::Update | ItemChange::Delete
            )
        })
    }

    /// Number of logged decisions per merge operation, across all items.
    pub fn decision_counts(&self) -> BTreeMap<MergeOperation, usize> {
        MergeOperation::ALL
            .into_iter()
            .map(|operation| {
                let count = self.items.iter().map(|item| item.report.count(operation)).sum();
                (operation, count)
            })
            .collect()
    }

    /// Apply the plan to active storage.
    pub fn apply_to(&self, active: &mut MemoryStorage) -> Result<()> {
        for item in &self.items {
            match (item.change, &item.value) {
                (ItemChange::Create | ItemChange::Update, Some(value)) => {
                    active.write(&item.collection, &item.name, value.clone())?;
                }
                (ItemChange::Delete, _) => {
                    active.delete(&item.collection, &item.name);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Merge every item of three storages.
pub fn merge_storages(
    previous: &MemoryStorage,
    current: &MemoryStorage,
    active: &MemoryStorage,
) -> SyncPlan {
    let keys: BTreeSet<(&str, &str)> = [previous, current, active]
        .into_iter()
        .flat_map(|storage| storage.items().map(|(collection, name, _)| (collection, name)))
        .collect();
    let keys: Vec<(&str, &str)> = keys.into_iter().collect();

    let items = keys
        .par_iter()
        .filter_map(|&(collection, name)| {
            merge_item(
                collection,
                name,
                previous.read(collection, name),
                current.read(collection, name),
                active.read(collection, name),
            )
        })
        .collect();

    SyncPlan { items }
}

/// Merge one item given its three versions.
///
/// Returns `None` for items that exist in none of the storages that matter
/// (removed upstream and already gone from the site).
pub fn merge_item(
    collection: &str,
    name: &str,
    previous: Option<&YamlValue>,
    current: Option<&YamlValue>,
    active: Option<&YamlValue>,
) -> Option<ItemOutcome> {
    let outcome = |change, value: Option<YamlValue>, report| ItemOutcome {
        collection: collection.to_string(),
        name: name.to_string(),
        change,
        value,
        report,
    };

    let result = match (previous, current, active) {
        (previous, Some(current), Some(active)) => {
            let empty = YamlValue::Mapping(Default::default());
            let (merged, report) =
                merge_config_item_states(previous.unwrap_or(&empty), current, active);
            let change = if identical(&merged, active) {
                if report.count(MergeOperation::Ignore) > 0 {
                    ItemChange::Keep
                } else {
                    ItemChange::Unchanged
                }
            } else {
                ItemChange::Update
            };
            outcome(change, Some(merged), report)
        }
        (None, Some(current), None) => {
            outcome(ItemChange::Create, Some(current.clone()), MergeReport::new())
        }
        (Some(_), Some(_), None) => outcome(ItemChange::Keep, None, MergeReport::new()),
        (Some(previous), None, Some(active)) => {
            if identical(previous, active) {
                outcome(ItemChange::Delete, None, MergeReport::new())
            } else {
                outcome(ItemChange::Keep, Some(active.clone()), MergeReport::new())
            }
        }
        (None, None, Some(active)) => {
            outcome(ItemChange::Unchanged, Some(active.clone()), MergeReport::new())
        }
        (_, None, None) => return None,
    };

    debug!("{} '{}': {}", collection, name, result.change);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> YamlValue {
        serde_yaml::from_str(s).unwrap()
    }

    fn storage(items: &[(&str, &str)]) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        for (name, content) in items {
            storage.write("", name, yaml(content)).unwrap();
        }
        storage
    }

    fn change_of(plan: &SyncPlan, name: &str) -> ItemChange {
        plan.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.change)
            .unwrap()
    }

    #[test]
    fn test_item_changes() {
        let previous = storage(&[
            ("updated", "v: 1"),
            ("customized", "v: 1"),
            ("removed", "v: 1"),
            ("removed.custom", "v: 1"),
            ("deleted.locally", "v: 1"),
            ("same", "v: 1"),
        ]);
        let current = storage(&[
            ("updated", "v: 2"),
            ("customized", "v: 2"),
            ("deleted.locally", "v: 2"),
            ("same", "v: 1"),
            ("added", "v: 1"),
        ]);
        let active = storage(&[
            ("updated", "v: 1"),
            ("customized", "v: 5"),
            ("removed", "v: 1"),
            ("removed.custom", "v: 7"),
            ("same", "v: 1"),
            ("local.only", "v: 1"),
        ]);

        let plan = merge_storages(&previous, &current, &active);
        assert_eq!(change_of(&plan, "updated"), ItemChange::Update);
        assert_eq!(change_of(&plan, "customized"), ItemChange::Keep);
        assert_eq!(change_of(&plan, "removed"), ItemChange::Delete);
        assert_eq!(change_of(&plan, "removed.custom"), ItemChange::Keep);
        assert_eq!(change_of(&plan, "deleted.locally"), ItemChange::Keep);
        assert_eq!(change_of(&plan, "same"), ItemChange::Unchanged);
        assert_eq!(change_of(&plan, "added"), ItemChange::Create);
        assert_eq!(change_of(&plan, "local.only"), ItemChange::Unchanged);
        assert!(plan.has_changes());
    }

    #[test]
    fn test_apply_to_active() {
        let previous = storage(&[("a", "v: 1"), ("gone", "v: 1")]);
        let current = storage(&[("a", "v: 2"), ("new", "v: 1")]);
        let mut active = storage(&[("a", "v: 1"), ("gone", "v: 1")]);

        let plan = merge_storages(&previous, &current, &active);
        plan.apply_to(&mut active).unwrap();

        assert_eq!(active, current);
    }

    #[test]
    fn test_item_without_snapshot_merges_against_empty() {
        // Without a snapshot every upstream key counts as added; keys the
        // site already defines keep their local value.
        let previous = MemoryStorage::new();
        let current = storage(&[("a", "x: 1\ny: 2")]);
        let active = storage(&[("a", "x: 9\nlocal: true")]);

        let plan = merge_storages(&previous, &current, &active);
        let item = &plan.items[0];
        assert_eq!(item.change, ItemChange::Update);
        assert_eq!(item.value, Some(yaml("x: 9\nlocal: true\ny: 2")));
        assert_eq!(item.report.count(MergeOperation::Ignore), 1);
    }

    #[test]
    fn test_summary_and_decisions() {
        let previous = storage(&[("a", "v: 1"), ("b", "v: 1")]);
        let current = storage(&[("a", "v: 2"), ("b", "v: 2")]);
        let active = storage(&[("a", "v: 1"), ("b", "v: 3")]);

        let plan = merge_storages(&previous, &current, &active);
        let summary = plan.summary();
        assert_eq!(summary[&ItemChange::Update], 1);
        assert_eq!(summary[&ItemChange::Keep], 1);

        let decisions = plan.decision_counts();
        assert_eq!(decisions[&MergeOperation::Update], 1);
        assert_eq!(decisions[&MergeOperation::Ignore], 1);
        assert_eq!(decisions[&MergeOperation::Substitute], 0);
        assert_eq!(plan.with_change(ItemChange::Keep).count(), 1);
    }

    #[test]
    fn test_collections_are_independent() {
        let mut previous = MemoryStorage::new();
        let mut current = MemoryStorage::new();
        let mut active = MemoryStorage::new();
        previous.write("language.fr", "a", yaml("v: 1")).unwrap();
        current.write("language.fr", "a", yaml("v: 2")).unwrap();
        active.write("language.fr", "a", yaml("v: 1")).unwrap();
        active.write("", "a", yaml("v: 1")).unwrap();

        let plan = merge_storages(&previous, &current, &active);
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.items[0].collection, "");
        assert_eq!(plan.items[0].change, ItemChange::Unchanged);
        assert_eq!(plan.items[1].change, ItemChange::Update);
    }

    #[test]
    fn test_plan_without_changes() {
        let same = storage(&[("a", "v: 1")]);
        let plan = merge_storages(&same, &same, &same);
        assert!(!plan.has_changes());
    }
}
