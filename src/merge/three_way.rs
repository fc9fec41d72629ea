//! Recursive three-way merge of configuration items
//!
//! ## Rules
//!
//! At every level the three versions are inspected together. If any of them
//! is associative, all three are treated as keyed maps:
//!
//! - keys removed upstream are dropped only when the site still has the
//!   previous value;
//! - keys added upstream are appended in upstream order (integer keys get
//!   the next free index); a key the site already defines keeps its value;
//! - keys changed upstream recurse when all three sides are containers, and
//!   otherwise take the upstream value only when the site never changed it.
//!
//! The result keeps the site's key order, except at a level the site never
//! touched, which takes the upstream order.
//!
//! Indexed lists are never merged element by element: a list untouched on
//! the site is replaced by the upstream list, a customized list is kept.
//!
//! ## Example
//!
//! ```
//! use config_distro::merge::{merge_config_item_states, MergeOperation};
//!
//! let previous = serde_yaml::from_str("name: Site\nslogan: old").unwrap();
//! let current = serde_yaml::from_str("name: Site\nslogan: new").unwrap();
//! let active = serde_yaml::from_str("name: My site\nslogan: old").unwrap();
//!
//! let (merged, report) = merge_config_item_states(&previous, &current, &active);
//! assert_eq!(merged["name"].as_str(), Some("My site"));
//! assert_eq!(merged["slogan"].as_str(), Some("new"));
//! assert_eq!(report.count(MergeOperation::Update), 1);
//! ```

use log::{debug, warn};
use serde_yaml::{Mapping, Value as YamlValue};

use super::report::{MergeLogEntry, MergeOperation, MergeReport};
use super::{identical, is_associative, is_container, is_list_shaped, key_label, to_map};

/// Merge three versions of a configuration item.
///
/// Returns the merged item, which becomes the new active configuration, and
/// a fresh report of every decision taken.
pub fn merge_config_item_states(
    previous: &YamlValue,
    current: &YamlValue,
    active: &YamlValue,
) -> (YamlValue, MergeReport) {
    let mut report = MergeReport::new();
    let merged = merge_config_item_states_into(previous, current, active, &mut report);
    (merged, report)
}

/// Merge three versions of a configuration item, appending decisions to an
/// existing report.
pub fn merge_config_item_states_into(
    previous: &YamlValue,
    current: &YamlValue,
    active: &YamlValue,
    report: &mut MergeReport,
) -> YamlValue {
    let mut parents = Vec::new();
    merge_level(previous, current, active, &mut parents, report)
}

fn merge_level(
    previous: &YamlValue,
    current: &YamlValue,
    active: &YamlValue,
    parents: &mut Vec<String>,
    report: &mut MergeReport,
) -> YamlValue {
    if [previous, current, active].into_iter().any(is_associative) {
        merge_maps(previous, current, active, parents, report)
    } else {
        merge_lists(previous, current, active, parents, report)
    }
}

fn merge_maps(
    previous: &YamlValue,
    current: &YamlValue,
    active: &YamlValue,
    parents: &mut Vec<String>,
    report: &mut MergeReport,
) -> YamlValue {
    let coerced = [previous, current, active]
        .into_iter()
        .any(YamlValue::is_sequence);
    if coerced {
        warn!(
            "Treating indexed list as keyed map at '{}'",
            parents.join(".")
        );
    }

    let untouched = identical(previous, active);
    let previous = to_map(previous);
    let current = to_map(current);
    let mut result = to_map(active);

    // Removed upstream: drop only what the site left alone.
    for (key, previous_value) in &previous {
        if current.contains_key(key) {
            continue;
        }
        let unchanged = result
            .get(key)
            .is_some_and(|active_value| identical(active_value, previous_value));
        if unchanged {
            debug!("Removing '{}' at '{}'", key_label(key), parents.join("."));
            result.shift_remove(key);
        }
    }

    // Added upstream.
    let mut next_index = next_free_index(&result);
    for (key, current_value) in &current {
        if previous.contains_key(key) {
            continue;
        }
        debug!("Adding '{}' at '{}'", key_label(key), parents.join("."));
        if key.is_number() {
            result.insert(YamlValue::Number(next_index.into()), current_value.clone());
            next_index += 1;
            continue;
        }
        match result.get(key) {
            Some(active_value) if identical(active_value, current_value) => {}
            Some(active_value) => {
                let name = key_label(key);
                debug!("Keeping local '{}' at '{}'", name, parents.join("."));
                report.record(
                    MergeOperation::Ignore,
                    log_entry(name, &YamlValue::Null, current_value, active_value, parents),
                );
            }
            None => {
                result.insert(key.clone(), current_value.clone());
            }
        }
    }

    // Changed upstream.
    for (key, current_value) in &current {
        let Some(previous_value) = previous.get(key) else {
            continue;
        };
        if identical(previous_value, current_value) {
            continue;
        }

        let name = key_label(key);
        let active_value = result.get(key).cloned();
        match active_value {
            Some(active_value)
                if is_container(previous_value)
                    && is_container(current_value)
                    && is_container(&active_value) =>
            {
                parents.push(name);
                let merged = merge_level(
                    previous_value,
                    current_value,
                    &active_value,
                    parents,
                    report,
                );
                parents.pop();
                result.insert(key.clone(), merged);
            }
            Some(active_value) if identical(&active_value, previous_value) => {
                debug!("Updating '{}' at '{}'", name, parents.join("."));
                report.record(
                    MergeOperation::Update,
                    log_entry(name, previous_value, current_value, &active_value, parents),
                );
                result.insert(key.clone(), current_value.clone());
            }
            active_value => {
                debug!("Keeping customized '{}' at '{}'", name, parents.join("."));
                report.record(
                    MergeOperation::Ignore,
                    log_entry(
                        name,
                        previous_value,
                        current_value,
                        &active_value.unwrap_or(YamlValue::Null),
                        parents,
                    ),
                );
            }
        }
    }

    if untouched {
        result = ordered_like(&current, result);
    }

    if coerced && is_list_shaped(&result) {
        YamlValue::Sequence(result.into_iter().map(|(_, value)| value).collect())
    } else {
        YamlValue::Mapping(result)
    }
}

fn merge_lists(
    previous: &YamlValue,
    current: &YamlValue,
    active: &YamlValue,
    parents: &[String],
    report: &mut MergeReport,
) -> YamlValue {
    let (name, ancestors) = match parents.split_last() {
        Some((last, rest)) => (last.clone(), rest),
        None => (String::new(), parents),
    };

    if identical(previous, active) {
        debug!("Substituting list '{}'", name);
        report.record(
            MergeOperation::Substitute,
            log_entry(name, previous, current, active, ancestors),
        );
        current.clone()
    } else {
        debug!("Keeping customized list '{}'", name);
        report.record(
            MergeOperation::Ignore,
            log_entry(name, previous, current, active, ancestors),
        );
        active.clone()
    }
}

/// Keys shared with `reference` first, in its order, then the rest.
fn ordered_like(reference: &Mapping, mut map: Mapping) -> Mapping {
    let mut ordered = Mapping::with_capacity(map.len());
    for key in reference.keys() {
        if let Some(value) = map.shift_remove(key) {
            ordered.insert(key.clone(), value);
        }
    }
    ordered.extend(map);
    ordered
}

fn next_free_index(map: &Mapping) -> u64 {
    map.keys()
        .filter_map(YamlValue::as_u64)
        .max()
        .map_or(0, |max| max + 1)
}

fn log_entry(
    name: String,
    previous: &YamlValue,
    current: &YamlValue,
    active: &YamlValue,
    parents: &[String],
) -> MergeLogEntry {
    MergeLogEntry {
        name,
        previous: previous.clone(),
        current: current.clone(),
        active: active.clone(),
        parents: parents.to_vec(),
    }
}
