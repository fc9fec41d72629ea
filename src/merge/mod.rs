//! Three-way merge of configuration items
//!
//! A configuration item is a parsed YAML document. A synchronization merges
//! three versions of the same item: the snapshot recorded at the last sync
//! (`previous`), the version newly exported upstream (`current`), and what
//! the site is running now (`active`). The merge keeps local customizations
//! and takes upstream changes wherever the site never touched a value.
//!
//! ## Submodules
//!
//! - `three_way` - the recursive merge itself
//! - `report` - the per-key decision log produced by a merge
//!
//! ## Value helpers
//!
//! The helpers in this module give YAML values the semantics the merge rules
//! are written against: strict (order-sensitive) identity, the distinction
//! between associative and indexed containers, and coercion of any container
//! into a keyed map.

pub mod report;
pub mod three_way;

pub use report::{MergeLogEntry, MergeOperation, MergeReport};
pub use three_way::{merge_config_item_states, merge_config_item_states_into};

use serde_yaml::{Mapping, Value as YamlValue};

/// Strict identity between two YAML values.
///
/// Unlike `PartialEq` on `serde_yaml::Value`, mappings are only identical
/// when their entries appear in the same order. Numbers must also share the
/// same representation: `1` and `1.0` are not identical.
pub fn identical(a: &YamlValue, b: &YamlValue) -> bool {
    match (a, b) {
        (YamlValue::Null, YamlValue::Null) => true,
        (YamlValue::Bool(x), YamlValue::Bool(y)) => x == y,
        (YamlValue::Number(x), YamlValue::Number(y)) => x == y,
        (YamlValue::String(x), YamlValue::String(y)) => x == y,
        (YamlValue::Sequence(x), YamlValue::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| identical(l, r))
        }
        (YamlValue::Mapping(x), YamlValue::Mapping(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y)
                    .all(|((lk, lv), (rk, rv))| identical(lk, rk) && identical(lv, rv))
        }
        (YamlValue::Tagged(x), YamlValue::Tagged(y)) => {
            x.tag == y.tag && identical(&x.value, &y.value)
        }
        _ => false,
    }
}

/// Whether a value is a container (mapping or sequence).
pub fn is_container(value: &YamlValue) -> bool {
    matches!(value, YamlValue::Mapping(_) | YamlValue::Sequence(_))
}

/// Whether a value is an associative container.
///
/// A mapping is associative unless its keys are exactly the integers
/// `0..n` in order, in which case it is list-shaped. Sequences, empty
/// containers and scalars are never associative.
pub fn is_associative(value: &YamlValue) -> bool {
    match value {
        YamlValue::Mapping(map) => !map.is_empty() && !is_list_shaped(map),
        _ => false,
    }
}

/// Whether a mapping's keys are exactly `0..n` in order.
pub fn is_list_shaped(map: &Mapping) -> bool {
    map.keys()
        .enumerate()
        .all(|(index, key)| key.as_u64() == Some(index as u64))
}

/// Coerce any value into a keyed map.
///
/// Sequences become maps keyed by their integer indices; scalars and null
/// become an empty map.
pub fn to_map(value: &YamlValue) -> Mapping {
    match value {
        YamlValue::Mapping(map) => map.clone(),
        YamlValue::Sequence(seq) => seq
            .iter()
            .enumerate()
            .map(|(index, item)| (YamlValue::Number((index as u64).into()), item.clone()))
            .collect(),
        _ => Mapping::new(),
    }
}

/// Render a mapping key as a path segment label.
pub fn key_label(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "~".to_string(),
        _ => format!("{:?}", key),
    }
}

/// Get a human-readable type name for a YAML value
///
/// Used for logging and error messages to describe the type of a value.
pub fn get_yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "Null",
        YamlValue::Bool(_) => "Bool",
        YamlValue::Number(_) => "Number",
        YamlValue::String(_) => "String",
        YamlValue::Sequence(_) => "Sequence",
        YamlValue::Mapping(_) => "Mapping",
        YamlValue::Tagged(_) => "Tagged",
    }
}
