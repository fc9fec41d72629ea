//! Applying ignore decisions to item values
//!
//! Key-scoped decisions name dotted key paths inside an item
//! (`display.default.display_options.pager`). A path segment of `*` matches
//! any key at that level, and a segment containing `*` matches keys by glob.
//! Dots inside a key are written as `\.`.
//!
//! When an item is imported, ignored key paths keep the active value: it is
//! copied over the incoming value, or the key is removed when the active
//! item does not have it. Exempt paths (`~` entries) keep the incoming value.

use std::cmp::Ordering;

use serde_yaml::Value as YamlValue;

use super::pattern::GlobMatcher;
use super::resolver::IgnoreDecision;
use crate::merge::key_label;

/// A segment of a key path pattern.
#[derive(Clone, Debug)]
pub enum PathSegment {
    /// A literal key.
    Key(String),
    /// A key glob containing `*`, compiled when the path is parsed.
    Glob { glob: String, matcher: GlobMatcher },
}

impl PathSegment {
    /// A glob segment.
    pub fn glob(glob: impl Into<String>) -> Self {
        let glob = glob.into();
        let matcher = GlobMatcher::new(&glob);
        PathSegment::Glob { glob, matcher }
    }

    fn matches(&self, label: &str) -> bool {
        match self {
            PathSegment::Key(key) => key == label,
            PathSegment::Glob { matcher, .. } => matcher.matches(label),
        }
    }
}

impl PartialEq for PathSegment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PathSegment::Key(a), PathSegment::Key(b)) => a == b,
            (PathSegment::Glob { glob: a, .. }, PathSegment::Glob { glob: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for PathSegment {}

/// Parse a dotted key path pattern into segments.
///
/// Supports:
/// - Dot notation: `foo.bar.baz`
/// - Wildcards: `foo.*.baz`, `foo.ba*`
/// - Escaped characters: `foo\.bar` (literal dot)
///
/// # Examples
///
/// ```
/// use config_distro::ignore::keys::{parse_key_path, PathSegment};
///
/// let segments = parse_key_path(r"dependencies.*.module\.name");
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[1], PathSegment::glob("*"));
/// ```
pub fn parse_key_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut wildcard = false;
    let mut escaped = false;

    let mut finish = |current: &mut String, wildcard: &mut bool| {
        if !current.is_empty() {
            let text = std::mem::take(current);
            segments.push(if *wildcard {
                PathSegment::glob(text)
            } else {
                PathSegment::Key(text)
            });
        }
        *wildcard = false;
    };

    for ch in path.trim().chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '.' => finish(&mut current, &mut wildcard),
            '*' => {
                wildcard = true;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    finish(&mut current, &mut wildcard);

    segments
}

/// Expand a key path pattern into the concrete paths present in `value`.
pub fn expand_key_path(value: &YamlValue, segments: &[PathSegment]) -> Vec<Vec<String>> {
    let Some((first, rest)) = segments.split_first() else {
        return vec![Vec::new()];
    };

    children(value)
        .into_iter()
        .filter(|(label, _)| first.matches(label))
        .flat_map(|(label, child)| {
            expand_key_path(child, rest).into_iter().map(move |mut tail| {
                tail.insert(0, label.clone());
                tail
            })
        })
        .collect()
}

fn children(value: &YamlValue) -> Vec<(String, &YamlValue)> {
    match value {
        YamlValue::Mapping(map) => map.iter().map(|(k, v)| (key_label(k), v)).collect(),
        YamlValue::Sequence(seq) => seq
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => Vec::new(),
    }
}

/// Read the value at a concrete key path.
pub fn read_key_path<'a>(value: &'a YamlValue, path: &[String]) -> Option<&'a YamlValue> {
    let mut current = value;
    for segment in path {
        current = match current {
            YamlValue::Mapping(map) => map
                .iter()
                .find(|(key, _)| key_label(key) == *segment)
                .map(|(_, value)| value)?,
            YamlValue::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write a value at a concrete key path, creating intermediate mappings.
///
/// Scalars in the way are replaced by mappings. Returns `false` when a
/// sequence index lies past the end of the sequence.
pub fn write_key_path(value: &mut YamlValue, path: &[String], new_value: YamlValue) -> bool {
    let Some((last, parents)) = path.split_last() else {
        *value = new_value;
        return true;
    };

    let mut current = value;
    for segment in parents {
        match child_mut(current, segment) {
            Some(child) => current = child,
            None => return false,
        }
    }
    match child_mut(current, last) {
        Some(slot) => {
            *slot = new_value;
            true
        }
        None => false,
    }
}

fn child_mut<'a>(value: &'a mut YamlValue, segment: &str) -> Option<&'a mut YamlValue> {
    if !value.is_mapping() && !value.is_sequence() {
        *value = YamlValue::Mapping(Default::default());
    }
    match value {
        YamlValue::Mapping(map) => {
            let key = map
                .keys()
                .find(|key| key_label(key) == segment)
                .cloned()
                .unwrap_or_else(|| YamlValue::String(segment.to_string()));
            Some(map.entry(key).or_insert(YamlValue::Null))
        }
        YamlValue::Sequence(seq) => {
            let index = segment.parse::<usize>().ok()?;
            if index == seq.len() {
                seq.push(YamlValue::Null);
            }
            seq.get_mut(index)
        }
        _ => None,
    }
}

/// Remove the value at a concrete key path, returning it.
pub fn remove_key_path(value: &mut YamlValue, path: &[String]) -> Option<YamlValue> {
    let (last, parents) = path.split_last()?;
    let mut current = value;
    for segment in parents {
        current = match current {
            YamlValue::Mapping(map) => {
                let key = map.keys().find(|key| key_label(key) == *segment)?.clone();
                map.get_mut(&key)?
            }
            YamlValue::Sequence(seq) => seq.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        YamlValue::Mapping(map) => {
            let key = map.keys().find(|key| key_label(key) == *last)?.clone();
            map.shift_remove(&key)
        }
        YamlValue::Sequence(seq) => {
            let index = last.parse::<usize>().ok()?;
            (index < seq.len()).then(|| seq.remove(index))
        }
        _ => None,
    }
}

/// Copy every path matching `segments` from `source` into `target`. Paths
/// only present in `target` are removed from it.
fn copy_paths(target: &mut YamlValue, source: &YamlValue, segments: &[PathSegment]) {
    let copied = expand_key_path(source, segments);
    let mut removed: Vec<Vec<String>> = expand_key_path(target, segments)
        .into_iter()
        .filter(|path| !copied.contains(path))
        .collect();

    for path in &copied {
        if let Some(value) = read_key_path(source, path) {
            write_key_path(target, path, value.clone());
        }
    }

    // Highest sequence indices first, so earlier removals do not shift later ones.
    removed.sort_by(|a, b| compare_paths(b, a));
    for path in removed {
        remove_key_path(target, &path);
    }
}

fn compare_paths(a: &[String], b: &[String]) -> Ordering {
    for (left, right) in a.iter().zip(b) {
        let ordering = match (left.parse::<usize>(), right.parse::<usize>()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            _ => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Combine an incoming item with the active item according to a key-scoped
/// decision.
///
/// Ignored keys take the active value. When the decision only lists exempt
/// keys, the whole item follows the active value except those keys.
pub fn apply_key_ignores(
    incoming: &YamlValue,
    active: &YamlValue,
    decision: &IgnoreDecision,
) -> YamlValue {
    let (ignored, exempt) = decision.split_keys();

    let mut result = if ignored.is_empty() {
        active.clone()
    } else {
        let mut result = incoming.clone();
        for key in ignored {
            copy_paths(&mut result, active, &parse_key_path(key));
        }
        result
    };

    for key in exempt {
        copy_paths(&mut result, incoming, &parse_key_path(key));
    }
    result
}

/// Decide the value a synchronization should write for one item.
///
/// - not ignored: the incoming value;
/// - wholly ignored: the active value (`None` keeps an absent item absent);
/// - key-scoped: the incoming value with ignored keys taken from the active
///   item. An item deleted upstream stays deleted, and an item new to the
///   site is taken as is.
pub fn apply_ignore_decision(
    decision: &IgnoreDecision,
    incoming: Option<YamlValue>,
    active: Option<&YamlValue>,
) -> Option<YamlValue> {
    match decision {
        IgnoreDecision::NotIgnored => incoming,
        IgnoreDecision::Whole => active.cloned(),
        IgnoreDecision::Keys(_) => match (incoming, active) {
            (Some(incoming), Some(active)) => Some(apply_key_ignores(&incoming, active, decision)),
            (incoming, _) => incoming,
        },
    }
}
