//! Resolving ignore patterns into decisions
//!
//! Every pattern that applies to a `(collection, name)` pair contributes to
//! the decision for that item:
//!
//! 1. a negated pattern without a key scope exempts the item entirely;
//! 2. a positive pattern without a key scope ignores the whole item, except
//!    for keys exempted by negated key patterns;
//! 3. key-scoped patterns accumulate into a key list, with negated keys
//!    listed first under a `~` prefix.
//!
//! [`ConfigIgnoreConfig`] selects the pattern list that applies to a
//! synchronization direction and operation, according to its mode.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize, Serializer};

use super::pattern::IgnorePattern;
use crate::config::{IgnoreMode, IgnoreSettings, PatternList};
use crate::error::{Error, Result};

/// Direction of a synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Upstream configuration flowing into the site.
    Import,
    /// Site configuration written out to a sync directory.
    Export,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Import, Direction::Export];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Import => "import",
            Direction::Export => "export",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "import" => Ok(Direction::Import),
            "export" => Ok(Direction::Export),
            other => Err(format!("unknown direction '{}' (expected import or export)", other)),
        }
    }
}

/// What a synchronization does to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub const ALL: [SyncOperation; 3] = [
        SyncOperation::Create,
        SyncOperation::Update,
        SyncOperation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncOperation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(SyncOperation::Create),
            "update" => Ok(SyncOperation::Update),
            "delete" => Ok(SyncOperation::Delete),
            other => Err(format!(
                "unknown operation '{}' (expected create, update or delete)",
                other
            )),
        }
    }
}

/// Whether, and how much of, an item is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreDecision {
    /// The item is synchronized normally.
    NotIgnored,
    /// The whole item is left alone.
    Whole,
    /// Only the listed key paths are left alone. Entries prefixed with `~`
    /// are exempt; a list of exemptions only means "everything but these".
    Keys(Vec<String>),
}

impl IgnoreDecision {
    /// Whether anything of the item is ignored.
    pub fn is_ignored(&self) -> bool {
        !matches!(self, IgnoreDecision::NotIgnored)
    }

    /// Split a key list into ignored keys and exempt keys (without `~`).
    pub fn split_keys(&self) -> (Vec<&str>, Vec<&str>) {
        let mut ignored = Vec::new();
        let mut exempt = Vec::new();
        if let IgnoreDecision::Keys(keys) = self {
            for key in keys {
                match key.strip_prefix('~') {
                    Some(key) => exempt.push(key),
                    None => ignored.push(key.as_str()),
                }
            }
        }
        (ignored, exempt)
    }
}

impl fmt::Display for IgnoreDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreDecision::NotIgnored => f.write_str("not ignored"),
            IgnoreDecision::Whole => f.write_str("ignored"),
            IgnoreDecision::Keys(keys) => write!(f, "keys: {}", keys.join(", ")),
        }
    }
}

// Serialized as `false`, `true` or the key list.
impl Serialize for IgnoreDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            IgnoreDecision::NotIgnored => serializer.serialize_bool(false),
            IgnoreDecision::Whole => serializer.serialize_bool(true),
            IgnoreDecision::Keys(keys) => keys.serialize(serializer),
        }
    }
}

/// Accumulate every pattern applying to `name` in `collection` into a
/// decision.
pub fn resolve<'a, I>(patterns: I, collection: &str, name: &str) -> IgnoreDecision
where
    I: IntoIterator<Item = &'a IgnorePattern>,
{
    let mut whole = false;
    let mut keys = BTreeSet::new();
    let mut exempt = BTreeSet::new();

    for pattern in patterns {
        if !pattern.matches(collection, name) {
            continue;
        }
        match (pattern.is_negated(), pattern.key()) {
            (true, None) => {
                debug!("'{}' exempted by '{}'", name, pattern);
                return IgnoreDecision::NotIgnored;
            }
            (true, Some(key)) => {
                exempt.insert(key);
            }
            (false, None) => whole = true,
            (false, Some(key)) => {
                keys.insert(key);
            }
        }
    }

    let mut listed: Vec<String> = exempt.iter().map(|key| format!("~{}", key)).collect();
    if whole {
        return if listed.is_empty() {
            IgnoreDecision::Whole
        } else {
            IgnoreDecision::Keys(listed)
        };
    }

    keys.retain(|key| !exempt.contains(key));
    if keys.is_empty() {
        return IgnoreDecision::NotIgnored;
    }
    listed.extend(keys.into_iter().map(str::to_string));
    IgnoreDecision::Keys(listed)
}

/// Ignore patterns organised by synchronization direction and operation.
#[derive(Debug, Clone, Default)]
pub struct ConfigIgnoreConfig {
    mode: IgnoreMode,
    lists: BTreeMap<(Direction, SyncOperation), Vec<IgnorePattern>>,
}

impl ConfigIgnoreConfig {
    /// One pattern list for every direction and operation.
    pub fn simple<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = IgnorePattern::parse_all(patterns);
        let mut config = Self {
            mode: IgnoreMode::Simple,
            lists: BTreeMap::new(),
        };
        for direction in Direction::ALL {
            config.fill_direction(direction, &patterns);
        }
        config
    }

    /// Separate pattern lists for import and export.
    pub fn intermediate<I, E, S, T>(import: I, export: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut config = Self {
            mode: IgnoreMode::Intermediate,
            lists: BTreeMap::new(),
        };
        config.fill_direction(Direction::Import, &IgnorePattern::parse_all(import));
        config.fill_direction(Direction::Export, &IgnorePattern::parse_all(export));
        config
    }

    /// An empty configuration with per-operation lists, filled with
    /// [`ConfigIgnoreConfig::with_patterns`].
    pub fn advanced() -> Self {
        Self {
            mode: IgnoreMode::Advanced,
            lists: BTreeMap::new(),
        }
    }

    /// Set the pattern list for one direction and operation.
    pub fn with_patterns<I, S>(mut self, direction: Direction, operation: SyncOperation, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lists
            .insert((direction, operation), IgnorePattern::parse_all(patterns));
        self
    }

    /// Build from the `ignore` section of the settings file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigParse` when intermediate mode is given
    /// per-operation lists.
    pub fn from_settings(settings: &IgnoreSettings) -> Result<Self> {
        match settings.mode {
            IgnoreMode::Simple => Ok(Self::simple(&settings.patterns)),
            IgnoreMode::Intermediate => {
                let import = flat_list(&settings.import, Direction::Import)?;
                let export = flat_list(&settings.export, Direction::Export)?;
                Ok(Self::intermediate(import, export))
            }
            IgnoreMode::Advanced => {
                let mut config = Self::advanced();
                for (direction, list) in [
                    (Direction::Import, &settings.import),
                    (Direction::Export, &settings.export),
                ] {
                    for operation in SyncOperation::ALL {
                        config = config.with_patterns(direction, operation, list.for_operation(operation));
                    }
                }
                Ok(config)
            }
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> IgnoreMode {
        self.mode
    }

    /// The patterns that apply to a direction and operation.
    pub fn patterns(&self, direction: Direction, operation: SyncOperation) -> &[IgnorePattern] {
        self.lists
            .get(&(direction, operation))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Decide whether `name` in `collection` is ignored for a direction and
    /// operation.
    pub fn is_ignored(
        &self,
        collection: &str,
        name: &str,
        direction: Direction,
        operation: SyncOperation,
    ) -> IgnoreDecision {
        resolve(self.patterns(direction, operation), collection, name)
    }

    /// Every ignored name among `names`, with its decision.
    pub fn get_ignored_configs<I, S>(
        &self,
        collection: &str,
        names: I,
        direction: Direction,
        operation: SyncOperation,
    ) -> BTreeMap<String, IgnoreDecision>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let decision = self.is_ignored(collection, name, direction, operation);
                decision
                    .is_ignored()
                    .then(|| (name.to_string(), decision))
            })
            .collect()
    }

    fn fill_direction(&mut self, direction: Direction, patterns: &[IgnorePattern]) {
        for operation in SyncOperation::ALL {
            self.lists.insert((direction, operation), patterns.to_vec());
        }
    }
}

fn flat_list(list: &PatternList, direction: Direction) -> Result<&[String]> {
    match list {
        PatternList::List(patterns) => Ok(patterns.as_slice()),
        PatternList::PerOperation(_) => Err(Error::ConfigParse {
            message: format!(
                "ignore.{} lists patterns per operation in intermediate mode",
                direction
            ),
            hint: Some("Set 'mode: advanced' or give a plain list of patterns".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(patterns: &[&str], collection: &str, name: &str) -> IgnoreDecision {
        let patterns = IgnorePattern::parse_all(patterns);
        resolve(&patterns, collection, name)
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_collection_wildcard() {
            assert_eq!(decision(&["d*|*"], "dddd", "other"), IgnoreDecision::Whole);
            assert_eq!(
                decision(&["a", "b|c"], "b", "other"),
                IgnoreDecision::NotIgnored
            );
        }

        #[test]
        fn test_key_scoped_accumulation() {
            let result = decision(
                &[
                    "foo.baz.qux:path.to.key",
                    "foo.baz.qux:a.second.*.key",
                    "~foo.baz.qux:not.a.*.key",
                ],
                "",
                "foo.baz.qux",
            );
            assert_eq!(
                result,
                IgnoreDecision::Keys(vec![
                    "~not.a.*.key".to_string(),
                    "a.second.*.key".to_string(),
                    "path.to.key".to_string(),
                ])
            );
        }

        #[test]
        fn test_name_negation_wins() {
            assert_eq!(
                decision(&["foo.*", "~foo.bar"], "", "foo.bar"),
                IgnoreDecision::NotIgnored
            );
            assert_eq!(
                decision(&["~foo.bar", "foo.bar:some.key"], "", "foo.bar"),
                IgnoreDecision::NotIgnored
            );
        }

        #[test]
        fn test_whole_with_exempt_keys() {
            assert_eq!(
                decision(&["foo.bar", "~foo.bar:keep.me"], "", "foo.bar"),
                IgnoreDecision::Keys(vec!["~keep.me".to_string()])
            );
        }

        #[test]
        fn test_negated_key_cancels_equal_key() {
            assert_eq!(
                decision(&["foo.bar:a", "~foo.bar:a"], "", "foo.bar"),
                IgnoreDecision::NotIgnored
            );
        }

        #[test]
        fn test_only_exemptions_ignore_nothing() {
            assert_eq!(
                decision(&["~foo.bar:a"], "", "foo.bar"),
                IgnoreDecision::NotIgnored
            );
        }

        #[test]
        fn test_duplicate_keys_collapse() {
            assert_eq!(
                decision(&["foo:a", "f*:a"], "", "foo"),
                IgnoreDecision::Keys(vec!["a".to_string()])
            );
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_simple_mode_applies_everywhere() {
            let config = ConfigIgnoreConfig::simple(["system.site"]);
            for direction in Direction::ALL {
                for operation in SyncOperation::ALL {
                    assert!(config
                        .is_ignored("", "system.site", direction, operation)
                        .is_ignored());
                }
            }
        }

        #[test]
        fn test_intermediate_mode_splits_directions() {
            let config = ConfigIgnoreConfig::intermediate(["system.site"], ["system.mail"]);
            assert_eq!(config.mode(), IgnoreMode::Intermediate);
            assert!(config
                .is_ignored("", "system.site", Direction::Import, SyncOperation::Update)
                .is_ignored());
            assert!(!config
                .is_ignored("", "system.site", Direction::Export, SyncOperation::Update)
                .is_ignored());
            assert!(config
                .is_ignored("", "system.mail", Direction::Export, SyncOperation::Delete)
                .is_ignored());
        }

        #[test]
        fn test_advanced_mode_per_operation() {
            let config = ConfigIgnoreConfig::advanced().with_patterns(
                Direction::Import,
                SyncOperation::Delete,
                ["webform.webform.*"],
            );
            assert!(config
                .is_ignored("", "webform.webform.contact", Direction::Import, SyncOperation::Delete)
                .is_ignored());
            assert!(!config
                .is_ignored("", "webform.webform.contact", Direction::Import, SyncOperation::Update)
                .is_ignored());
            assert!(config
                .patterns(Direction::Export, SyncOperation::Create)
                .is_empty());
        }

        #[test]
        fn test_get_ignored_configs_skips_not_ignored() {
            let config = ConfigIgnoreConfig::simple(["a.*", "~a.keep", "b:key"]);
            let ignored = config.get_ignored_configs(
                "",
                ["a.one", "a.keep", "b", "c"],
                Direction::Import,
                SyncOperation::Update,
            );
            assert_eq!(ignored.len(), 2);
            assert_eq!(ignored["a.one"], IgnoreDecision::Whole);
            assert_eq!(ignored["b"], IgnoreDecision::Keys(vec!["key".to_string()]));
        }
    }

    #[test]
    fn test_decision_serialization() {
        assert_eq!(serde_json::to_string(&IgnoreDecision::Whole).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&IgnoreDecision::NotIgnored).unwrap(),
            "false"
        );
        assert_eq!(
            serde_json::to_string(&IgnoreDecision::Keys(vec!["~a".to_string(), "b".to_string()]))
                .unwrap(),
            r#"["~a","b"]"#
        );
    }

    #[test]
    fn test_split_keys() {
        let decision = IgnoreDecision::Keys(vec!["~x".to_string(), "y".to_string()]);
        let (ignored, exempt) = decision.split_keys();
        assert_eq!(ignored, vec!["y"]);
        assert_eq!(exempt, vec!["x"]);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("Import".parse::<Direction>(), Ok(Direction::Import));
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!("delete".parse::<SyncOperation>(), Ok(SyncOperation::Delete));
    }
}
