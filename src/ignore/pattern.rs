//! Ignore pattern parsing and matching
//!
//! A pattern has the shape `[~][collection|]name[:key.path]`:
//!
//! - a leading `~` negates the pattern;
//! - text before the first `|` scopes it to matching collections;
//! - text after the first `:` scopes it to nested keys of the item;
//! - `*` matches any run of characters in the collection and name.
//!
//! Patterns are compiled once and matched many times.

use std::fmt;

use log::warn;
use regex::Regex;

/// Matches a single string against a glob with `*` wildcards.
#[derive(Debug, Clone)]
pub enum GlobMatcher {
    /// Exact string equality.
    Literal(String),
    /// Anchored regular expression compiled from the glob.
    Glob(Regex),
}

impl GlobMatcher {
    /// Compile a glob. Globs that fail to compile degrade to literal
    /// equality.
    pub fn new(glob: &str) -> Self {
        if !glob.contains('*') {
            return GlobMatcher::Literal(glob.to_string());
        }
        match Regex::new(&glob_to_regex(glob)) {
            Ok(regex) => GlobMatcher::Glob(regex),
            Err(err) => {
                warn!("Treating pattern '{}' literally: {}", glob, err);
                GlobMatcher::Literal(glob.to_string())
            }
        }
    }

    /// Whether `candidate` matches.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            GlobMatcher::Literal(literal) => literal == candidate,
            GlobMatcher::Glob(regex) => regex.is_match(candidate),
        }
    }
}

/// Translate a `*` glob into an anchored regular expression.
pub fn glob_to_regex(glob: &str) -> String {
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("^{}$", body)
}

/// A compiled ignore pattern.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    negated: bool,
    collection: Option<GlobMatcher>,
    name: GlobMatcher,
    key: Option<String>,
}

impl IgnorePattern {
    /// Parse and compile a pattern. Parsing never fails; surrounding
    /// whitespace is trimmed.
    pub fn parse(pattern: &str) -> Self {
        let raw = pattern.trim().to_string();
        let (negated, rest) = match raw.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, raw.as_str()),
        };
        let (collection, rest) = match rest.split_once('|') {
            Some((collection, rest)) => (Some(GlobMatcher::new(collection)), rest),
            None => (None, rest),
        };
        let (name, key) = match rest.split_once(':') {
            Some((name, key)) if !key.is_empty() => (name, Some(key.to_string())),
            Some((name, _)) => (name, None),
            None => (rest, None),
        };
        let name = GlobMatcher::new(name);

        Self {
            raw,
            negated,
            collection,
            name,
            key,
        }
    }

    /// Parse a list of patterns, skipping blank entries.
    pub fn parse_all<I, S>(patterns: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .filter(|pattern| !pattern.as_ref().trim().is_empty())
            .map(|pattern| Self::parse(pattern.as_ref()))
            .collect()
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern carries a `~` prefix.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The key path the pattern is scoped to, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether the pattern names an explicit collection scope.
    pub fn is_collection_scoped(&self) -> bool {
        self.collection.is_some()
    }

    /// Whether the pattern applies to `collection`. Unscoped patterns apply
    /// to every collection.
    pub fn matches_collection(&self, collection: &str) -> bool {
        self.collection
            .as_ref()
            .is_none_or(|matcher| matcher.matches(collection))
    }

    /// Whether the pattern's name part matches `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.matches(name)
    }

    /// Whether the pattern applies to `name` in `collection`.
    pub fn matches(&self, collection: &str, name: &str) -> bool {
        self.matches_collection(collection) && self.matches_name(name)
    }
}

impl fmt::Display for IgnorePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
