//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use config_distro::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Settings file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::settings_not_found(path));
//! ```

use std::path::Path;

/// Generate an error for when an explicitly given settings file is missing.
pub fn settings_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Settings file not found: {path}\n\n\
         hint: Create a .config-distro.yaml file in the working directory\n\
         hint: Use --settings to specify a different path\n\
         hint: Set the CONFIG_DISTRO_SETTINGS environment variable",
        path = path.display()
    )
}

/// Generate an error for a storage directory that does not exist.
///
/// `role` names the storage on the command line (`previous`, `active`...).
pub fn storage_dir_not_found(role: &str, path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "The {role} storage directory does not exist: {path}\n\n\
         hint: Point --{role} at a directory of exported *.yml config items\n\
         hint: Export the configuration first if the directory is missing",
        path = path.display()
    )
}

/// Generate an error for a collection absent from a storage.
///
/// Suggests the closest existing collection when one is similar.
pub fn unknown_collection(collection: &str, available: &[String]) -> anyhow::Error {
    let candidates: Vec<&str> = available
        .iter()
        .map(|name| if name.is_empty() { "default" } else { name.as_str() })
        .collect();

    let did_you_mean = find_similar(collection, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown collection: {collection}{did_you_mean}\n\n\
         Available collections are: {list}\n\
         hint: Use 'default' for the default collection",
        list = candidates.join(", ")
    )
}

/// Generate an error for a file that cannot be hashed.
pub fn hash_input_invalid(path: &Path, error: &dyn std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!(
        "Cannot hash config item {path}\n\
         error: {error}\n\n\
         hint: The file must be a YAML config item, as found in an export directory",
        path = path.display()
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous_row: Vec<usize> = (0..=b_len).collect();
    let mut row = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        row[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            row[j] = (previous_row[j] + 1)
                .min(row[j - 1] + 1)
                .min(previous_row[j - 1] + cost);
        }
        std::mem::swap(&mut previous_row, &mut row);
    }

    previous_row[b_len]
}
