//! # Output Configuration
//!
//! This module provides utilities for controlling CLI output appearance,
//! including color and emoji support based on terminal capabilities and
//! user preferences.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use config_distro::output::{OutputConfig, emoji};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} Merging...", emoji(&config, "🔀", "[MERGE]"));
//! ```

use std::env;

use console::style;

use crate::ignore::IgnoreDecision;
use crate::merge::MergeOperation;
use crate::sync::ItemChange;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Item change label, colored by severity.
pub fn change_label(config: &OutputConfig, change: ItemChange) -> String {
    let label = format!("{:<9}", change.as_str());
    let styled = match change {
        ItemChange::Create => style(label).green(),
        ItemChange::Update => style(label).cyan(),
        ItemChange::Delete => style(label).red(),
        ItemChange::Keep => style(label).yellow(),
        ItemChange::Unchanged => style(label).dim(),
    };
    styled.force_styling(config.use_color).to_string()
}

/// Merge decision label, colored by kind.
pub fn operation_label(config: &OutputConfig, operation: MergeOperation) -> String {
    let styled = match operation {
        MergeOperation::Update => style(operation.as_str()).cyan(),
        MergeOperation::Ignore => style(operation.as_str()).yellow(),
        MergeOperation::Substitute => style(operation.as_str()).magenta(),
    };
    styled.force_styling(config.use_color).to_string()
}

/// Ignore decision rendered for listings.
pub fn decision_label(config: &OutputConfig, decision: &IgnoreDecision) -> String {
    let styled = match decision {
        IgnoreDecision::Whole => style(decision.to_string()).bold(),
        _ => style(decision.to_string()),
    };
    styled.force_styling(config.use_color).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_color_always() {
        let config = OutputConfig::from_env_and_flag("always");
        assert!(config.use_color);
    }

    #[test]
    fn test_color_never() {
        let config = OutputConfig::from_env_and_flag("NEVER");
        assert!(!config.use_color);
    }

    #[test]
    #[serial]
    fn test_no_color_env_disables_auto() {
        env::set_var("NO_COLOR", "1");
        let auto = OutputConfig::from_env_and_flag("auto");
        let forced = OutputConfig::from_env_and_flag("always");
        env::remove_var("NO_COLOR");

        assert!(!auto.use_color);
        assert!(forced.use_color);
    }

    #[test]
    #[serial]
    fn test_dumb_terminal_disables_auto() {
        let previous_term = env::var_os("TERM");
        env::remove_var("NO_COLOR");
        env::remove_var("CLICOLOR_FORCE");
        env::set_var("TERM", "dumb");
        let config = OutputConfig::from_env_and_flag("auto");
        match previous_term {
            Some(term) => env::set_var("TERM", term),
            None => env::remove_var("TERM"),
        }

        assert!(!config.use_color);
    }

    #[test]
    fn test_emoji_helper() {
        assert_eq!(emoji(&OutputConfig::with_color(), "🔀", "[MERGE]"), "🔀");
        assert_eq!(emoji(&OutputConfig::without_color(), "🔀", "[MERGE]"), "[MERGE]");
    }

    #[test]
    fn test_labels_without_color_are_plain() {
        let plain = OutputConfig::without_color();
        assert_eq!(change_label(&plain, ItemChange::Keep), "keep     ");
        assert_eq!(operation_label(&plain, MergeOperation::Substitute), "substitute");
        assert_eq!(
            decision_label(&plain, &IgnoreDecision::Keys(vec!["mail".to_string()])),
            "keys: mail"
        );
    }

    #[test]
    fn test_labels_with_color_carry_escapes() {
        let colored = OutputConfig::with_color();
        let label = change_label(&colored, ItemChange::Delete);
        assert!(label.contains("delete"));
        assert!(label.contains('\u{1b}'));
    }
}
