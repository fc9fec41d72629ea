//! Default values for config-distro settings.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Settings file name looked up in the working directory.
pub const SETTINGS_FILE: &str = ".config-distro.yaml";

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "CONFIG_DISTRO_SETTINGS";

/// Returns the global settings file.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/config-distro/settings.yaml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/config-distro/settings.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\config-distro\settings.yaml`
///
/// Returns `None` if the platform configuration directory cannot be
/// determined.
pub fn global_settings_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("config-distro").join("settings.yaml"))
}

/// Resolve which settings file to load.
///
/// An explicit path (from `--settings` or `CONFIG_DISTRO_SETTINGS`) always
/// wins. Otherwise `.config-distro.yaml` in `working_dir` is used when
/// present, then the global settings file. `None` means built-in defaults.
pub fn settings_file(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = working_dir.join(SETTINGS_FILE);
    if local.is_file() {
        return Some(local);
    }

    global_settings_file().filter(|path| path.is_file())
}
