//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_item("active", "system.site", "name: Site");
//!     fixture.command().arg("ignored").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::settings;
    pub use super::TestFixture;
}

/// Common settings snippets for testing.
#[allow(dead_code)]
pub mod settings {
    /// Simple mode ignoring one item and one key.
    pub const SIMPLE: &str = r#"
ignore:
  patterns:
    - system.site:mail
    - "webform.*"
"#;

    /// Intermediate mode with different import and export lists.
    pub const INTERMEDIATE: &str = r#"
ignore:
  mode: intermediate
  import: [system.site]
  export: ["views.view.*"]
"#;

    /// Distro filter keeping the site name and French views.
    pub const DISTRO: &str = r#"
distro:
  all_collections: ["system.site:name"]
  collections:
    language.fr: ["views.view.*"]
"#;

    /// Invalid settings for error testing.
    pub const UNKNOWN_MODE: &str = "ignore:\n  mode: expert\n";
}

/// A test fixture that provides a temporary directory holding storage
/// directories and an optional settings file.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_settings(settings::SIMPLE)
///     .with_item("active", "system.site", "name: Site");
///
/// fixture.command().arg("ignored").arg("--source").arg(fixture.dir("active"));
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.config-distro.yaml` settings file with the given content.
    #[allow(dead_code)]
    pub fn with_settings(self, content: &str) -> Self {
        self.temp_dir
            .child(".config-distro.yaml")
            .write_str(content)
            .expect("Failed to write settings file");
        self
    }

    /// Add a config item to the default collection of storage `storage`.
    pub fn with_item(self, storage: &str, name: &str, content: &str) -> Self {
        self.with_file(&format!("{}/{}.yml", storage, name), content)
    }

    /// Add a config item to a named collection of storage `storage`.
    #[allow(dead_code)]
    pub fn with_collection_item(self, storage: &str, collection: &str, name: &str, content: &str) -> Self {
        let dir = collection.replace('.', "/");
        self.with_file(&format!("{}/{}/{}.yml", storage, dir, name), content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create an empty storage directory.
    #[allow(dead_code)]
    pub fn with_empty_storage(self, storage: &str) -> Self {
        self.temp_dir
            .child(storage)
            .create_dir_all()
            .expect("Failed to create storage directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a directory inside the fixture.
    pub fn dir(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Read a config item written by a command.
    #[allow(dead_code)]
    pub fn read_item(&self, storage: &str, name: &str) -> serde_yaml::Value {
        let path = self.dir(storage).join(format!("{}.yml", name));
        let content = std::fs::read_to_string(&path).expect("Failed to read item");
        serde_yaml::from_str(&content).expect("Item is not valid YAML")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory,
    /// isolated from settings in the environment and user directories.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("config-distro");
        cmd.current_dir(self.path())
            .env_remove("CONFIG_DISTRO_SETTINGS")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.path().join(".xdg"))
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
