//! Ignore patterns for configuration synchronization
//!
//! Sites often need to keep some configuration out of a synchronization:
//! settings that are edited live, or keys holding environment-specific
//! values. This module decides which configuration items (or which keys of
//! them) a synchronization must leave alone.
//!
//! ## Submodules
//!
//! - `pattern` - parsing and compiling `[~][collection|]name[:key.path]`
//! - `resolver` - accumulating pattern matches into an [`IgnoreDecision`],
//!   and the mode-aware [`ConfigIgnoreConfig`]
//! - `keys` - applying key-scoped decisions to item values

pub mod keys;
pub mod pattern;
pub mod resolver;

pub use keys::apply_ignore_decision;
pub use pattern::IgnorePattern;
pub use resolver::{resolve, ConfigIgnoreConfig, Direction, IgnoreDecision, SyncOperation};
