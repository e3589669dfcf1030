//! Curator core library — release selection, artifact filtering and ordering.
//!
//! Public API surface:
//! - [`types`] — releases, assets, packages
//! - [`version`] — tag canonicalization and semantic-version comparison
//! - [`ordering`] — application order of artifacts
//! - [`filter`] — include/exclude/rename policy
//! - [`source`] — origins and per-version override resolution
//! - [`select`] — the last-N-minor-lines release window
//! - [`process`] — filter and sort one release
//! - [`config`] — YAML loading and validation
//! - [`error`] — [`VersionError`], [`SelectError`], [`OverrideError`], [`ConfigError`]
//!
//! Everything except [`config`] is pure and performs no I/O or logging.

pub mod config;
pub mod error;
pub mod filter;
pub mod ordering;
pub mod process;
pub mod select;
pub mod source;
pub mod types;
pub mod version;

pub use config::Config;
pub use error::{ConfigError, OverrideError, SelectError, VersionError};
pub use filter::{AssetFilter, Pattern};
pub use source::{Origin, Overrides, Source};
pub use types::{Asset, Package, PackageName, Release};
