//! Error types for curator-core.

use std::path::PathBuf;

use thiserror::Error;

/// A release tag or override key that is not a semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// Errors from release-window selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// There is no newest release to anchor the first minor line on.
    #[error("cannot select releases from an empty release list")]
    EmptyInput,

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Errors from registering a version override on a source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    #[error("override key '{key}' is not a version: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: VersionError,
    },

    /// The key names the major version only; overrides apply to a minor line or an exact version.
    #[error("override key '{key}' must name a minor line (vX.Y) or an exact version (vX.Y.Z)")]
    TooBroad { key: String },

    /// Two keys canonicalize to the same override slot.
    #[error("override key '{key}' collides with '{existing}'")]
    Duplicate { key: String, existing: String },
}

/// All errors that can arise from loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error for configuration parsed from an in-memory string.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path and serde_yaml's line context.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration file did not exist at the expected path.
    #[error("configuration not found at {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`, so the default location is unknown.
    #[error("cannot determine home directory; set $HOME or pass an explicit config path")]
    HomeNotFound,

    #[error("package '{package}', {scope}: invalid pattern '{pattern}': {error}")]
    InvalidPattern {
        package: String,
        scope: String,
        pattern: String,
        #[source]
        error: regex::Error,
    },

    #[error("package '{package}', {scope}: source identifier '{identifier}' is not of the form <org>/<repo>")]
    InvalidSourceIdentifier {
        package: String,
        scope: String,
        identifier: String,
    },

    #[error("package '{package}', {scope}: a source must name either `github` or `s3`, not both")]
    AmbiguousOrigin { package: String, scope: String },

    #[error("package '{package}', {scope}: a source must name one of `github` or `s3`")]
    MissingOrigin { package: String, scope: String },

    #[error("package '{package}', {scope}: {source}")]
    Override {
        package: String,
        scope: String,
        #[source]
        source: OverrideError,
    },
}
