//! Error types for curator-sync.

use std::path::PathBuf;

use thiserror::Error;

use curator_core::{SelectError, VersionError};

/// All errors that can arise from fetching, planning and writing bundles.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Release-window selection failed for one origin.
    #[error("cannot select releases of {origin}: {source}")]
    Select {
        origin: String,
        #[source]
        source: SelectError,
    },

    /// A release tag could not be read as a version while resolving its filter.
    #[error("version error: {0}")]
    Version(#[from] VersionError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Release listing JSON could not be decoded.
    #[error("release JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An HTTP request failed or returned an error status.
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The mirror has no directory for this origin.
    #[error("no releases for {origin}: {path} does not exist")]
    OriginNotFound { origin: String, path: PathBuf },

    /// The provider cannot enumerate this kind of origin.
    #[error("{origin} is not supported by this release provider")]
    UnsupportedOrigin { origin: String },

    /// Asset URLs must be `file://`, `http://` or `https://`.
    #[error("unsupported asset URL '{url}'")]
    UnsupportedUrl { url: String },

    /// An asset name would escape its bundle directory.
    #[error("asset name '{name}' cannot be used as a file name")]
    InvalidAssetName { name: String },

    /// The requested package is not in the configuration.
    #[error("package '{name}' is not configured")]
    PackageNotFound { name: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Http`].
pub(crate) fn http_err(url: &str, err: impl std::fmt::Display) -> SyncError {
    SyncError::Http {
        url: url.to_owned(),
        message: err.to_string(),
    }
}
