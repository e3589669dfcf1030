//! Domain types for releases, their artifacts and the packages built from them.
//!
//! [`Asset`] and [`Release`] are produced by release providers and are
//! serializable so plans can be emitted as JSON. [`Package`] is built from
//! validated configuration only.

use std::fmt;

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::VersionError;
use crate::ordering;
use crate::source::Source;
use crate::version;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed package name (the configuration key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageName(pub String);

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Releases
// ---------------------------------------------------------------------------

/// One downloadable artifact of a release. `url` is opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub url: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Whether this asset must be applied before `other`.
    pub fn less(&self, other: &Asset) -> bool {
        ordering::less(self, other)
    }
}

/// One tagged release of one repository or bucket prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub org: String,
    pub repo: String,
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    pub created: DateTime<Utc>,
}

impl Release {
    /// The tag parsed as a semantic version.
    pub fn version(&self) -> Result<Version, VersionError> {
        version::parse(&self.tag_name)
    }

    /// The `vX.Y` minor line this release belongs to.
    pub fn minor_line(&self) -> Result<String, VersionError> {
        version::major_minor(&self.tag_name)
    }

    /// Whether this release precedes `other` in semantic-version order.
    pub fn less(&self, other: &Release) -> Result<bool, VersionError> {
        Ok(self.version()? < other.version()?)
    }
}

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

/// A deliverable composed from one primary release stream and any number of
/// secondary streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: PackageName,
    /// Additional sources are alternatives to each other rather than parts of
    /// one sequence; the bundle writer keeps each in its own directory.
    pub alternatives: bool,
    pub primary: Source,
    pub additional: Vec<Source>,
}

impl Package {
    /// Primary source first, then additional sources in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        std::iter::once(&self.primary).chain(self.additional.iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str) -> Release {
        Release {
            org: "acme".into(),
            repo: "widget".into(),
            tag_name: tag.into(),
            assets: vec![],
            created: Utc::now(),
        }
    }

    #[test]
    fn newtype_display() {
        assert_eq!(PackageName::from("cilium").to_string(), "cilium");
    }

    #[test]
    fn release_less_uses_semver() {
        assert!(release("v0.9.0").less(&release("v0.10.0")).unwrap());
        assert!(!release("v0.10.0").less(&release("v0.9.0")).unwrap());
        assert!(!release("v1.0.0").less(&release("1.0.0")).unwrap());
    }

    #[test]
    fn release_less_rejects_bad_tags() {
        assert!(release("nightly").less(&release("v1.0.0")).is_err());
    }

    #[test]
    fn minor_line_of_release() {
        assert_eq!(release("v1.4.7").minor_line().unwrap(), "v1.4");
    }

    #[test]
    fn release_serde_roundtrip() {
        let mut r = release("v1.0.0");
        r.assets.push(Asset::new("a.yaml", "https://example.com/a.yaml"));
        let yaml = serde_yaml::to_string(&r).expect("serialize");
        let back: Release = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, r);
    }
}
