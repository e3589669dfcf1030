//! Upstream origins and per-version filter overrides.
//!
//! A [`Source`] pairs an origin with a base [`AssetFilter`] and a set of
//! [`Overrides`]. Resolution order for a release tag: an override for the exact
//! canonical version, then an override for its `vX.Y` minor line, then the base
//! filter. Overrides are kept in two ordered maps keyed by canonical form, and
//! colliding keys are rejected on insert, so resolution never depends on map
//! iteration order.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{OverrideError, VersionError};
use crate::filter::AssetFilter;
use crate::version;

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Where a source's releases come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Releases of a hosted repository, `<org>/<repo>`.
    GitHub { org: String, repo: String },
    /// Release directories below an object-storage prefix.
    S3 { bucket: String, prefix: String },
}

impl Origin {
    /// Parse an `<org>/<repo>` identifier. Both parts must be non-empty and
    /// there must be exactly one separator.
    pub fn from_repository(identifier: &str) -> Option<Self> {
        let (org, repo) = identifier.split_once('/')?;
        if org.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::GitHub {
            org: org.to_owned(),
            repo: repo.to_owned(),
        })
    }

    /// Cache key identifying this origin within a run.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Short human label: the repository name, or the last prefix segment
    /// (the bucket when the prefix is empty).
    pub fn label(&self) -> &str {
        match self {
            Origin::GitHub { repo, .. } => repo.as_str(),
            Origin::S3 { bucket, prefix } => prefix
                .trim_end_matches('/')
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or(bucket.as_str()),
        }
    }

    /// `(org, repo)` recorded on releases from this origin.
    pub fn owner_and_name(&self) -> (&str, &str) {
        match self {
            Origin::GitHub { org, repo } => (org.as_str(), repo.as_str()),
            Origin::S3 { bucket, .. } => (bucket.as_str(), self.label()),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::GitHub { org, repo } => write!(f, "github:{org}/{repo}"),
            Origin::S3 { bucket, prefix } => {
                write!(f, "s3:{bucket}/{}", prefix.trim_matches('/'))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct OverrideEntry {
    /// Key as written in configuration, for error messages.
    key: String,
    filter: AssetFilter,
}

/// Version-scoped replacements for a source's base filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    exact: BTreeMap<String, OverrideEntry>,
    minor: BTreeMap<String, OverrideEntry>,
}

impl Overrides {
    /// Register `filter` under `key`.
    ///
    /// `vX.Y` keys apply to the whole minor line; `vX.Y.Z[-pre]` keys apply to
    /// that version only. A key that canonicalizes onto an existing entry is an
    /// error.
    pub fn insert(&mut self, key: &str, filter: AssetFilter) -> Result<(), OverrideError> {
        let parsed = version::parse(key).map_err(|source| OverrideError::InvalidKey {
            key: key.to_owned(),
            source,
        })?;

        let (slots, slot) = match version::precision(key) {
            3 => (&mut self.exact, format!("v{parsed}")),
            2 => (&mut self.minor, version::minor_line(&parsed)),
            _ => {
                return Err(OverrideError::TooBroad {
                    key: key.to_owned(),
                })
            }
        };

        if let Some(existing) = slots.get(&slot) {
            return Err(OverrideError::Duplicate {
                key: key.to_owned(),
                existing: existing.key.clone(),
            });
        }
        slots.insert(
            slot,
            OverrideEntry {
                key: key.to_owned(),
                filter,
            },
        );
        Ok(())
    }

    /// The most specific override for `version`, if any.
    pub fn lookup(&self, version: &str) -> Result<Option<&AssetFilter>, VersionError> {
        let parsed = version::parse(version)?;
        if let Some(entry) = self.exact.get(&format!("v{parsed}")) {
            return Ok(Some(&entry.filter));
        }
        Ok(self
            .minor
            .get(&version::minor_line(&parsed))
            .map(|entry| &entry.filter))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.minor.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.minor.len()
    }

    /// Configured keys, exact versions first, each group in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.exact
            .values()
            .chain(self.minor.values())
            .map(|entry| entry.key.as_str())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// One upstream origin plus its filtering policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub origin: Origin,
    pub filter: AssetFilter,
    pub overrides: Overrides,
}

impl Source {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            filter: AssetFilter::default(),
            overrides: Overrides::default(),
        }
    }

    /// The filter that applies to releases tagged `version`.
    pub fn resolve(&self, version: &str) -> Result<&AssetFilter, VersionError> {
        Ok(self.overrides.lookup(version)?.unwrap_or(&self.filter))
    }

    /// Output name of artifact `name` in release `version`, or `None` if rejected.
    pub fn accept(&self, version: &str, name: &str) -> Result<Option<String>, VersionError> {
        Ok(self.resolve(version)?.accept(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::compile_all;

    fn only(expr: &str) -> AssetFilter {
        AssetFilter {
            include: compile_all(&[expr]).unwrap(),
            ..AssetFilter::default()
        }
    }

    fn source() -> Source {
        Source::new(Origin::from_repository("acme/widget").unwrap())
    }

    #[test]
    fn repository_identifier_must_have_two_parts() {
        assert!(Origin::from_repository("acme/widget").is_some());
        for bad in ["acme", "/widget", "acme/", "a/b/c", ""] {
            assert!(Origin::from_repository(bad).is_none(), "accepted '{bad}'");
        }
    }

    #[test]
    fn origin_keys_and_labels() {
        let gh = Origin::from_repository("acme/widget").unwrap();
        assert_eq!(gh.key(), "github:acme/widget");
        assert_eq!(gh.label(), "widget");

        let s3 = Origin::S3 {
            bucket: "artifacts".into(),
            prefix: "charts/widget/".into(),
        };
        assert_eq!(s3.key(), "s3:artifacts/charts/widget");
        assert_eq!(s3.label(), "widget");

        let bare = Origin::S3 {
            bucket: "artifacts".into(),
            prefix: String::new(),
        };
        assert_eq!(bare.label(), "artifacts");
    }

    #[test]
    fn no_overrides_resolves_to_base() {
        let s = source();
        assert_eq!(s.resolve("v1.2.3").unwrap(), &s.filter);
    }

    #[test]
    fn minor_line_override_covers_all_patches() {
        let mut s = source();
        s.overrides.insert("v1.2", only("minor")).unwrap();
        assert_eq!(s.resolve("v1.2.0").unwrap(), &only("minor"));
        assert_eq!(s.resolve("1.2.9").unwrap(), &only("minor"));
        assert_eq!(s.resolve("v1.3.0").unwrap(), &s.filter);
    }

    #[test]
    fn exact_override_beats_minor_line() {
        let mut s = source();
        s.overrides.insert("v1.2.3", only("exact")).unwrap();
        s.overrides.insert("v1.2", only("minor")).unwrap();
        assert_eq!(s.resolve("v1.2.3").unwrap(), &only("exact"));
        assert_eq!(s.resolve("v1.2.3+build.1").unwrap(), &only("exact"));
        assert_eq!(s.resolve("v1.2.4").unwrap(), &only("minor"));
    }

    #[test]
    fn exact_key_with_zero_patch_is_not_a_minor_line() {
        let mut s = source();
        s.overrides.insert("v0.2.0", only("exact")).unwrap();
        s.overrides.insert("v0.2", only("minor")).unwrap();
        assert_eq!(s.resolve("v0.2.0").unwrap(), &only("exact"));
        assert_eq!(s.resolve("v0.2.1").unwrap(), &only("minor"));
    }

    #[test]
    fn colliding_keys_are_rejected() {
        let mut o = Overrides::default();
        o.insert("v1.2", only("a")).unwrap();
        let err = o.insert("1.2", only("b")).unwrap_err();
        assert_eq!(
            err,
            OverrideError::Duplicate {
                key: "1.2".into(),
                existing: "v1.2".into()
            }
        );

        o.insert("v1.2.3", only("a")).unwrap();
        assert!(matches!(
            o.insert("v1.2.3+meta", only("b")),
            Err(OverrideError::Duplicate { .. })
        ));
        assert_eq!(o.len(), 2);
    }

    #[test]
    fn major_only_and_garbage_keys_are_rejected() {
        let mut o = Overrides::default();
        assert!(matches!(
            o.insert("v1", only("a")),
            Err(OverrideError::TooBroad { .. })
        ));
        assert!(matches!(
            o.insert("main", only("a")),
            Err(OverrideError::InvalidKey { .. })
        ));
        assert!(o.is_empty());
    }

    #[test]
    fn accept_composes_resolution_and_filter() {
        let mut s = source();
        s.filter = only(r"\.yaml$");
        s.overrides.insert("v2.0", only(r"\.json$")).unwrap();
        assert_eq!(s.accept("v1.0.0", "a.yaml").unwrap().as_deref(), Some("a.yaml"));
        assert_eq!(s.accept("v2.0.1", "a.yaml").unwrap(), None);
        assert!(s.accept("bogus", "a.yaml").is_err());
    }
}
