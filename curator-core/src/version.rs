//! Semantic-version helpers for release tags.
//!
//! Tags are accepted with or without a leading `v`. The `vX` and `vX.Y`
//! shorthands expand to `vX.0.0` and `vX.Y.0`; shorthands may not carry a
//! pre-release or build suffix. Build metadata is stripped and never takes part
//! in comparisons.

use std::cmp::Ordering;

use semver::{BuildMetadata, Version};

use crate::error::VersionError;

/// Parse a release tag into a [`Version`] with build metadata removed.
pub fn parse(tag: &str) -> Result<Version, VersionError> {
    let invalid = |reason: &str| VersionError::Invalid {
        input: tag.to_owned(),
        reason: reason.to_owned(),
    };

    let body = tag.strip_prefix('v').unwrap_or(tag);
    let (without_build, build) = match body.split_once('+') {
        Some((head, build)) => (head, Some(build)),
        None => (body, None),
    };
    let (core, pre) = match without_build.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (without_build, None),
    };

    let expanded = match core.split('.').count() {
        3 => core.to_owned(),
        n @ (1 | 2) => {
            if pre.is_some() || build.is_some() {
                return Err(invalid("shorthand versions cannot carry a suffix"));
            }
            if n == 1 {
                format!("{core}.0.0")
            } else {
                format!("{core}.0")
            }
        }
        _ => return Err(invalid("expected at most three numeric components")),
    };

    let text = match pre {
        Some(pre) => format!("{expanded}-{pre}"),
        None => expanded,
    };
    let mut version = Version::parse(&text).map_err(|e| invalid(&e.to_string()))?;
    version.build = BuildMetadata::EMPTY;
    Ok(version)
}

/// Number of numeric components written in `tag` (`v1.2` has two).
pub fn precision(tag: &str) -> usize {
    let body = tag.strip_prefix('v').unwrap_or(tag);
    let core = body
        .split(['-', '+'])
        .next()
        .unwrap_or(body);
    core.split('.').count()
}

/// `v`-prefixed canonical form: `1.2` becomes `v1.2.0`, `v1.2.3+meta` becomes `v1.2.3`.
pub fn canonical(tag: &str) -> Result<String, VersionError> {
    parse(tag).map(|v| format!("v{v}"))
}

/// The `vX.Y` minor line of a tag.
pub fn major_minor(tag: &str) -> Result<String, VersionError> {
    parse(tag).map(|v| minor_line(&v))
}

/// The `vX.Y` minor line of an already-parsed version.
pub fn minor_line(version: &Version) -> String {
    format!("v{}.{}", version.major, version.minor)
}

/// Semantic-version precedence of two tags.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(parse(a)?.cmp(&parse(b)?))
}
