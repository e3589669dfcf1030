//! Bundle planning: select, resolve, filter and sort every package's releases.
//!
//! Planning performs no writes. [`crate::writer`] materializes a plan.

use chrono::{DateTime, Utc};
use serde::Serialize;

use curator_core::{
    process::process_release, select, Asset, Config, Package, Release, Source,
};

use crate::cache::ReleaseCache;
use crate::provider::ReleaseProvider;
use crate::SyncError;

/// Which packages a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanScope {
    /// Every configured package.
    All,
    /// A single named package.
    Package(String),
}

/// The filtered, ordered assets one source contributes to a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSection {
    pub origin: String,
    pub label: String,
    pub tag: String,
    pub assets: Vec<Asset>,
}

/// One retained primary release and everything bundled with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
    pub tag: String,
    pub created: DateTime<Utc>,
    pub sections: Vec<SourceSection>,
}

impl ReleasePlan {
    /// All assets in bundle order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.sections.iter().flat_map(|s| s.assets.iter())
    }
}

/// Everything a package bundles, newest release first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagePlan {
    pub package: String,
    pub alternatives: bool,
    pub releases: Vec<ReleasePlan>,
}

fn section(source: &Source, release: Release) -> SourceSection {
    SourceSection {
        origin: source.origin.key(),
        label: source.origin.label().to_owned(),
        tag: release.tag_name,
        assets: release.assets,
    }
}

fn window(
    cache: &mut ReleaseCache,
    provider: &dyn ReleaseProvider,
    source: &Source,
    last_n: usize,
) -> Result<Vec<Release>, SyncError> {
    let releases = cache.releases(provider, &source.origin)?;
    select::last_n(last_n, releases).map_err(|e| SyncError::Select {
        origin: source.origin.key(),
        source: e,
    })
}

/// Plan one package.
///
/// The primary source contributes the releases of its `last_n` newest minor
/// lines; a primary with no releases is an error. Each additional source
/// contributes its newest release, appended to every primary release's bundle.
/// Additional sources without any release are skipped.
pub fn plan_package(
    package: &Package,
    provider: &dyn ReleaseProvider,
    cache: &mut ReleaseCache,
    last_n: usize,
) -> Result<PackagePlan, SyncError> {
    let mut extras = Vec::with_capacity(package.additional.len());
    for source in &package.additional {
        if cache.releases(provider, &source.origin)?.is_empty() {
            tracing::warn!(
                "{}: additional source {} has no releases, skipping",
                package.name,
                source.origin
            );
            continue;
        }
        // A non-empty listing always keeps its newest release.
        let mut newest = window(cache, provider, source, 1)?.swap_remove(0);
        process_release(source, &mut newest)?;
        extras.push(section(source, newest));
    }

    let primary = window(cache, provider, &package.primary, last_n)?;
    tracing::info!(
        "{}: {} release(s) from {} selected",
        package.name,
        primary.len(),
        package.primary.origin
    );

    let releases = primary
        .into_iter()
        .map(|mut release| {
            process_release(&package.primary, &mut release)?;
            let tag = release.tag_name.clone();
            let created = release.created;
            let mut sections = vec![section(&package.primary, release)];
            sections.extend(extras.iter().cloned());
            Ok::<_, SyncError>(ReleasePlan {
                tag,
                created,
                sections,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PackagePlan {
        package: package.name.0.clone(),
        alternatives: package.alternatives,
        releases,
    })
}

/// Plan every package in `scope`, sharing one release cache across packages.
pub fn plan(
    config: &Config,
    scope: &PlanScope,
    provider: &dyn ReleaseProvider,
    last_n: usize,
) -> Result<Vec<PackagePlan>, SyncError> {
    let packages: Vec<&Package> = match scope {
        PlanScope::All => config.packages.iter().collect(),
        PlanScope::Package(name) => vec![config
            .package(name)
            .ok_or_else(|| SyncError::PackageNotFound { name: name.clone() })?],
    };

    let mut cache = ReleaseCache::new();
    let plans = packages
        .into_iter()
        .map(|package| plan_package(package, provider, &mut cache, last_n))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("planned {} package(s) from {} origin(s)", plans.len(), cache.len());
    Ok(plans)
}
