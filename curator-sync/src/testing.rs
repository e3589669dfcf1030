//! In-memory release provider for unit tests.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use curator_core::{Asset, Origin, Release};

use crate::provider::ReleaseProvider;
use crate::SyncError;

#[derive(Default)]
pub(crate) struct FakeProvider {
    releases: HashMap<String, Vec<Release>>,
    calls: Cell<usize>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a release for the `<org>/<repo>` origin.
    pub(crate) fn with_release(self, repository: &str, tag: &str, names: &[&str]) -> Self {
        let origin = Origin::from_repository(repository).expect("valid repository");
        self.with_origin_release(&origin, tag, names)
    }

    pub(crate) fn with_origin_release(mut self, origin: &Origin, tag: &str, names: &[&str]) -> Self {
        let (org, repo) = origin.owner_and_name();
        let release = Release {
            org: org.to_owned(),
            repo: repo.to_owned(),
            tag_name: tag.to_owned(),
            assets: names
                .iter()
                .map(|n| Asset::new(*n, format!("mem://{org}/{repo}/{tag}/{n}")))
                .collect(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        self.releases.entry(origin.key()).or_default().push(release);
        self
    }

    /// Register origins that exist but have no releases.
    pub(crate) fn with_origins(mut self, origins: &[Origin]) -> Self {
        for origin in origins {
            self.releases.entry(origin.key()).or_default();
        }
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ReleaseProvider for FakeProvider {
    fn releases(&self, origin: &Origin) -> Result<Vec<Release>, SyncError> {
        self.calls.set(self.calls.get() + 1);
        self.releases
            .get(&origin.key())
            .cloned()
            .ok_or_else(|| SyncError::OriginNotFound {
                origin: origin.key(),
                path: PathBuf::new(),
            })
    }

    fn download(&self, asset: &Asset) -> Result<Vec<u8>, SyncError> {
        Ok(format!("body of {}\n", asset.url).into_bytes())
    }
}
