//! Per-run memo of release listings, keyed by origin.
//!
//! A source may be one package's primary and another's additional source;
//! the cache makes sure each origin is enumerated once per run.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use curator_core::{Origin, Release};

use crate::provider::ReleaseProvider;
use crate::SyncError;

#[derive(Debug, Default)]
pub struct ReleaseCache {
    entries: HashMap<String, Vec<Release>>,
}

impl ReleaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases of `origin`, asking `provider` only on the first request.
    pub fn releases(
        &mut self,
        provider: &dyn ReleaseProvider,
        origin: &Origin,
    ) -> Result<&[Release], SyncError> {
        match self.entries.entry(origin.key()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let fetched = provider.releases(origin)?;
                tracing::info!("{origin}: fetched {} release(s)", fetched.len());
                Ok(entry.insert(fetched).as_slice())
            }
        }
    }

    /// Number of distinct origins fetched so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;

    #[test]
    fn each_origin_is_fetched_once() {
        let provider = FakeProvider::new().with_release("acme/widget", "v1.0.0", &["a.yaml"]);
        let origin = Origin::from_repository("acme/widget").unwrap();
        let mut cache = ReleaseCache::new();

        assert_eq!(cache.releases(&provider, &origin).unwrap().len(), 1);
        assert_eq!(cache.releases(&provider, &origin).unwrap().len(), 1);
        assert_eq!(provider.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let provider = FakeProvider::new();
        let origin = Origin::from_repository("acme/missing").unwrap();
        let mut cache = ReleaseCache::new();

        assert!(cache.releases(&provider, &origin).is_err());
        assert!(cache.releases(&provider, &origin).is_err());
        assert_eq!(provider.calls(), 2);
        assert!(cache.is_empty());
    }
}
