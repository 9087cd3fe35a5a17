use dashmap::DashMap;
use log::trace;

use crate::model::{PackageName, Version};

use super::{FeedError, FeedService, PackageManifest};

/// Memoizes answers of an inner feed. Safe to share between planning runs on several threads.
///
/// Only successful lookups are kept, so a package published after a miss is seen next time.
pub struct CachingFeed<F> {
    inner: F,
    latest: DashMap<PackageName, Version>,
    manifests: DashMap<(PackageName, Version), PackageManifest>,
}

impl<F> CachingFeed<F> {
    pub fn new(inner: F) -> Self {
        CachingFeed {
            inner,
            latest: DashMap::new(),
            manifests: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F> FeedService for CachingFeed<F>
where
    F: FeedService,
{
    fn latest_version(&self, name: &PackageName) -> Result<Version, FeedError> {
        if let Some(version) = self.latest.get(name) {
            trace!("Latest version of {} served from cache", name);
            return Ok(*version);
        }
        let version = self.inner.latest_version(name)?;
        self.latest.insert(name.clone(), version);
        Ok(version)
    }

    fn manifest_for(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<PackageManifest, FeedError> {
        let key = (name.clone(), *version);
        if let Some(manifest) = self.manifests.get(&key) {
            trace!("Manifest of {} {} served from cache", name, version);
            return Ok(manifest.clone());
        }
        let manifest = self.inner.manifest_for(name, version)?;
        self.manifests.insert(key, manifest.clone());
        Ok(manifest)
    }
}
