use std::collections::BTreeMap;

use log::trace;

use crate::model::{PackageName, Version};

use super::{FeedError, FeedService, PackageManifest};

pub const FUBU: &str = "fubu";
pub const NUGET_V2: &str = "nuget-v2";

/// A single feed held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFeed {
    name: String,
    packages: BTreeMap<PackageName, BTreeMap<Version, PackageManifest>>,
}

impl MemoryFeed {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryFeed {
            name: name.into(),
            packages: BTreeMap::new(),
        }
    }

    pub fn fubu() -> Self {
        MemoryFeed::new(FUBU)
    }

    pub fn nuget_v2() -> Self {
        MemoryFeed::new(NUGET_V2)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publishes `name` at `version` with no declared dependencies.
    pub fn add(mut self, name: impl Into<PackageName>, version: Version) -> Self {
        let name = name.into();
        self.entry(&name, version);
        self
    }

    /// Publishes `name` at `version` and lets `configure` declare its dependencies.
    pub fn configure_package<F>(
        mut self,
        name: impl Into<PackageName>,
        version: Version,
        configure: F,
    ) -> Self
    where
        F: FnOnce(&mut PackageManifest),
    {
        let name = name.into();
        configure(self.entry(&name, version));
        self
    }

    pub fn insert(&mut self, manifest: PackageManifest) {
        self.packages
            .entry(manifest.name.clone())
            .or_default()
            .insert(manifest.version, manifest);
    }

    fn entry(&mut self, name: &PackageName, version: Version) -> &mut PackageManifest {
        self.packages
            .entry(name.clone())
            .or_default()
            .entry(version)
            .or_insert_with(|| PackageManifest::new(name.clone(), version))
    }
}

impl FeedService for MemoryFeed {
    fn latest_version(&self, name: &PackageName) -> Result<Version, FeedError> {
        self.packages
            .get(name)
            .and_then(|versions| versions.keys().next_back().copied())
            .ok_or_else(|| FeedError::PackageNotFound { name: name.clone() })
    }

    fn manifest_for(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<PackageManifest, FeedError> {
        let versions = self
            .packages
            .get(name)
            .ok_or_else(|| FeedError::PackageNotFound { name: name.clone() })?;
        versions
            .get(version)
            .cloned()
            .ok_or_else(|| FeedError::VersionNotFound {
                name: name.clone(),
                version: *version,
            })
    }
}

/// The ordered feeds of a solution, queried as one.
#[derive(Default)]
pub struct FeedSet {
    feeds: Vec<(String, Box<dyn FeedService + Send + Sync>)>,
}

impl FeedSet {
    pub fn new() -> Self {
        FeedSet::default()
    }

    pub fn with_feed(mut self, feed: MemoryFeed) -> Self {
        self.add_feed(feed);
        self
    }

    pub fn add_feed(&mut self, feed: MemoryFeed) {
        let name = feed.name().to_string();
        self.add_service(name, feed);
    }

    pub fn add_service<F>(&mut self, name: impl Into<String>, feed: F)
    where
        F: FeedService + Send + Sync + 'static,
    {
        self.feeds.push((name.into(), Box::new(feed)));
    }

    pub fn feed_names(&self) -> Vec<&str> {
        self.feeds.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

impl FeedService for FeedSet {
    fn latest_version(&self, name: &PackageName) -> Result<Version, FeedError> {
        let mut latest: Option<Version> = None;
        for (feed_name, feed) in &self.feeds {
            match feed.latest_version(name) {
                Ok(version) => {
                    trace!("Feed {} offers {} {}", feed_name, name, version);
                    latest = latest.max(Some(version));
                }
                Err(FeedError::PackageNotFound { .. }) => {}
                Err(other) => return Err(other),
            }
        }
        latest.ok_or_else(|| FeedError::PackageNotFound { name: name.clone() })
    }

    fn manifest_for(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<PackageManifest, FeedError> {
        let mut known = false;
        for (feed_name, feed) in &self.feeds {
            match feed.manifest_for(name, version) {
                Ok(manifest) => {
                    trace!("Feed {} has the manifest of {} {}", feed_name, name, version);
                    return Ok(manifest);
                }
                Err(FeedError::PackageNotFound { .. }) => {}
                Err(FeedError::VersionNotFound { .. }) => known = true,
            }
        }
        if known {
            Err(FeedError::VersionNotFound {
                name: name.clone(),
                version: *version,
            })
        } else {
            Err(FeedError::PackageNotFound { name: name.clone() })
        }
    }
}
