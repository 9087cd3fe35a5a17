mod cache;
mod memory;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{PackageName, Version};

pub use cache::CachingFeed;
pub use memory::{FeedSet, MemoryFeed, FUBU, NUGET_V2};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Package {name} was not found on any feed")]
    PackageNotFound { name: PackageName },
    #[error("Version {version} of package {name} was not found on any feed")]
    VersionNotFound { name: PackageName, version: Version },
}

/// A dependency declared by a package manifest. No version means any version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub name: PackageName,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<Version>,
}

impl DependencyEdge {
    pub fn new(name: impl Into<PackageName>, version: Option<Version>) -> Self {
        DependencyEdge {
            name: name.into(),
            version,
        }
    }
}

impl Display for DependencyEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {}", self.name, version),
            None => write!(f, "{} *", self.name),
        }
    }
}

/// What a feed knows about one version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: PackageName,
    pub version: Version,
    pub dependencies: Vec<DependencyEdge>,
}

impl PackageManifest {
    pub fn new(name: impl Into<PackageName>, version: Version) -> Self {
        PackageManifest {
            name: name.into(),
            version,
            dependencies: Vec::new(),
        }
    }

    pub fn depends_on(&mut self, name: impl Into<PackageName>) -> &mut Self {
        self.dependencies.push(DependencyEdge::new(name, None));
        self
    }

    pub fn depends_on_version(&mut self, name: impl Into<PackageName>, version: Version) -> &mut Self {
        self.dependencies
            .push(DependencyEdge::new(name, Some(version)));
        self
    }
}

/// Read access to package metadata on the configured feeds.
///
/// Implementations must behave as pure lookups: the planner may ask the same question several
/// times during one run and does not memoize answers itself.
pub trait FeedService {
    /// Newest version of `name` across every feed.
    fn latest_version(&self, name: &PackageName) -> Result<Version, FeedError>;

    /// Declared dependencies of one exact package version.
    fn manifest_for(&self, name: &PackageName, version: &Version)
        -> Result<PackageManifest, FeedError>;

    /// Concrete version for `edge`: the declared version once confirmed to exist, otherwise the
    /// latest one.
    fn resolve(&self, edge: &DependencyEdge) -> Result<Version, FeedError> {
        match &edge.version {
            Some(version) => {
                self.manifest_for(&edge.name, version)?;
                Ok(*version)
            }
            None => self.latest_version(&edge.name),
        }
    }
}

impl<T> FeedService for &T
where
    T: FeedService + ?Sized,
{
    fn latest_version(&self, name: &PackageName) -> Result<Version, FeedError> {
        (**self).latest_version(name)
    }

    fn manifest_for(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<PackageManifest, FeedError> {
        (**self).manifest_for(name, version)
    }

    fn resolve(&self, edge: &DependencyEdge) -> Result<Version, FeedError> {
        (**self).resolve(edge)
    }
}

impl<T> FeedService for Box<T>
where
    T: FeedService + ?Sized,
{
    fn latest_version(&self, name: &PackageName) -> Result<Version, FeedError> {
        (**self).latest_version(name)
    }

    fn manifest_for(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<PackageManifest, FeedError> {
        (**self).manifest_for(name, version)
    }

    fn resolve(&self, edge: &DependencyEdge) -> Result<Version, FeedError> {
        (**self).resolve(edge)
    }
}
