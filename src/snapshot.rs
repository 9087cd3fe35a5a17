//! TOML snapshots of feeds plus one solution, for previews and tests.
//!
//! ```toml
//! [[feeds]]
//! name = "fubu"
//! [[feeds.packages]]
//! name = "Serenity"
//! version = "1.2.0.0"
//! dependencies = [{ name = "WebDriver", version = "1.2.0.0" }, { name = "Something" }]
//!
//! [solution]
//! name = "Test"
//! dependencies = [{ name = "WebDriver", version = "1.1.0.0", mode = "fixed" }]
//! local = [{ name = "Serenity", version = "1.1.0.0" }]
//! projects = [{ name = "Test1", dependencies = ["Serenity"] }]
//! ```

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::{
    feed::{DependencyEdge, FeedSet, MemoryFeed, PackageManifest},
    model::{Dependency, PackageName, ParseError, Project, ProjectDependency, Solution, Version},
};

/// Feeds and solution loaded from a snapshot.
pub struct Snapshot {
    pub feeds: FeedSet,
    pub solution: Solution,
}

impl Snapshot {
    pub fn from_file(path: &Path) -> Result<Snapshot, ParseError> {
        debug!("Reading snapshot from {}", path.display());
        Snapshot::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_toml_str(data: &str) -> Result<Snapshot, ParseError> {
        let raw = toml::from_str::<RawSnapshot>(data)?;
        Ok(raw.into_snapshot())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSnapshot {
    #[serde(default)]
    feeds: Vec<RawFeed>,
    solution: RawSolution,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFeed {
    name: String,
    #[serde(default)]
    packages: Vec<RawPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPackage {
    name: PackageName,
    version: Version,
    #[serde(default)]
    dependencies: Vec<DependencyEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSolution {
    name: String,
    #[serde(default)]
    dependencies: Vec<Dependency>,
    #[serde(default)]
    local: Vec<RawLocal>,
    #[serde(default)]
    projects: Vec<RawProject>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLocal {
    name: PackageName,
    version: Version,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProject {
    name: String,
    #[serde(default)]
    dependencies: Vec<RawReference>,
}

/// A project reference is either a bare package name or a table with a recorded version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReference {
    Name(PackageName),
    Recorded {
        name: PackageName,
        version: Option<Version>,
    },
}

impl RawSnapshot {
    fn into_snapshot(self) -> Snapshot {
        let mut feeds = FeedSet::new();
        for raw_feed in self.feeds {
            let mut feed = MemoryFeed::new(raw_feed.name);
            for package in raw_feed.packages {
                let mut manifest = PackageManifest::new(package.name, package.version);
                manifest.dependencies = package.dependencies;
                feed.insert(manifest);
            }
            feeds.add_feed(feed);
        }

        let mut solution = Solution::new(self.solution.name);
        for dependency in self.solution.dependencies {
            solution.add_dependency(dependency);
        }
        for local in self.solution.local {
            solution.add_local(local.name, local.version);
        }
        for raw_project in self.solution.projects {
            let mut project = Project::new(raw_project.name);
            for reference in raw_project.dependencies {
                project.add_dependency(match reference {
                    RawReference::Name(name) => ProjectDependency::new(name),
                    RawReference::Recorded { name, version } => ProjectDependency {
                        name,
                        version,
                    },
                });
            }
            solution.add_project(project);
        }

        Snapshot { feeds, solution }
    }
}
