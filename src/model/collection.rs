use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
};

use super::{Dependency, PackageName, Project, ProjectName, UpdateMode, Version};

/// Everything the solution currently knows about one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub name: PackageName,
    pub version: Option<Version>,
    pub mode: UpdateMode,
    /// Declared at solution scope rather than only found in storage or project references.
    pub configured: bool,
    /// Found in package storage.
    pub stored: bool,
    /// Referencing projects with the version each project's manifest records, if any.
    pub projects: BTreeMap<ProjectName, Option<Version>>,
}

impl ResolvedDependency {
    fn empty(name: PackageName) -> Self {
        ResolvedDependency {
            name,
            version: None,
            mode: UpdateMode::default(),
            configured: false,
            stored: false,
            projects: BTreeMap::new(),
        }
    }

    /// Declared at solution scope or found in storage. Packages known only through project
    /// references are not.
    pub fn is_solution_scoped(&self) -> bool {
        self.configured || self.stored
    }

    fn recorded_versions(&self) -> BTreeMap<Version, BTreeSet<ProjectName>> {
        let mut versions: BTreeMap<Version, BTreeSet<ProjectName>> = BTreeMap::new();
        for (project, version) in &self.projects {
            if let Some(version) = version {
                versions.entry(*version).or_default().insert(project.clone());
            }
        }
        versions
    }
}

/// A package that two or more projects record at different versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub name: PackageName,
    pub versions: BTreeMap<Version, BTreeSet<ProjectName>>,
}

impl Display for VersionConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "multiple versions found for {}:", self.name)?;
        for (version, projects) in &self.versions {
            let projects: Vec<&str> = projects.iter().map(ProjectName::as_str).collect();
            write!(f, " {} ({})", version, projects.join(", "))?;
        }
        Ok(())
    }
}

/// Read-only union of the solution level dependencies and every project's references.
///
/// Built for one solution revision; [`crate::model::Solution::dependencies`] rebuilds it when
/// the revision moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCollection {
    revision: u64,
    dependencies: BTreeMap<PackageName, ResolvedDependency>,
}

impl DependencyCollection {
    pub fn build<'a>(
        revision: u64,
        configured: &[Dependency],
        local: impl IntoIterator<Item = (&'a PackageName, &'a Version)>,
        projects: &[Project],
    ) -> Self {
        let mut collection = DependencyCollection {
            revision,
            dependencies: BTreeMap::new(),
        };
        for dependency in configured {
            collection.add_configured(dependency);
        }
        for (name, version) in local {
            collection.add_local(name, *version);
        }
        for project in projects {
            collection.add_project(project);
        }

        // Packages only known through project references take the version those projects record.
        for dependency in collection.dependencies.values_mut() {
            if dependency.version.is_none() && !dependency.configured {
                dependency.version = dependency.projects.values().flatten().next().copied();
            }
        }
        collection
    }

    fn add_configured(&mut self, dependency: &Dependency) {
        self.dependencies.insert(
            dependency.name.clone(),
            ResolvedDependency {
                name: dependency.name.clone(),
                version: dependency.version,
                mode: dependency.mode,
                configured: true,
                stored: false,
                projects: BTreeMap::new(),
            },
        );
    }

    // Configured versions take precedence over what storage reports.
    fn add_local(&mut self, name: &PackageName, version: Version) {
        let entry = self
            .dependencies
            .entry(name.clone())
            .or_insert_with(|| ResolvedDependency::empty(name.clone()));
        entry.stored = true;
        if entry.version.is_none() {
            entry.version = Some(version);
        }
    }

    fn add_project(&mut self, project: &Project) {
        for dependency in project.dependencies() {
            let entry = self
                .dependencies
                .entry(dependency.name.clone())
                .or_insert_with(|| ResolvedDependency::empty(dependency.name.clone()));
            entry
                .projects
                .insert(project.name().clone(), dependency.version);
        }
    }

    /// Solution revision this view was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn find(&self, name: &PackageName) -> Option<&ResolvedDependency> {
        self.dependencies.get(name)
    }

    pub fn resolved_version_and_mode(&self, name: &PackageName) -> Option<(Version, UpdateMode)> {
        self.find(name)
            .and_then(|dependency| dependency.version.map(|version| (version, dependency.mode)))
    }

    pub fn projects_referencing(&self, name: &PackageName) -> BTreeSet<ProjectName> {
        self.find(name)
            .map(|dependency| dependency.projects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies.values()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Packages whose referencing projects disagree on the version, ordered by name.
    pub fn conflicts(&self) -> Vec<VersionConflict> {
        self.dependencies
            .values()
            .filter_map(|dependency| {
                let versions = dependency.recorded_versions();
                (versions.len() > 1).then(|| VersionConflict {
                    name: dependency.name.clone(),
                    versions,
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), Vec<VersionConflict>> {
        let conflicts = self.conflicts();
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(conflicts)
        }
    }
}
