use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use log::trace;

use super::{
    Dependency, DependencyCollection, PackageName, ProjectDependency, ProjectName, Version,
    VersionConflict,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: ProjectName,
    dependencies: Vec<ProjectDependency>,
}

impl Project {
    pub fn new(name: impl Into<ProjectName>) -> Self {
        Project {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn dependencies(&self) -> &[ProjectDependency] {
        &self.dependencies
    }

    pub fn references(&self, name: &PackageName) -> bool {
        self.dependencies.iter().any(|d| &d.name == name)
    }

    /// Adds a reference, replacing an existing reference to the same package.
    pub fn add_dependency(&mut self, dependency: ProjectDependency) {
        match self.dependencies.iter_mut().find(|d| d.name == dependency.name) {
            Some(existing) => *existing = dependency,
            None => self.dependencies.push(dependency),
        }
    }
}

/// A set of projects sharing one set of solution level package declarations.
///
/// Every mutation bumps `revision`. [`Solution::dependencies`] hands out a cached
/// [`DependencyCollection`] and rebuilds it once the revision it was built at is stale.
#[derive(Debug)]
pub struct Solution {
    name: String,
    configured: Vec<Dependency>,
    local: BTreeMap<PackageName, Version>,
    projects: Vec<Project>,
    revision: u64,
    dependencies: Mutex<Option<Arc<DependencyCollection>>>,
}

impl Solution {
    pub fn new(name: impl Into<String>) -> Self {
        Solution {
            name: name.into(),
            configured: Vec::new(),
            local: BTreeMap::new(),
            projects: Vec::new(),
            revision: 0,
            dependencies: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find_project(&self, name: &ProjectName) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }

    /// Dependencies declared at solution scope.
    pub fn configured(&self) -> &[Dependency] {
        &self.configured
    }

    pub fn find_dependency(&self, name: &PackageName) -> Option<&Dependency> {
        self.configured.iter().find(|d| &d.name == name)
    }

    /// Packages present in storage, with the version found there.
    pub fn local(&self) -> &BTreeMap<PackageName, Version> {
        &self.local
    }

    /// Declares a dependency at solution scope, replacing one with the same name.
    pub fn add_dependency(&mut self, dependency: Dependency) {
        match self.configured.iter_mut().find(|d| d.name == dependency.name) {
            Some(existing) => *existing = dependency,
            None => self.configured.push(dependency),
        }
        self.touch();
    }

    pub fn add_local(&mut self, name: impl Into<PackageName>, version: Version) {
        self.local.insert(name.into(), version);
        self.touch();
    }

    /// Adds a project unless one with the same name already exists.
    pub fn add_project(&mut self, project: Project) {
        if self.find_project(project.name()).is_none() {
            self.projects.push(project);
            self.touch();
        }
    }

    /// Adds a reference to `project`, creating the project when it does not exist yet.
    pub fn add_project_dependency(
        &mut self,
        project: impl Into<ProjectName>,
        dependency: ProjectDependency,
    ) {
        let project = project.into();
        match self.projects.iter_mut().find(|p| p.name() == &project) {
            Some(existing) => existing.add_dependency(dependency),
            None => {
                let mut created = Project::new(project);
                created.add_dependency(dependency);
                self.projects.push(created);
            }
        }
        self.touch();
    }

    /// Aggregate view of solution and project dependencies for the current revision.
    pub fn dependencies(&self) -> Arc<DependencyCollection> {
        let mut cached = self
            .dependencies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match cached.as_ref() {
            Some(collection) if collection.revision() == self.revision => collection.clone(),
            _ => {
                trace!(
                    "Rebuilding dependency collection of {} at revision {}",
                    self.name,
                    self.revision
                );
                let collection = Arc::new(DependencyCollection::build(
                    self.revision,
                    &self.configured,
                    &self.local,
                    &self.projects,
                ));
                *cached = Some(collection.clone());
                collection
            }
        }
    }

    /// Checks that projects referencing the same package agree on its version.
    pub fn validate(&self) -> Result<(), Vec<VersionConflict>> {
        self.dependencies().validate()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
