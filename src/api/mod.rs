use std::path::{Path, PathBuf};

use crate::{
    feed::FeedService,
    model::{Dependency, PackageName, ProjectName, Solution, Version},
    plan::{Plan, PlanBuilder, PlanError, PlanRequest},
};

mod builder;

pub use builder::RippleBuilder;

/// A solution snapshot with its feeds, ready to plan against.
pub struct Ripple {
    snapshot_path: PathBuf,
    feeds: Box<dyn FeedService + Send + Sync>,
    solution: Solution,
    force_updates: bool,
}

impl Ripple {
    pub fn builder() -> RippleBuilder {
        RippleBuilder::default()
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Plans installing `dependency`, optionally referencing it from `project`.
    pub fn install(
        &self,
        dependency: Dependency,
        project: Option<ProjectName>,
    ) -> Result<Plan, PlanError> {
        let mut request = PlanRequest::install(&self.solution, dependency)
            .force_updates(self.force_updates);
        request.project = project;
        self.plan(&request)
    }

    /// Plans updating `name`. `force` overrides the configured default.
    pub fn update(
        &self,
        name: impl Into<PackageName>,
        version: Option<Version>,
        force: Option<bool>,
    ) -> Result<Plan, PlanError> {
        let mut request = PlanRequest::update(&self.solution, name)
            .force_updates(force.unwrap_or(self.force_updates));
        request.dependency.version = version;
        self.plan(&request)
    }

    /// Checks that projects referencing the same package agree on its version.
    pub fn validate(&self) -> Result<(), PlanError> {
        self.solution
            .validate()
            .map_err(PlanError::ConflictingVersionAcrossProjects)
    }

    fn plan(&self, request: &PlanRequest<'_>) -> Result<Plan, PlanError> {
        PlanBuilder::new(&self.feeds).plan_for(request)
    }
}
