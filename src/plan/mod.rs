mod builder;

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::{
    feed::FeedError,
    model::{
        Dependency, PackageName, ProjectName, Solution, UpdateMode, Version, VersionConflict,
    },
};

pub use builder::PlanBuilder;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Conflicting versions across projects: {}", describe_conflicts(.0))]
    ConflictingVersionAcrossProjects(Vec<VersionConflict>),
    #[error("Package {name} is not referenced by solution {solution}")]
    NotInSolution { name: PackageName, solution: String },
    #[error("Project {project} does not exist in solution {solution}")]
    ProjectNotFound {
        project: ProjectName,
        solution: String,
    },
}

fn describe_conflicts(conflicts: &[VersionConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Install,
    Update,
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Install => f.write_str("install"),
            OperationType::Update => f.write_str("update"),
        }
    }
}

/// One user action against one solution.
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub solution: &'a Solution,
    /// Target package. For installs its version constraint and mode are used as given; for
    /// updates only an explicit version is, the mode always comes from the solution.
    pub dependency: Dependency,
    pub operation: OperationType,
    pub force_updates: bool,
    /// Project that should reference the installed package, in addition to the projects already
    /// referencing it.
    pub project: Option<ProjectName>,
}

impl<'a> PlanRequest<'a> {
    pub fn install(solution: &'a Solution, dependency: Dependency) -> Self {
        PlanRequest {
            solution,
            dependency,
            operation: OperationType::Install,
            force_updates: false,
            project: None,
        }
    }

    pub fn update(solution: &'a Solution, name: impl Into<PackageName>) -> Self {
        PlanRequest {
            solution,
            dependency: Dependency::floated(name),
            operation: OperationType::Update,
            force_updates: false,
            project: None,
        }
    }

    pub fn force_updates(mut self, force: bool) -> Self {
        self.force_updates = force;
        self
    }

    pub fn for_project(mut self, project: impl Into<ProjectName>) -> Self {
        self.project = Some(project.into());
        self
    }
}

/// A single change to apply to a solution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlanItem {
    UpdateSolutionDependency {
        name: PackageName,
        version: Version,
        mode: UpdateMode,
    },
    InstallSolutionDependency {
        name: PackageName,
        version: Version,
        mode: UpdateMode,
    },
    InstallProjectDependency {
        project: ProjectName,
        name: PackageName,
    },
    /// Removal at project scope, or at solution scope when `project` is `None`.
    UninstallDependency {
        project: Option<ProjectName>,
        name: PackageName,
    },
}

impl PlanItem {
    pub fn update_solution(name: impl Into<PackageName>, version: Version, mode: UpdateMode) -> Self {
        PlanItem::UpdateSolutionDependency {
            name: name.into(),
            version,
            mode,
        }
    }

    pub fn install_solution(name: impl Into<PackageName>, version: Version, mode: UpdateMode) -> Self {
        PlanItem::InstallSolutionDependency {
            name: name.into(),
            version,
            mode,
        }
    }

    pub fn install_project(project: impl Into<ProjectName>, name: impl Into<PackageName>) -> Self {
        PlanItem::InstallProjectDependency {
            project: project.into(),
            name: name.into(),
        }
    }

    pub fn uninstall(project: Option<ProjectName>, name: impl Into<PackageName>) -> Self {
        PlanItem::UninstallDependency {
            project,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &PackageName {
        match self {
            PlanItem::UpdateSolutionDependency { name, .. }
            | PlanItem::InstallSolutionDependency { name, .. }
            | PlanItem::InstallProjectDependency { name, .. }
            | PlanItem::UninstallDependency { name, .. } => name,
        }
    }

    pub fn project(&self) -> Option<&ProjectName> {
        match self {
            PlanItem::InstallProjectDependency { project, .. } => Some(project),
            PlanItem::UninstallDependency { project, .. } => project.as_ref(),
            _ => None,
        }
    }

    pub fn is_solution_level(&self) -> bool {
        matches!(
            self,
            PlanItem::UpdateSolutionDependency { .. } | PlanItem::InstallSolutionDependency { .. }
        )
    }
}

impl Display for PlanItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanItem::UpdateSolutionDependency {
                name,
                version,
                mode,
            } => write!(f, "Update {} to {} ({})", name, version, mode),
            PlanItem::InstallSolutionDependency {
                name,
                version,
                mode,
            } => write!(f, "Install {} {} ({})", name, version, mode),
            PlanItem::InstallProjectDependency { project, name } => {
                write!(f, "Install {} to project {}", name, project)
            }
            PlanItem::UninstallDependency {
                project: Some(project),
                name,
            } => write!(f, "Uninstall {} from project {}", name, project),
            PlanItem::UninstallDependency {
                project: None,
                name,
            } => write!(f, "Uninstall {} from the solution", name),
        }
    }
}

/// Ordered changes for one request. Two plans are equal when they hold the same items in the
/// same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    items: Vec<PlanItem>,
}

impl Plan {
    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<PlanItem> for Plan {
    fn from_iter<I: IntoIterator<Item = PlanItem>>(iter: I) -> Self {
        Plan {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Plan {
    type Item = PlanItem;
    type IntoIter = std::vec::IntoIter<PlanItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlanItem;
    type IntoIter = std::slice::Iter<'a, PlanItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.items.is_empty() {
            return f.write_str("Nothing to do");
        }
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}
