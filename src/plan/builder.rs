use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use log::{debug, info, warn};

use crate::{
    feed::{DependencyEdge, FeedError, FeedService},
    model::{
        DependencyCollection, PackageName, ProjectName, ResolvedDependency, UpdateMode, Version,
    },
};

use super::{OperationType, Plan, PlanError, PlanItem, PlanRequest};

/// Computes the changes a request needs across a whole solution.
///
/// The feed is injected, so any [`FeedService`] works, including `&F` to share one feed between
/// builders.
pub struct PlanBuilder<F> {
    feed: F,
}

impl<F> PlanBuilder<F>
where
    F: FeedService,
{
    pub fn new(feed: F) -> Self {
        PlanBuilder { feed }
    }

    /// Plans `request`. Either the full plan is returned or an error; never part of a plan.
    pub fn plan_for(&self, request: &PlanRequest<'_>) -> Result<Plan, PlanError> {
        let solution = request.solution;
        let dependencies = solution.dependencies();
        dependencies
            .validate()
            .map_err(PlanError::ConflictingVersionAcrossProjects)?;

        let target = &request.dependency.name;
        let current = dependencies.find(target);
        if request.operation == OperationType::Update && current.is_none() {
            return Err(PlanError::NotInSolution {
                name: target.clone(),
                solution: solution.name().to_string(),
            });
        }

        let explicit_project = match &request.project {
            Some(project) => Some(
                solution
                    .find_project(project)
                    .map(|p| p.name().clone())
                    .ok_or_else(|| PlanError::ProjectNotFound {
                        project: project.clone(),
                        solution: solution.name().to_string(),
                    })?,
            ),
            None => None,
        };

        let resolution = Resolution {
            feed: &self.feed,
            dependencies: &dependencies,
            force_updates: request.force_updates,
        };

        let seed = resolution.seed(request, current)?;
        debug!(
            "Planning {} of {} {} in solution {}",
            request.operation,
            target,
            seed,
            solution.name()
        );
        let required = resolution.closure(target, seed)?;

        let mut updates = Vec::new();
        let mut installs = Vec::new();
        let mut introduced = Vec::new();
        for (name, version) in &required {
            match dependencies.find(name) {
                Some(present) if present.is_solution_scoped() => {
                    if present.version == Some(*version) {
                        debug!("{} {} is already in place", name, version);
                        continue;
                    }
                    debug!(
                        "{} moves from {} to {}",
                        name,
                        present
                            .version
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "*".to_string()),
                        version
                    );
                    // The mode records how the user tracks the package, whatever moved its version.
                    updates.push(PlanItem::update_solution(
                        present.name.clone(),
                        *version,
                        present.mode,
                    ));
                }
                present => {
                    let mode = if name == target {
                        request.dependency.mode
                    } else {
                        UpdateMode::Fixed
                    };
                    match present {
                        Some(_) => debug!(
                            "{} {} is referenced by projects but not declared by the solution",
                            name, version
                        ),
                        None => debug!("{} {} is new to the solution", name, version),
                    }
                    let name = present.map_or_else(|| name.clone(), |p| p.name.clone());
                    installs.push(PlanItem::install_solution(name.clone(), *version, mode));
                    introduced.push(name);
                }
            }
        }

        let mut fallout: BTreeMap<ProjectName, Vec<PackageName>> = dependencies
            .projects_referencing(target)
            .into_iter()
            .map(|project| (project, introduced.clone()))
            .collect();
        if let Some(project) = explicit_project {
            let names = fallout.entry(project).or_insert_with(|| introduced.clone());
            if !names.contains(target) {
                names.push(target.clone());
            }
        }

        let mut references = Vec::new();
        for (project, names) in fallout {
            let existing = solution.find_project(&project);
            for name in names {
                if existing.is_some_and(|p| p.references(&name)) {
                    continue;
                }
                references.push(PlanItem::install_project(project.clone(), name));
            }
        }

        let plan = order(updates, installs, references);
        info!(
            "Planned {} change(s) to {} {} in solution {}",
            plan.len(),
            request.operation,
            target,
            solution.name()
        );
        Ok(plan)
    }
}

/// Solution updates, then solution installs, then project references. Each group by package
/// name; project references by project first.
fn order(
    mut updates: Vec<PlanItem>,
    mut installs: Vec<PlanItem>,
    mut references: Vec<PlanItem>,
) -> Plan {
    updates.sort_by(|a, b| a.name().cmp(b.name()));
    installs.sort_by(|a, b| a.name().cmp(b.name()));
    references.sort_by(|a, b| (a.project(), a.name()).cmp(&(b.project(), b.name())));
    updates
        .into_iter()
        .chain(installs)
        .chain(references)
        .collect()
}

struct Resolution<'a, F> {
    feed: &'a F,
    dependencies: &'a DependencyCollection,
    force_updates: bool,
}

impl<'a, F> Resolution<'a, F>
where
    F: FeedService,
{
    fn seed(
        &self,
        request: &PlanRequest<'_>,
        current: Option<&ResolvedDependency>,
    ) -> Result<Version, FeedError> {
        let name = &request.dependency.name;
        match (request.dependency.version, current) {
            (Some(version), _) => self
                .feed
                .resolve(&DependencyEdge::new(name.clone(), Some(version))),
            (None, Some(current)) => self.tracked(current),
            (None, None) => self.feed.latest_version(name),
        }
    }

    /// Version a present package should be at before anything else requires more of it.
    fn tracked(&self, present: &ResolvedDependency) -> Result<Version, FeedError> {
        let floating = present.mode == UpdateMode::Float || self.force_updates;
        match present.version {
            Some(current) if !floating => Ok(current),
            Some(current) => Ok(self.feed.latest_version(&present.name)?.max(current)),
            None => self.feed.latest_version(&present.name),
        }
    }

    /// Version the closure needs for `edge`. Declared versions act as minimums for packages the
    /// solution already has, so nothing is ever downgraded.
    fn settle(&self, edge: &DependencyEdge) -> Result<Version, FeedError> {
        match self.dependencies.find(&edge.name) {
            None => self.feed.resolve(edge),
            Some(present) => {
                let tracked = self.tracked(present)?;
                match edge.version {
                    Some(_) => Ok(tracked.max(self.feed.resolve(edge)?)),
                    None => Ok(tracked),
                }
            }
        }
    }

    // A package kept at the version the solution already has is assumed satisfied.
    fn needs_walk(&self, name: &PackageName, version: Version) -> bool {
        self.dependencies
            .find(name)
            .and_then(|present| present.version)
            != Some(version)
    }

    /// Walks manifests from the seed and settles on exactly one version per package. When two
    /// requirements disagree the newer version wins.
    ///
    /// A version that loses after its own manifest was walked may have pulled in packages nothing
    /// else needs. The walk then starts over with the winning version as a floor for that package,
    /// until no walked version is superseded.
    fn closure(
        &self,
        seed: &PackageName,
        seed_version: Version,
    ) -> Result<BTreeMap<PackageName, Version>, FeedError> {
        let mut floors = BTreeMap::new();
        loop {
            let walk = self.walk(seed, seed_version, &floors)?;
            if walk.stale.is_empty() {
                debug!(
                    "Closure of {} {} requires {} package(s)",
                    seed,
                    seed_version,
                    walk.required.len()
                );
                return Ok(walk.required);
            }
            for name in walk.stale {
                if let Some(version) = walk.required.get(&name) {
                    debug!("Walking {} again with {} {} as a floor", seed, name, version);
                    floors.insert(name, *version);
                }
            }
        }
    }

    fn walk(
        &self,
        seed: &PackageName,
        seed_version: Version,
        floors: &BTreeMap<PackageName, Version>,
    ) -> Result<Walk, FeedError> {
        let floored = |name: &PackageName, version: Version| match floors.get(name) {
            Some(floor) => version.max(*floor),
            None => version,
        };
        let seed_version = floored(seed, seed_version);
        let mut required = BTreeMap::from([(seed.clone(), seed_version)]);
        let mut pending = VecDeque::from([(seed.clone(), seed_version)]);
        let mut walked: HashSet<(PackageName, Version)> = HashSet::new();
        let mut stale = BTreeSet::new();

        while let Some((name, version)) = pending.pop_front() {
            if required.get(&name) != Some(&version) {
                debug!("Skipping {} {}, superseded by a newer requirement", name, version);
                continue;
            }
            if !walked.insert((name.clone(), version)) {
                continue;
            }

            let manifest = self.feed.manifest_for(&name, &version)?;
            for edge in &manifest.dependencies {
                let wanted = floored(&edge.name, self.settle(edge)?);
                debug!("{} {} requires {}, resolved to {}", name, version, edge, wanted);

                match required.get(&edge.name).copied() {
                    Some(existing) if existing == wanted => {}
                    Some(existing) if existing > wanted => {
                        warn!(
                            "Discarded {} {} required by {} {}, keeping {}",
                            edge.name, wanted, name, version, existing
                        );
                    }
                    existing => {
                        if let Some(existing) = existing {
                            warn!(
                                "Discarded {} {} in favour of {} required by {} {}",
                                edge.name, existing, wanted, name, version
                            );
                            if walked.contains(&(edge.name.clone(), existing)) {
                                stale.insert(edge.name.clone());
                            }
                        }
                        required.insert(edge.name.clone(), wanted);
                        if self.needs_walk(&edge.name, wanted) {
                            pending.push_back((edge.name.clone(), wanted));
                        }
                    }
                }
            }
        }

        Ok(Walk { required, stale })
    }
}

/// One pass over the dependency graph.
struct Walk {
    required: BTreeMap<PackageName, Version>,
    /// Packages whose walked version was later superseded.
    stale: BTreeSet<PackageName>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        feed::{CachingFeed, FeedSet, MemoryFeed},
        model::{Dependency, ProjectDependency, Solution},
    };

    use pretty_assertions::assert_eq;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn feeds() -> FeedSet {
        FeedSet::new()
            .with_feed(
                MemoryFeed::fubu()
                    .configure_package("Serenity", v("1.1.0.0"), |serenity| {
                        serenity.depends_on_version("WebDriver", v("1.1.0.0"));
                    })
                    .configure_package("Serenity", v("1.2.0.0"), |serenity| {
                        serenity
                            .depends_on_version("WebDriver", v("1.2.0.0"))
                            .depends_on("Something")
                            .depends_on_version("SomethingElse", v("0.9.9.9"));
                    }),
            )
            .with_feed(
                MemoryFeed::nuget_v2()
                    .add("Something", v("1.0.0.5"))
                    .add("SomethingElse", v("0.9.9.9"))
                    .add("WebDriver", v("1.1.0.0"))
                    .add("WebDriver", v("1.2.0.0")),
            )
    }

    fn test_solution() -> Solution {
        let mut solution = Solution::new("Test");
        solution.add_dependency(Dependency::fixed("WebDriver", v("1.1.0.0")));
        solution.add_local("Serenity", v("1.1.0.0"));
        solution.add_project_dependency("Test1", ProjectDependency::new("Serenity"));
        solution.add_project_dependency("Test2", ProjectDependency::new("Serenity"));
        solution
    }

    fn plan(items: Vec<PlanItem>) -> Plan {
        items.into_iter().collect()
    }

    #[test]
    fn update_floated_dependency_with_new_transitive_dependencies() {
        let solution = test_solution();
        let builder = PlanBuilder::new(feeds());

        let actual = builder
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap();

        assert_eq!(
            actual,
            plan(vec![
                PlanItem::update_solution("Serenity", v("1.2.0.0"), UpdateMode::Float),
                PlanItem::update_solution("WebDriver", v("1.2.0.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Something", v("1.0.0.5"), UpdateMode::Fixed),
                PlanItem::install_solution("SomethingElse", v("0.9.9.9"), UpdateMode::Fixed),
                PlanItem::install_project("Test1", "Something"),
                PlanItem::install_project("Test1", "SomethingElse"),
                PlanItem::install_project("Test2", "Something"),
                PlanItem::install_project("Test2", "SomethingElse"),
            ])
        );
    }

    #[test]
    fn planning_is_deterministic() {
        let solution = test_solution();
        let builder = PlanBuilder::new(feeds());
        let request = PlanRequest::update(&solution, "serenity");

        let first = builder.plan_for(&request).unwrap();
        for _ in 0..5 {
            assert_eq!(builder.plan_for(&request).unwrap(), first);
        }
    }

    #[test]
    fn solution_items_precede_project_items() {
        let solution = test_solution();
        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap();

        for (index, item) in actual.iter().enumerate() {
            if let PlanItem::InstallProjectDependency { name, .. } = item {
                let installed_at = actual
                    .iter()
                    .position(|i| i.is_solution_level() && i.name() == name)
                    .unwrap();
                assert!(installed_at < index);
            }
        }
    }

    #[test]
    fn install_of_present_package_is_a_no_op() {
        let solution = test_solution();
        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::install(
                &solution,
                Dependency::fixed("WebDriver", v("1.1.0.0")),
            ))
            .unwrap();
        assert!(actual.is_empty());
    }

    #[test]
    fn update_of_fixed_dependency_without_force_stays() {
        let solution = test_solution();
        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "WebDriver"))
            .unwrap();
        assert_eq!(actual, Plan::default());
    }

    #[test]
    fn force_moves_fixed_dependency_to_latest_keeping_its_mode() {
        let solution = test_solution();
        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "WebDriver").force_updates(true))
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![PlanItem::update_solution(
                "WebDriver",
                v("1.2.0.0"),
                UpdateMode::Fixed
            )])
        );
    }

    #[test]
    fn update_on_latest_version_is_a_no_op() {
        let mut solution = Solution::new("Test");
        solution.add_dependency(Dependency::fixed("WebDriver", v("1.2.0.0")));
        solution.add_dependency(Dependency::floated("Serenity").with_version(v("1.2.0.0")));
        solution.add_dependency(Dependency::fixed("Something", v("1.0.0.5")));
        solution.add_dependency(Dependency::fixed("SomethingElse", v("0.9.9.9")));
        solution.add_project_dependency("Test1", ProjectDependency::new("Serenity"));

        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap();
        assert!(actual.is_empty());
    }

    #[test]
    fn conflicting_projects_fail_before_resolution() {
        let mut solution = test_solution();
        solution.add_project_dependency("Test1", ProjectDependency::at("WebDriver", v("1.1.0.0")));
        solution.add_project_dependency("Test2", ProjectDependency::at("WebDriver", v("1.2.0.0")));

        // An empty feed proves no lookup happens before the check.
        let error = PlanBuilder::new(FeedSet::new())
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap_err();
        match error {
            PlanError::ConflictingVersionAcrossProjects(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].name.as_str(), "WebDriver");
                assert_eq!(
                    conflicts[0].versions.keys().copied().collect::<Vec<_>>(),
                    vec![v("1.1.0.0"), v("1.2.0.0")]
                );
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unknown_package_aborts_planning() {
        let solution = test_solution();
        let error = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::install(&solution, Dependency::floated("Nope")))
            .unwrap_err();
        assert!(matches!(
            error,
            PlanError::Feed(FeedError::PackageNotFound { name }) if name.as_str() == "Nope"
        ));
    }

    #[test]
    fn missing_transitive_version_aborts_planning() {
        let solution = test_solution();
        let broken = FeedSet::new().with_feed(
            MemoryFeed::fubu()
                .add("WebDriver", v("1.1.0.0"))
                .configure_package("Serenity", v("1.3.0.0"), |serenity| {
                    serenity.depends_on_version("WebDriver", v("2.0.0.0"));
                }),
        );
        let error = PlanBuilder::new(broken)
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap_err();
        assert!(matches!(
            error,
            PlanError::Feed(FeedError::VersionNotFound { version, .. }) if version == v("2.0.0.0")
        ));
    }

    #[test]
    fn update_of_unknown_dependency_is_rejected() {
        let solution = test_solution();
        let error = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "Something"))
            .unwrap_err();
        assert!(matches!(error, PlanError::NotInSolution { .. }));
    }

    #[test]
    fn install_new_floated_package_into_a_project() {
        let solution = test_solution();
        let actual = PlanBuilder::new(feeds())
            .plan_for(
                &PlanRequest::install(&solution, Dependency::floated("Something"))
                    .for_project("test2"),
            )
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![
                PlanItem::install_solution("Something", v("1.0.0.5"), UpdateMode::Float),
                PlanItem::install_project("Test2", "Something"),
            ])
        );
    }

    #[test]
    fn install_into_missing_project_is_rejected() {
        let solution = test_solution();
        let error = PlanBuilder::new(feeds())
            .plan_for(
                &PlanRequest::install(&solution, Dependency::floated("Something"))
                    .for_project("Nowhere"),
            )
            .unwrap_err();
        assert!(matches!(error, PlanError::ProjectNotFound { .. }));
    }

    #[test]
    fn install_pulls_transitive_packages_as_fixed() {
        let mut solution = Solution::new("Fresh");
        solution.add_project(crate::model::Project::new("App"));
        let actual = PlanBuilder::new(feeds())
            .plan_for(
                &PlanRequest::install(&solution, Dependency::fixed("Serenity", v("1.2.0.0")))
                    .for_project("App"),
            )
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![
                PlanItem::install_solution("Serenity", v("1.2.0.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Something", v("1.0.0.5"), UpdateMode::Fixed),
                PlanItem::install_solution("SomethingElse", v("0.9.9.9"), UpdateMode::Fixed),
                PlanItem::install_solution("WebDriver", v("1.2.0.0"), UpdateMode::Fixed),
                PlanItem::install_project("App", "Serenity"),
                PlanItem::install_project("App", "Something"),
                PlanItem::install_project("App", "SomethingElse"),
                PlanItem::install_project("App", "WebDriver"),
            ])
        );
    }

    #[test]
    fn newest_requirement_wins() {
        let feed = MemoryFeed::new("test")
            .configure_package("App", v("1.0"), |app| {
                app.depends_on_version("Left", v("1.0"))
                    .depends_on_version("Right", v("1.0"));
            })
            .configure_package("Left", v("1.0"), |left| {
                left.depends_on_version("Shared", v("1.0"));
            })
            .configure_package("Right", v("1.0"), |right| {
                right.depends_on_version("Shared", v("2.0"));
            })
            .add("Shared", v("1.0"))
            .configure_package("Shared", v("2.0"), |shared| {
                shared.depends_on("Extra");
            })
            .add("Extra", v("3.0"));
        let solution = Solution::new("Diamond");

        let actual = PlanBuilder::new(&feed)
            .plan_for(&PlanRequest::install(
                &solution,
                Dependency::fixed("App", v("1.0")),
            ))
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![
                PlanItem::install_solution("App", v("1.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Extra", v("3.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Left", v("1.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Right", v("1.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Shared", v("2.0"), UpdateMode::Fixed),
            ])
        );
    }

    #[test]
    fn declared_versions_never_downgrade_present_packages() {
        let feed = MemoryFeed::new("test")
            .configure_package("Serenity", v("1.2"), |serenity| {
                serenity.depends_on_version("WebDriver", v("1.0"));
            })
            .add("WebDriver", v("1.0"))
            .add("WebDriver", v("1.5"));
        let mut solution = Solution::new("Test");
        solution.add_dependency(Dependency::fixed("WebDriver", v("1.5")));
        solution.add_dependency(Dependency::fixed("Serenity", v("1.1")));

        let actual = PlanBuilder::new(&feed)
            .plan_for(&PlanRequest::update(&solution, "Serenity").force_updates(true))
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![PlanItem::update_solution(
                "Serenity",
                v("1.2"),
                UpdateMode::Fixed
            )])
        );
    }

    #[test]
    fn floated_transitive_dependency_moves_to_latest() {
        let feed = MemoryFeed::new("test")
            .configure_package("Serenity", v("1.2"), |serenity| {
                serenity.depends_on("FubuCore");
            })
            .add("FubuCore", v("1.0"))
            .add("FubuCore", v("1.1"));
        let mut solution = Solution::new("Test");
        solution.add_dependency(Dependency::fixed("Serenity", v("1.1")));
        solution.add_dependency(Dependency::floated("FubuCore").with_version(v("1.0")));
        solution.add_project_dependency("Web", ProjectDependency::new("FubuCore"));

        let actual = PlanBuilder::new(&feed)
            .plan_for(&PlanRequest::install(
                &solution,
                Dependency::fixed("Serenity", v("1.2")),
            ))
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![
                PlanItem::update_solution("FubuCore", v("1.1"), UpdateMode::Float),
                PlanItem::update_solution("Serenity", v("1.2"), UpdateMode::Fixed),
            ])
        );
    }

    #[test]
    fn projects_not_referencing_the_target_get_no_references() {
        let mut solution = test_solution();
        solution.add_project_dependency("Other", ProjectDependency::new("WebDriver"));

        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap();
        assert!(actual
            .iter()
            .all(|item| item.project().map(ProjectName::as_str) != Some("Other")));
        assert!(actual.items().contains(&PlanItem::update_solution(
            "WebDriver",
            v("1.2.0.0"),
            UpdateMode::Fixed
        )));
    }

    #[test]
    fn caching_feed_gives_the_same_plan() {
        let solution = test_solution();
        let cached = CachingFeed::new(feeds());
        let builder = PlanBuilder::new(&cached);
        let request = PlanRequest::update(&solution, "Serenity");

        assert_eq!(
            builder.plan_for(&request).unwrap(),
            PlanBuilder::new(feeds()).plan_for(&request).unwrap()
        );
        assert_eq!(builder.plan_for(&request).unwrap().len(), 8);
    }

    #[test]
    fn independent_runs_can_share_a_feed_across_threads() {
        let feed = Arc::new(CachingFeed::new(feeds()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let feed = feed.clone();
                std::thread::spawn(move || {
                    let solution = test_solution();
                    PlanBuilder::new(&*feed)
                        .plan_for(&PlanRequest::update(&solution, "Serenity"))
                        .map(|plan| plan.len())
                        .ok()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(8));
        }
    }

    #[test]
    fn superseded_version_drops_what_only_it_required() {
        let feed = MemoryFeed::new("test")
            .configure_package("App", v("1.0"), |app| {
                app.depends_on_version("Shared", v("1.0"))
                    .depends_on_version("Right", v("1.0"));
            })
            .configure_package("Right", v("1.0"), |right| {
                right.depends_on_version("Mid", v("1.0"));
            })
            .configure_package("Mid", v("1.0"), |mid| {
                mid.depends_on_version("Shared", v("2.0"));
            })
            .configure_package("Shared", v("1.0"), |shared| {
                shared.depends_on_version("Legacy", v("1.0"));
            })
            .add("Shared", v("2.0"))
            .add("Legacy", v("1.0"));
        let solution = Solution::new("Diamond");

        let actual = PlanBuilder::new(&feed)
            .plan_for(&PlanRequest::install(
                &solution,
                Dependency::fixed("App", v("1.0")),
            ))
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![
                PlanItem::install_solution("App", v("1.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Mid", v("1.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Right", v("1.0"), UpdateMode::Fixed),
                PlanItem::install_solution("Shared", v("2.0"), UpdateMode::Fixed),
            ])
        );
    }

    #[test]
    fn update_keeps_each_package_mode() {
        let mut solution = Solution::new("Test");
        solution.add_dependency(Dependency::floated("Serenity").with_version(v("1.1.0.0")));
        solution.add_dependency(Dependency::fixed("WebDriver", v("1.1.0.0")));
        solution.add_project_dependency("Test1", ProjectDependency::new("Serenity"));

        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap();

        let updates: Vec<&PlanItem> = actual
            .iter()
            .filter(|item| matches!(item, PlanItem::UpdateSolutionDependency { .. }))
            .collect();
        assert_eq!(
            updates,
            vec![
                &PlanItem::update_solution("Serenity", v("1.2.0.0"), UpdateMode::Float),
                &PlanItem::update_solution("WebDriver", v("1.2.0.0"), UpdateMode::Fixed),
            ]
        );
        for item in updates {
            if let PlanItem::UpdateSolutionDependency { name, mode, .. } = item {
                assert_eq!(Some(*mode), solution.find_dependency(name).map(|d| d.mode));
            }
        }
    }

    fn apply(solution: &mut Solution, plan: &Plan) {
        for item in plan {
            match item {
                PlanItem::UpdateSolutionDependency {
                    name,
                    version,
                    mode,
                }
                | PlanItem::InstallSolutionDependency {
                    name,
                    version,
                    mode,
                } => {
                    solution.add_dependency(Dependency::new(name.clone(), Some(*version), *mode));
                    let referencing: Vec<ProjectName> = solution
                        .projects()
                        .iter()
                        .filter(|project| project.references(name))
                        .map(|project| project.name().clone())
                        .collect();
                    for project in referencing {
                        solution
                            .add_project_dependency(project, ProjectDependency::at(name.clone(), *version));
                    }
                }
                PlanItem::InstallProjectDependency { project, name } => {
                    let (version, _) = solution
                        .dependencies()
                        .resolved_version_and_mode(name)
                        .unwrap();
                    solution.add_project_dependency(
                        project.clone(),
                        ProjectDependency::at(name.clone(), version),
                    );
                }
                PlanItem::UninstallDependency { .. } => unreachable!(),
            }
        }
    }

    #[test]
    fn applied_plan_leaves_one_version_per_package() {
        let mut solution = Solution::new("Test");
        solution.add_dependency(Dependency::fixed("WebDriver", v("1.1.0.0")));
        solution.add_local("Serenity", v("1.1.0.0"));
        solution.add_project_dependency("Test1", ProjectDependency::at("Serenity", v("1.1.0.0")));
        solution.add_project_dependency("Test1", ProjectDependency::at("WebDriver", v("1.1.0.0")));
        solution.add_project_dependency("Test2", ProjectDependency::at("Serenity", v("1.1.0.0")));
        solution.add_project_dependency("Web", ProjectDependency::at("WebDriver", v("1.1.0.0")));

        let actual = PlanBuilder::new(feeds())
            .plan_for(&PlanRequest::update(&solution, "Serenity"))
            .unwrap();
        assert_eq!(actual.len(), 8);
        apply(&mut solution, &actual);

        assert!(solution.validate().is_ok());
        for item in &actual {
            let (resolved, _) = solution
                .dependencies()
                .resolved_version_and_mode(item.name())
                .unwrap();
            for project in solution.projects() {
                for reference in project.dependencies() {
                    if &reference.name == item.name() {
                        assert_eq!(reference.version, Some(resolved));
                    }
                }
            }
        }
        assert_eq!(
            solution.dependencies().resolved_version_and_mode(&"WebDriver".into()),
            Some((v("1.2.0.0"), UpdateMode::Fixed))
        );
    }

    #[test]
    fn project_only_package_is_declared_at_solution_scope() {
        let feed = MemoryFeed::new("test")
            .add("NUnit", v("2.5"))
            .add("NUnit", v("2.6"));
        let mut solution = Solution::new("Test");
        solution.add_project_dependency("Web", ProjectDependency::at("NUnit", v("2.5")));

        let actual = PlanBuilder::new(&feed)
            .plan_for(&PlanRequest::update(&solution, "NUnit"))
            .unwrap();
        assert_eq!(
            actual,
            plan(vec![PlanItem::install_solution(
                "NUnit",
                v("2.6"),
                UpdateMode::Float
            )])
        );
    }
}
