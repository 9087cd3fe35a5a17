use thiserror::Error;

pub mod collection;
pub mod dependency;
pub mod solution;
pub mod version;

pub use collection::{DependencyCollection, ResolvedDependency, VersionConflict};
pub use dependency::{Dependency, PackageName, ProjectDependency, ProjectName, UpdateMode};
pub use solution::{Project, Solution};
pub use version::Version;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading snapshot: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid version `{0}`")]
    InvalidVersion(String),
    #[error("Version component out of range in `{0}`")]
    VersionOverflow(String),
    #[error("Invalid update mode `{0}`, expected `fixed` or `float`")]
    InvalidUpdateMode(String),
}
