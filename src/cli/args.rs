use clap::{Parser, Subcommand};

use crate::model::UpdateMode;

/// Previews the changes a NuGet install or update would make to a solution.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Solution root directory
    #[clap(short, long, default_value = ".")]
    pub root: String,
    /// Snapshot file describing the feeds and the solution, relative to the root
    #[clap(short, long, default_value = "ripple.toml")]
    pub snapshot: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    ///Plans installing a package into the solution
    Install {
        name: String,
        /// Exact version to install, latest when omitted
        #[clap(short, long)]
        version: Option<String>,
        /// How the solution tracks the package afterwards
        #[clap(short, long, default_value = "float")]
        mode: UpdateMode,
        /// Project that should reference the package
        #[clap(short, long)]
        project: Option<String>,
    },
    ///Plans updating a package the solution already references
    Update {
        name: String,
        /// Exact version to update to, latest when omitted
        #[clap(short, long)]
        version: Option<String>,
        /// Moves fixed packages as well
        #[clap(short, long)]
        force: bool,
    },
    ///Checks that projects agree on the version of every shared package
    Validate,
}
