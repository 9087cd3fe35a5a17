use log::info;

use crate::{
    model::{Dependency, UpdateMode, Version},
    Ripple,
};
use std::error::Error;

/// Handler to install command
pub fn do_install(
    ripple: &Ripple,
    name: &str,
    version: Option<&str>,
    mode: UpdateMode,
    project: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let version = version.map(Version::parse).transpose()?;
    let dependency = Dependency::new(name, version, mode);
    let plan = ripple.install(dependency, project.map(Into::into))?;
    info!("Planned {} change(s) for solution {}", plan.len(), ripple.solution().name());
    println!("{}", plan);
    Ok(())
}

/// Handler to update command
pub fn do_update(
    ripple: &Ripple,
    name: &str,
    version: Option<&str>,
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let version = version.map(Version::parse).transpose()?;
    // Without the flag the configured default applies.
    let plan = ripple.update(name, version, force.then_some(true))?;
    info!("Planned {} change(s) for solution {}", plan.len(), ripple.solution().name());
    println!("{}", plan);
    Ok(())
}

/// Handler to validate command
pub fn do_validate(ripple: &Ripple) -> Result<(), Box<dyn Error>> {
    ripple.validate()?;
    info!(
        "Solution {} has consistent versions across {} project(s)",
        ripple.solution().name(),
        ripple.solution().projects().len()
    );
    Ok(())
}
