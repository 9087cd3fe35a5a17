use std::{error::Error, process::ExitCode};

use clap::Parser;

use ripple::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::{do_install, do_update, do_validate},
    },
    config::RippleConfig,
    Ripple,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = RippleConfig::load()?;
    log::debug!("Loaded configuration: {:?}", config);

    let ripple = Ripple::builder()
        .root(&cli_args.root)
        .snapshot_file_name(&cli_args.snapshot)
        .config(config)
        .try_build()?;

    match cli_args.cmd {
        Command::Install {
            name,
            version,
            mode,
            project,
        } => do_install(
            &ripple,
            &name,
            version.as_deref(),
            mode,
            project.as_deref(),
        ),
        Command::Update {
            name,
            version,
            force,
        } => do_update(&ripple, &name, version.as_deref(), force),
        Command::Validate => do_validate(&ripple),
    }
}
