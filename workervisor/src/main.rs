use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use workervisor::cli::Cli;
use workervisor::commands::{self, CommandStatus};
use workervisor::services::Services;
use workervisor_core::ConfigLoader;

fn run(cli: Cli) -> anyhow::Result<CommandStatus> {
    let config = ConfigLoader::new()
        .load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let services = Services::from_config(config)?;

    let mut stdout = std::io::stdout().lock();
    commands::execute(
        services.supervisor(),
        &cli.action,
        &cli.programs,
        cli.nagios,
        &mut stdout,
    )
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            CommandStatus::Failure.into()
        }
    }
}
