pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;
use services::classifier::model_manager::OnnxModelProvider;
use services::session::{SharedSession, WorkflowSession};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run_cli(cli: Cli) -> error::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let provider = Arc::new(OnnxModelProvider::new(config.model.clone()));
    let session = WorkflowSession::new(provider);

    match cli.command {
        Some(Commands::Identify { image, json }) => {
            ui::terminal::run_identify(session, &image, json).await
        }
        Some(Commands::Interactive) | None => {
            ui::terminal::run_interactive(SharedSession::new(session), config.ui.title).await
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "breed-finder failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
