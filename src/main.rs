// ABOUTME: Entry point for the deployctl CLI application.
// ABOUTME: Parses arguments, installs logging, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use deployctl::deploy::DeployRequest;
use deployctl::error::{Error, Result};
use deployctl::output::Output;
use deployctl::settings::Settings;
use deployctl::types::{AppName, EnvName};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // -v forces debug; otherwise RUST_LOG, falling back to warn
    let filter = if cli.global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.global.output_mode());
    let settings = cli.global.settings();

    if let Err(e) = run(cli.command, &settings, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(command: Commands, settings: &Settings, output: &mut Output) -> Result<()> {
    match command {
        Commands::Deploy {
            app,
            env,
            version,
            config,
            options,
        } => {
            let mut request = DeployRequest::new(
                AppName::new(&app)?,
                EnvName::new(&env)?,
                version_arg(version)?,
            );
            request.config_path = config;
            request.options = options.into_iter().collect();
            commands::deploy(settings, request, output).await
        }
        Commands::Rollback { app, env, version } => {
            let version = version.map(version_arg).transpose()?;
            commands::rollback(settings, AppName::new(&app)?, EnvName::new(&env)?, version, output)
                .await
        }
        Commands::Status { app, env } => {
            commands::status(settings, AppName::new(&app)?, EnvName::new(&env)?, output).await
        }
        Commands::History { app, env, limit } => {
            let env = env.as_deref().map(EnvName::new).transpose()?;
            commands::history(settings, AppName::new(&app)?, env, limit, output).await
        }
        Commands::Envs => commands::envs(settings, output).await,
    }
}

fn version_arg(version: String) -> Result<String> {
    if version.trim().is_empty() {
        return Err(Error::InvalidArgument("version cannot be empty".to_string()));
    }
    Ok(version)
}
