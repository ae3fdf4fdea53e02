// ABOUTME: Read-only commands: status, history, and the environment catalog.
// ABOUTME: Status and history read the same ordered records that drive rollback.

use deployctl::config::EnvironmentCatalog;
use deployctl::deploy::Dispatcher;
use deployctl::error::Result;
use deployctl::output::Output;
use deployctl::settings::Settings;
use deployctl::types::{AppName, EnvName};

/// Show the most recent deployment of (app, env).
pub async fn status(
    settings: &Settings,
    app: AppName,
    env: EnvName,
    output: &mut Output,
) -> Result<()> {
    let dispatcher = Dispatcher::from_settings(settings).await?;

    match dispatcher.status(&app, &env).await? {
        Some(record) => output.record(&record),
        None => output.progress(&format!("No deployments recorded for {app} in {env}")),
    }
    Ok(())
}

/// List deployments of an app, newest first.
pub async fn history(
    settings: &Settings,
    app: AppName,
    env: Option<EnvName>,
    limit: usize,
    output: &mut Output,
) -> Result<()> {
    let dispatcher = Dispatcher::from_settings(settings).await?;
    let records = dispatcher.history(&app, env.as_ref(), limit).await?;
    output.records(&records);
    Ok(())
}

/// List known environments.
pub async fn envs(settings: &Settings, output: &mut Output) -> Result<()> {
    let catalog = EnvironmentCatalog::load(&settings.config_dir).await?;
    output.environments(&catalog);
    Ok(())
}
