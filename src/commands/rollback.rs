// ABOUTME: Rollback command implementation.
// ABOUTME: Chooses the target from history (or takes it explicitly) and redeploys it.

use deployctl::deploy::{Dispatcher, RollbackCoordinator};
use deployctl::error::Result;
use deployctl::output::Output;
use deployctl::settings::Settings;
use deployctl::types::{AppName, EnvName};

/// Roll back an app in one environment.
pub async fn rollback(
    settings: &Settings,
    app: AppName,
    env: EnvName,
    version: Option<String>,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();
    let dispatcher = Dispatcher::from_settings(settings).await?;

    output.progress(&format!("Rolling back {app} in {env}"));

    let outcome = RollbackCoordinator::new(&dispatcher)
        .rollback(&app, &env, version.as_deref())
        .await?;

    output.warnings(&outcome.deployment.warnings);
    if let Some(previous) = &outcome.previous_version {
        output.progress(&format!(
            "  → Replacing {previous} with {}",
            outcome.target_version
        ));
    }
    output.success(&format!(
        "Rolled back {app} in {env} to {}",
        outcome.target_version
    ));
    Ok(())
}
