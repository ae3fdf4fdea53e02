// ABOUTME: Deploy command implementation.
// ABOUTME: Builds the dispatcher from settings and reports the recorded outcome.

use deployctl::config::EnvironmentCatalog;
use deployctl::deploy::{DeployRequest, Dispatcher};
use deployctl::error::Result;
use deployctl::output::Output;
use deployctl::settings::Settings;

/// Deploy one version of one app to one environment.
pub async fn deploy(settings: &Settings, request: DeployRequest, output: &mut Output) -> Result<()> {
    output.start_timer();
    let dispatcher = Dispatcher::from_settings(settings).await?;

    output.progress(&format!(
        "Deploying {} {} to {}",
        request.app, request.version, request.env
    ));

    // The catalog is advisory: descriptors decide which environments exist.
    match EnvironmentCatalog::load(dispatcher.config_dir()).await {
        Ok(catalog) if !catalog.contains(request.env.as_str()) => output.warning(&format!(
            "environment '{}' is not in the environment catalog",
            request.env
        )),
        Ok(_) => {}
        Err(e) => output.warning(&format!("could not read environment catalog: {e}")),
    }

    let outcome = match dispatcher.deploy(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.was_recorded() {
                output.progress("  → Failed attempt recorded in history");
            }
            return Err(e.into());
        }
    };

    output.warnings(&outcome.warnings);
    if outcome.defaulted_backend {
        output.progress(&format!("  → No deployment type configured, used {}", outcome.backend));
    }
    output.progress(&format!("  → Recorded {}", outcome.location.display()));
    output.success(&format!(
        "Deployed {} {} to {} ({})",
        request.app, request.version, request.env, outcome.backend
    ));
    Ok(())
}
