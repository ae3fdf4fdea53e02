// ABOUTME: History-driven rollback to the last version that deployed cleanly.
// ABOUTME: Selection only ever reads the history store; the redeploy goes through the dispatcher.

use super::dispatcher::{DeployOutcome, DeployRequest, Dispatcher};
use super::error::RollbackError;
use crate::history::DeploymentRecord;
use crate::types::{AppName, EnvName};

/// Number of most recent records scanned for a rollback target.
pub const ROLLBACK_LOOKBACK: usize = 10;

/// Result of a completed rollback.
#[derive(Debug)]
pub struct RollbackOutcome {
    pub target_version: String,
    /// Version that was current before the rollback, when chosen from history.
    pub previous_version: Option<String>,
    pub deployment: DeployOutcome,
}

/// Chooses a rollback target from history and redeploys it.
#[derive(Debug)]
pub struct RollbackCoordinator<'a> {
    dispatcher: &'a Dispatcher,
    lookback: usize,
}

impl<'a> RollbackCoordinator<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self {
            dispatcher,
            lookback: ROLLBACK_LOOKBACK,
        }
    }

    pub fn lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Pick the most recent successful version that differs from the current one.
    ///
    /// Returns `(current, target)`.
    pub async fn select_target(
        &self,
        app: &AppName,
        env: &EnvName,
    ) -> Result<(String, String), RollbackError> {
        let records = self
            .dispatcher
            .history(app, Some(env), self.lookback)
            .await
            .map_err(|source| RollbackError::History {
                app: app.clone(),
                env: env.clone(),
                source,
            })?;

        let Some(current) = records.first() else {
            return Err(RollbackError::NoDeploymentHistory {
                app: app.clone(),
                env: env.clone(),
            });
        };
        let current = current.version().to_string();

        match target_in(&records, &current) {
            Some(target) => Ok((current, target.version().to_string())),
            None => Err(RollbackError::NoRollbackTarget {
                app: app.clone(),
                env: env.clone(),
                current_version: current,
            }),
        }
    }

    /// Roll back (app, env). An explicit version is deployed as-is, without
    /// consulting history.
    pub async fn rollback(
        &self,
        app: &AppName,
        env: &EnvName,
        explicit_version: Option<&str>,
    ) -> Result<RollbackOutcome, RollbackError> {
        let (previous_version, target_version) = match explicit_version {
            Some(version) => (None, version.to_string()),
            None => {
                let (current, target) = self.select_target(app, env).await?;
                (Some(current), target)
            }
        };

        tracing::info!(
            app = %app,
            env = %env,
            from = previous_version.as_deref().unwrap_or("-"),
            "Rolling back to {}",
            target_version
        );

        let request = DeployRequest::new(app.clone(), env.clone(), target_version.clone());
        let deployment = self.dispatcher.deploy(&request).await?;

        Ok(RollbackOutcome {
            target_version,
            previous_version,
            deployment,
        })
    }
}

/// First successful record, in newest-first order, whose version is not `current`.
fn target_in<'r>(records: &'r [DeploymentRecord], current: &str) -> Option<&'r DeploymentRecord> {
    records
        .iter()
        .find(|r| r.status().is_success() && r.version() != current)
}
