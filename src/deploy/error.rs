// ABOUTME: Error types for deployment and rollback operations.
// ABOUTME: Each failure names the app, the environment and the stage it happened in.

use std::fmt;
use std::path::PathBuf;

use crate::backend::{BackendError, BackendKind};
use crate::config::ConfigError;
use crate::history::{DeployStatus, HistoryError};
use crate::hooks::HookFailure;
use crate::types::{AppName, EnvName};

/// Sequential stages of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LocateConfig,
    ResolveConfig,
    PreDeploy,
    Dispatch,
    HealthCheck,
    Record,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LocateConfig => "locate config",
            Stage::ResolveConfig => "load config",
            Stage::PreDeploy => "pre-deploy hooks",
            Stage::Dispatch => "backend dispatch",
            Stage::HealthCheck => "health check",
            Stage::Record => "record history",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while deploying.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// No descriptor at the explicit or conventional location.
    #[error("deployment config not found for {app} in {env}: {}", .searched.display())]
    ConfigNotFound {
        app: AppName,
        env: EnvName,
        searched: PathBuf,
    },

    /// Descriptor unreadable, malformed, or missing the environment.
    #[error("configuration error for {app} in {env}: {source}")]
    Config {
        app: AppName,
        env: EnvName,
        source: ConfigError,
    },

    /// A `file_check` hook target was missing.
    #[error("pre-deploy check failed for {app} in {env}: {source}")]
    PreDeployCheckFailed {
        app: AppName,
        env: EnvName,
        source: HookFailure,
    },

    /// The `type` names no backend, or none is registered for it.
    #[error("unsupported deployment type '{backend}' for {app} in {env}")]
    UnsupportedBackend {
        app: AppName,
        env: EnvName,
        backend: String,
    },

    /// The backend executor reported failure.
    #[error("deployment failed for {app} in {env}: {backend} backend: {source}")]
    BackendExecutionFailed {
        app: AppName,
        env: EnvName,
        backend: BackendKind,
        source: BackendError,
    },

    /// The deployed version never reported healthy.
    #[error(
        "deployment failed for {app} in {env}: health check of {endpoint} did not return {expected_status}"
    )]
    HealthCheckFailed {
        app: AppName,
        env: EnvName,
        endpoint: String,
        expected_status: u16,
    },

    /// The outcome could not be written to history.
    #[error("failed to record {status} deployment of {app} in {env}: {source}")]
    Persistence {
        app: AppName,
        env: EnvName,
        status: DeployStatus,
        source: HistoryError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    ConfigNotFound,
    ConfigError,
    PreDeployCheckFailed,
    UnsupportedBackend,
    BackendExecutionFailed,
    HealthCheckFailed,
    PersistenceFailure,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::ConfigNotFound { .. } => DeployErrorKind::ConfigNotFound,
            DeployError::Config { .. } => DeployErrorKind::ConfigError,
            DeployError::PreDeployCheckFailed { .. } => DeployErrorKind::PreDeployCheckFailed,
            DeployError::UnsupportedBackend { .. } => DeployErrorKind::UnsupportedBackend,
            DeployError::BackendExecutionFailed { .. } => DeployErrorKind::BackendExecutionFailed,
            DeployError::HealthCheckFailed { .. } => DeployErrorKind::HealthCheckFailed,
            DeployError::Persistence { .. } => DeployErrorKind::PersistenceFailure,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            DeployError::ConfigNotFound { .. } => Stage::LocateConfig,
            DeployError::Config { .. } => Stage::ResolveConfig,
            DeployError::PreDeployCheckFailed { .. } => Stage::PreDeploy,
            DeployError::UnsupportedBackend { .. } | DeployError::BackendExecutionFailed { .. } => {
                Stage::Dispatch
            }
            DeployError::HealthCheckFailed { .. } => Stage::HealthCheck,
            DeployError::Persistence { .. } => Stage::Record,
        }
    }

    pub fn app(&self) -> &AppName {
        match self {
            DeployError::ConfigNotFound { app, .. }
            | DeployError::Config { app, .. }
            | DeployError::PreDeployCheckFailed { app, .. }
            | DeployError::UnsupportedBackend { app, .. }
            | DeployError::BackendExecutionFailed { app, .. }
            | DeployError::HealthCheckFailed { app, .. }
            | DeployError::Persistence { app, .. } => app,
        }
    }

    pub fn env(&self) -> &EnvName {
        match self {
            DeployError::ConfigNotFound { env, .. }
            | DeployError::Config { env, .. }
            | DeployError::PreDeployCheckFailed { env, .. }
            | DeployError::UnsupportedBackend { env, .. }
            | DeployError::BackendExecutionFailed { env, .. }
            | DeployError::HealthCheckFailed { env, .. }
            | DeployError::Persistence { env, .. } => env,
        }
    }

    /// Whether this error means the configuration or invocation was wrong,
    /// as opposed to a deployment that was attempted and failed.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.kind(),
            DeployErrorKind::ConfigNotFound
                | DeployErrorKind::ConfigError
                | DeployErrorKind::UnsupportedBackend
        )
    }

    /// Whether a history record was written for this attempt.
    pub fn was_recorded(&self) -> bool {
        matches!(
            self.kind(),
            DeployErrorKind::BackendExecutionFailed | DeployErrorKind::HealthCheckFailed
        )
    }
}

/// Errors from choosing or executing a rollback.
#[derive(Debug, thiserror::Error)]
pub enum RollbackError {
    #[error("cannot roll back {app} in {env}: no deployment history")]
    NoDeploymentHistory { app: AppName, env: EnvName },

    #[error(
        "cannot roll back {app} in {env}: no earlier successful deployment other than current version {current_version}"
    )]
    NoRollbackTarget {
        app: AppName,
        env: EnvName,
        current_version: String,
    },

    #[error("cannot read deployment history for {app} in {env}: {source}")]
    History {
        app: AppName,
        env: EnvName,
        source: HistoryError,
    },

    #[error(transparent)]
    Deploy(#[from] DeployError),
}
