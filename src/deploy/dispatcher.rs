// ABOUTME: Sequences a single deployment: locate, resolve, check, dispatch, verify, record.
// ABOUTME: Every attempt that reaches a backend leaves exactly one history record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DeployError;
use crate::backend::{BackendExecutor, BackendKind, BackendRegistry, ExecutionRequest};
use crate::config::{
    self, ConfigError, HealthCheckConfig, LoadError, ResolvedConfig, APPS_DIR,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::health::{HealthVerifier, HttpProbe, Probe};
use crate::history::{
    DeployStatus, DeploymentRecord, FileHistoryStore, HistoryError, HistoryStore,
};
use crate::hooks::{self, PreDeployHook};
use crate::settings::Settings;
use crate::types::{AppName, EnvName};

/// Input to a single deployment.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub app: AppName,
    pub env: EnvName,
    pub version: String,
    /// Explicit descriptor path, overriding `{config_dir}/apps/{app}.*`.
    pub config_path: Option<PathBuf>,
    /// Backend options passed through to the executor untouched.
    pub options: BTreeMap<String, String>,
}

impl DeployRequest {
    pub fn new(app: AppName, env: EnvName, version: impl Into<String>) -> Self {
        Self {
            app,
            env,
            version: version.into(),
            config_path: None,
            options: BTreeMap::new(),
        }
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// A deployment that succeeded and was recorded.
#[derive(Debug)]
pub struct DeployOutcome {
    pub record: DeploymentRecord,
    /// Where the history record was written.
    pub location: PathBuf,
    pub backend: BackendKind,
    /// True when the descriptor had no `type` and docker was assumed.
    pub defaulted_backend: bool,
    pub warnings: Vec<Warning>,
}

/// Configuration checked before anything runs.
struct Prepared {
    config: ResolvedConfig,
    hooks: Vec<PreDeployHook>,
    health: Option<HealthCheckConfig>,
}

/// Runs deployments against a set of backends and a history store.
pub struct Dispatcher {
    config_dir: PathBuf,
    backends: BackendRegistry,
    history: Arc<dyn HistoryStore>,
    probe: Arc<dyn Probe>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config_dir", &self.config_dir)
            .field("backends", &self.backends)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        config_dir: impl Into<PathBuf>,
        backends: BackendRegistry,
        history: Arc<dyn HistoryStore>,
        probe: Arc<dyn Probe>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            backends,
            history,
            probe,
        }
    }

    /// Dispatcher wired to plugin executors, file history and HTTP probing.
    pub async fn from_settings(settings: &Settings) -> Result<Self, HistoryError> {
        let history = FileHistoryStore::open(&settings.history_dir).await?;
        Ok(Self::new(
            &settings.config_dir,
            BackendRegistry::with_plugins(&settings.plugin_prefix),
            Arc::new(history),
            Arc::new(HttpProbe),
        ))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Deploy one version of one app to one environment.
    ///
    /// Failures before a backend is invoked leave no history. Once the backend
    /// runs, exactly one record is written, `success` only if the backend and
    /// the optional health check both passed.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome, DeployError> {
        let DeployRequest {
            app,
            env,
            version,
            config_path,
            options,
        } = request;
        let mut diag = Diagnostics::default();

        let path = self.locate(app, env, config_path.as_deref())?;
        tracing::debug!(app = %app, env = %env, "Using descriptor {}", path.display());

        let prepared = self.prepare(&path, app, env, &mut diag).await?;

        tracing::info!(app = %app, env = %env, version = %version, "Starting deployment");

        hooks::run_pre_deploy(&prepared.hooks, &mut diag)
            .await
            .map_err(|source| DeployError::PreDeployCheckFailed {
                app: app.clone(),
                env: env.clone(),
                source,
            })?;

        let (kind, defaulted, executor) = self.select_backend(app, env, &prepared.config)?;
        if defaulted {
            tracing::info!(app = %app, env = %env, "No deployment type configured, using {}", kind);
        }

        let execution = ExecutionRequest {
            app,
            env,
            version,
            config: &prepared.config,
            options,
        };
        let mut failure = executor.execute(&execution).await.err().map(|source| {
            DeployError::BackendExecutionFailed {
                app: app.clone(),
                env: env.clone(),
                backend: kind,
                source,
            }
        });

        if failure.is_none() {
            failure = self.verify(app, env, prepared.health).await;
        }

        let status = if failure.is_none() {
            DeployStatus::Success
        } else {
            DeployStatus::Failed
        };
        let record = DeploymentRecord::new(
            app.clone(),
            env.clone(),
            version.clone(),
            status,
            prepared.config.into_mapping(),
        );
        let location = self
            .history
            .append(&record)
            .await
            .map_err(|source| DeployError::Persistence {
                app: app.clone(),
                env: env.clone(),
                status,
                source,
            })?;

        if let Some(e) = failure {
            tracing::error!(app = %app, env = %env, version = %version, "{}", e);
            return Err(e);
        }

        tracing::info!(app = %app, env = %env, version = %version, "Deployment succeeded");
        Ok(DeployOutcome {
            record,
            location,
            backend: kind,
            defaulted_backend: defaulted,
            warnings: diag.into_warnings(),
        })
    }

    /// Most recent record for (app, env), whatever its status.
    pub async fn status(
        &self,
        app: &AppName,
        env: &EnvName,
    ) -> Result<Option<DeploymentRecord>, HistoryError> {
        self.history.latest(app, env).await
    }

    /// Records for an app, newest first. A `limit` of 0 means unlimited.
    pub async fn history(
        &self,
        app: &AppName,
        env: Option<&EnvName>,
        limit: usize,
    ) -> Result<Vec<DeploymentRecord>, HistoryError> {
        self.history.query(app, env, limit).await
    }

    fn locate(
        &self,
        app: &AppName,
        env: &EnvName,
        explicit: Option<&Path>,
    ) -> Result<PathBuf, DeployError> {
        let not_found = |searched: PathBuf| DeployError::ConfigNotFound {
            app: app.clone(),
            env: env.clone(),
            searched,
        };

        match explicit {
            Some(path) if path.is_file() => Ok(path.to_path_buf()),
            Some(path) => Err(not_found(path.to_path_buf())),
            None => config::locate_descriptor(&self.config_dir, app.as_str())
                .ok_or_else(|| not_found(self.config_dir.join(APPS_DIR))),
        }
    }

    async fn prepare(
        &self,
        path: &Path,
        app: &AppName,
        env: &EnvName,
        diag: &mut Diagnostics,
    ) -> Result<Prepared, DeployError> {
        let config_error = |source: ConfigError| DeployError::Config {
            app: app.clone(),
            env: env.clone(),
            source,
        };

        let descriptor = match config::load_descriptor(path).await {
            Ok(descriptor) => descriptor,
            Err(LoadError::NotFound(searched)) => {
                return Err(DeployError::ConfigNotFound {
                    app: app.clone(),
                    env: env.clone(),
                    searched,
                });
            }
            Err(e) => return Err(config_error(e.into())),
        };

        let config = ResolvedConfig::resolve(env.as_str(), &descriptor)
            .map_err(|e| config_error(e.into()))?;
        let hooks = config.pre_deploy_hooks(diag).map_err(config_error)?;
        let health = config.health_check().map_err(config_error)?;

        Ok(Prepared {
            config,
            hooks,
            health,
        })
    }

    fn select_backend(
        &self,
        app: &AppName,
        env: &EnvName,
        config: &ResolvedConfig,
    ) -> Result<(BackendKind, bool, Arc<dyn BackendExecutor>), DeployError> {
        let unsupported = |backend: String| DeployError::UnsupportedBackend {
            app: app.clone(),
            env: env.clone(),
            backend,
        };

        let (kind, defaulted) = BackendKind::for_config(config).map_err(|e| unsupported(e.0))?;
        let executor = self
            .backends
            .get(kind)
            .ok_or_else(|| unsupported(kind.to_string()))?;
        Ok((kind, defaulted, executor))
    }

    async fn verify(
        &self,
        app: &AppName,
        env: &EnvName,
        health: Option<HealthCheckConfig>,
    ) -> Option<DeployError> {
        let Some(health) = health else {
            tracing::info!(app = %app, env = %env, "No health check configured, skipping");
            return None;
        };

        let verifier = HealthVerifier::new(health, Arc::clone(&self.probe));
        if verifier.check().await {
            None
        } else {
            let config = verifier.config();
            Some(DeployError::HealthCheckFailed {
                app: app.clone(),
                env: env.clone(),
                endpoint: config.endpoint.clone(),
                expected_status: config.expected_status,
            })
        }
    }
}
