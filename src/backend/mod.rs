// ABOUTME: Contract for backend executors and the lookup table that selects them.
// ABOUTME: Executors are pluggable strategies; this crate only sequences them.

mod command;
mod kind;

pub use command::CommandExecutor;
pub use kind::{BackendKind, UnsupportedBackend};

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::config::ResolvedConfig;
use crate::types::{AppName, EnvName};

/// Everything an executor needs to carry out one deployment.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRequest<'a> {
    pub app: &'a AppName,
    pub env: &'a EnvName,
    pub version: &'a str,
    pub config: &'a ResolvedConfig,
    pub options: &'a BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", describe_exit(.exit_code))]
    Exited {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to prepare execution: {0}")]
    Prepare(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

/// Performs the deployment mechanics for one backend.
#[async_trait]
pub trait BackendExecutor: Send + Sync {
    /// Run the deployment. Any error means the attempt failed.
    async fn execute(&self, request: &ExecutionRequest<'_>) -> Result<(), BackendError>;
}

/// Lookup table from backend kind to executor.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    executors: HashMap<BackendKind, Arc<dyn BackendExecutor>>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.executors.keys().collect();
        kinds.sort();
        f.debug_struct("BackendRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`CommandExecutor`] for every backend, running
    /// `{prefix}{kind}` (e.g. `deployctl-kubernetes`).
    pub fn with_plugins(prefix: &str) -> Self {
        let mut registry = Self::new();
        for kind in BackendKind::ALL {
            registry.register(
                kind,
                Arc::new(CommandExecutor::new(format!("{prefix}{kind}"), kind)),
            );
        }
        registry
    }

    /// Register (or replace) the executor for `kind`.
    pub fn register(&mut self, kind: BackendKind, executor: Arc<dyn BackendExecutor>) -> &mut Self {
        self.executors.insert(kind, executor);
        self
    }

    pub fn get(&self, kind: BackendKind) -> Option<Arc<dyn BackendExecutor>> {
        self.executors.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl BackendExecutor for Noop {
        async fn execute(&self, _request: &ExecutionRequest<'_>) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[test]
    fn empty_registry_has_no_executors() {
        let registry = BackendRegistry::new();
        assert!(BackendKind::ALL.iter().all(|k| registry.get(*k).is_none()));
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = BackendRegistry::with_plugins("deployctl-");
        registry.register(BackendKind::Docker, Arc::new(Noop));
        assert!(registry.get(BackendKind::Docker).is_some());
        assert!(registry.get(BackendKind::Ansible).is_some());
    }

    #[test]
    fn exited_error_formats_signal() {
        let err = BackendError::Exited {
            program: "deployctl-docker".to_string(),
            exit_code: None,
            stderr: "killed".to_string(),
        };
        assert_eq!(err.to_string(), "deployctl-docker exited with signal: killed");
    }
}
