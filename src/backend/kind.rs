// ABOUTME: Backend selection from the resolved configuration.
// ABOUTME: Closed set of backend tags, with docker as the documented default.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ResolvedConfig, Value};

/// Backend that performs the actual deployment mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    Docker,
    DockerCompose,
    Kubernetes,
    Terraform,
    Ansible,
}

/// A `type` value that names no known backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported deployment type: {0}")]
pub struct UnsupportedBackend(pub String);

impl BackendKind {
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Docker,
        BackendKind::DockerCompose,
        BackendKind::Kubernetes,
        BackendKind::Terraform,
        BackendKind::Ansible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Docker => "docker",
            BackendKind::DockerCompose => "docker-compose",
            BackendKind::Kubernetes => "kubernetes",
            BackendKind::Terraform => "terraform",
            BackendKind::Ansible => "ansible",
        }
    }

    /// Select the backend for a resolved configuration.
    ///
    /// Returns the backend and whether the default was used. An absent `type`
    /// falls back to docker; a present but unrecognized one is an error.
    pub fn for_config(config: &ResolvedConfig) -> Result<(Self, bool), UnsupportedBackend> {
        match config.backend_type() {
            None => Ok((BackendKind::Docker, true)),
            Some(Value::String(tag)) => tag.parse().map(|kind| (kind, false)),
            Some(other) => Err(UnsupportedBackend(other.to_string())),
        }
    }
}

impl FromStr for BackendKind {
    type Err = UnsupportedBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnsupportedBackend(s.to_string()))
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
