// ABOUTME: Backend executor that delegates to an external plugin program.
// ABOUTME: Deployment context is passed as arguments and DEPLOYCTL_* environment variables.

use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::process::Stdio;
use tokio::process::Command;

use super::{BackendError, BackendExecutor, BackendKind, ExecutionRequest};

/// Runs `program app env version` and treats exit status 0 as success.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: OsString,
    kind: BackendKind,
}

impl CommandExecutor {
    pub fn new(program: impl Into<OsString>, kind: BackendKind) -> Self {
        Self {
            program: program.into(),
            kind,
        }
    }

    /// Environment passed to the plugin.
    pub fn environment(
        &self,
        request: &ExecutionRequest<'_>,
    ) -> Result<HashMap<String, String>, BackendError> {
        let config = serde_json::to_string(request.config.snapshot())
            .map_err(|e| BackendError::Prepare(format!("failed to encode config: {e}")))?;

        let mut env = HashMap::new();
        env.insert("DEPLOYCTL_APP".to_string(), request.app.to_string());
        env.insert("DEPLOYCTL_ENV".to_string(), request.env.to_string());
        env.insert("DEPLOYCTL_VERSION".to_string(), request.version.to_string());
        env.insert("DEPLOYCTL_BACKEND".to_string(), self.kind.to_string());
        env.insert("DEPLOYCTL_CONFIG".to_string(), config);
        for (key, value) in request.options {
            env.insert(option_var(key), value.clone());
        }
        Ok(env)
    }
}

fn option_var(key: &str) -> String {
    let key: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("DEPLOYCTL_OPT_{key}")
}

#[async_trait]
impl BackendExecutor for CommandExecutor {
    async fn execute(&self, request: &ExecutionRequest<'_>) -> Result<(), BackendError> {
        let program = self.program.to_string_lossy().into_owned();
        let env = self.environment(request)?;

        tracing::info!(
            backend = %self.kind,
            app = %request.app,
            env = %request.env,
            "Running backend plugin: {}",
            program
        );

        let output = Command::new(&self.program)
            .arg(request.app.as_str())
            .arg(request.env.as_str())
            .arg(request.version)
            .envs(&env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| BackendError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            tracing::debug!(backend = %self.kind, "{}", line);
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(BackendError::Exited {
                program,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
