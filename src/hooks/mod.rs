// ABOUTME: Pre-deploy hooks declared in the deployment descriptor.
// ABOUTME: Precondition checks that gate a deployment and path setup that never fails.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Value;
use crate::diagnostics::{Diagnostics, Warning};

/// A single pre-deploy hook, evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreDeployHook {
    /// Fails the deployment if `path` does not exist.
    FileCheck { path: PathBuf },
    /// Creates `path` (and parents) if missing. Never fails.
    DirectoryCheck { path: PathBuf },
}

/// Malformed `pre_deploy` entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookConfigError {
    #[error("pre_deploy entry {index} is not a mapping")]
    NotAMapping { index: usize },

    #[error("pre_deploy entry {index} has no string `type`")]
    MissingType { index: usize },

    #[error("pre_deploy entry {index} ({hook_type}) has no string `path`")]
    MissingPath { index: usize, hook_type: String },
}

/// A precondition hook that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} not found", .path.display())]
pub struct HookFailure {
    pub path: PathBuf,
}

impl PreDeployHook {
    pub fn type_name(&self) -> &'static str {
        match self {
            PreDeployHook::FileCheck { .. } => "file_check",
            PreDeployHook::DirectoryCheck { .. } => "directory_check",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PreDeployHook::FileCheck { path } | PreDeployHook::DirectoryCheck { path } => path,
        }
    }

    /// Parse the entries of a `pre_deploy` sequence.
    ///
    /// Unknown hook types are skipped with a warning so descriptors shared with
    /// other tooling still load.
    pub fn parse_all(
        entries: &[Value],
        diag: &mut Diagnostics,
    ) -> Result<Vec<PreDeployHook>, HookConfigError> {
        let mut hooks = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let fields = entry
                .as_mapping()
                .ok_or(HookConfigError::NotAMapping { index })?;

            let hook_type = fields
                .get("type")
                .and_then(Value::as_str)
                .ok_or(HookConfigError::MissingType { index })?;

            let path = || {
                fields
                    .get("path")
                    .and_then(Value::as_str)
                    .map(PathBuf::from)
                    .ok_or_else(|| HookConfigError::MissingPath {
                        index,
                        hook_type: hook_type.to_string(),
                    })
            };

            match hook_type {
                "file_check" => hooks.push(PreDeployHook::FileCheck { path: path()? }),
                "directory_check" => hooks.push(PreDeployHook::DirectoryCheck { path: path()? }),
                other => diag.warn(Warning::UnknownHook {
                    index,
                    hook_type: other.to_string(),
                }),
            }
        }

        Ok(hooks)
    }

    /// Run this hook.
    pub async fn run(&self, diag: &mut Diagnostics) -> Result<(), HookFailure> {
        match self {
            PreDeployHook::FileCheck { path } => {
                if tokio::fs::try_exists(path).await.unwrap_or(false) {
                    tracing::debug!("file_check passed: {}", path.display());
                    Ok(())
                } else {
                    Err(HookFailure { path: path.clone() })
                }
            }
            PreDeployHook::DirectoryCheck { path } => {
                if let Err(e) = tokio::fs::create_dir_all(path).await {
                    diag.warn(Warning::DirectoryNotCreated {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                } else {
                    tracing::debug!("directory_check ensured: {}", path.display());
                }
                Ok(())
            }
        }
    }
}

/// Run hooks in order, stopping at the first failure.
///
/// Side effects of hooks that already ran are not undone.
pub async fn run_pre_deploy(
    hooks: &[PreDeployHook],
    diag: &mut Diagnostics,
) -> Result<(), HookFailure> {
    for hook in hooks {
        tracing::info!("Running {} hook: {}", hook.type_name(), hook.path().display());
        hook.run(diag).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(yaml: &str) -> Vec<Value> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn parses_known_hooks_in_order() {
        let mut diag = Diagnostics::default();
        let hooks = PreDeployHook::parse_all(
            &entries(
                r#"
- type: directory_check
  path: logs
- type: file_check
  path: Dockerfile
"#,
            ),
            &mut diag,
        )
        .unwrap();

        assert_eq!(
            hooks,
            vec![
                PreDeployHook::DirectoryCheck {
                    path: PathBuf::from("logs")
                },
                PreDeployHook::FileCheck {
                    path: PathBuf::from("Dockerfile")
                },
            ]
        );
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn unknown_hook_type_skipped_with_warning() {
        let mut diag = Diagnostics::default();
        let hooks = PreDeployHook::parse_all(
            &entries("- type: port_check\n  port: 8080\n"),
            &mut diag,
        )
        .unwrap();

        assert!(hooks.is_empty());
        assert_eq!(
            diag.warnings(),
            [Warning::UnknownHook {
                index: 0,
                hook_type: "port_check".to_string()
            }]
        );
    }

    #[test]
    fn malformed_entries_rejected() {
        let mut diag = Diagnostics::default();

        assert_eq!(
            PreDeployHook::parse_all(&entries("- just-a-string\n"), &mut diag).unwrap_err(),
            HookConfigError::NotAMapping { index: 0 }
        );
        assert_eq!(
            PreDeployHook::parse_all(&entries("- path: x\n"), &mut diag).unwrap_err(),
            HookConfigError::MissingType { index: 0 }
        );
        assert_eq!(
            PreDeployHook::parse_all(&entries("- type: file_check\n"), &mut diag).unwrap_err(),
            HookConfigError::MissingPath {
                index: 0,
                hook_type: "file_check".to_string()
            }
        );
    }
}
