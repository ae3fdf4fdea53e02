// ABOUTME: Non-fatal pre-deploy warnings, tied to the hook that raised them.
// ABOUTME: Logged as they happen and handed back with the deployment outcome.

use std::fmt;
use std::path::PathBuf;

/// A `pre_deploy` problem that does not stop the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Entry `index` names a hook type this tool does not run.
    UnknownHook { index: usize, hook_type: String },
    /// A `directory_check` could not create `path`.
    DirectoryNotCreated { path: PathBuf, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownHook { index, hook_type } => write!(
                f,
                "skipping pre_deploy entry {index}: unknown hook type '{hook_type}'"
            ),
            Warning::DirectoryNotCreated { path, reason } => write!(
                f,
                "directory_check could not create {}: {reason}",
                path.display()
            ),
        }
    }
}

/// Warnings gathered while preparing one deployment, in the order raised.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn warn(&mut self, warning: Warning) {
        match &warning {
            Warning::UnknownHook { index, .. } => tracing::warn!(entry = *index, "{warning}"),
            Warning::DirectoryNotCreated { path, .. } => {
                tracing::warn!(path = %path.display(), "{warning}")
            }
        }
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::UnknownHook {
            index: 2,
            hook_type: "port_check".to_string(),
        });
        diag.warn(Warning::DirectoryNotCreated {
            path: PathBuf::from("/proc/logs"),
            reason: "permission denied".to_string(),
        });

        let warnings = diag.into_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], Warning::UnknownHook { index: 2, .. }));
        assert!(matches!(warnings[1], Warning::DirectoryNotCreated { .. }));
    }

    #[test]
    fn messages_name_the_entry() {
        let unknown = Warning::UnknownHook {
            index: 1,
            hook_type: "notify_slack".to_string(),
        };
        assert_eq!(
            unknown.to_string(),
            "skipping pre_deploy entry 1: unknown hook type 'notify_slack'"
        );

        let dir = Warning::DirectoryNotCreated {
            path: PathBuf::from("data"),
            reason: "read-only file system".to_string(),
        };
        assert_eq!(
            dir.to_string(),
            "directory_check could not create data: read-only file system"
        );
    }
}
