// ABOUTME: Tool settings: where descriptors, history and backend plugins live.
// ABOUTME: Built once by the binary from flags and environment, then injected.

use std::path::PathBuf;

use crate::history::DEFAULT_HISTORY_DIR;

/// Default descriptor directory, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default prefix for backend plugin programs.
pub const DEFAULT_PLUGIN_PREFIX: &str = "deployctl-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub history_dir: PathBuf,
    pub plugin_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            history_dir: default_history_dir(),
            plugin_prefix: DEFAULT_PLUGIN_PREFIX.to_string(),
        }
    }
}

impl Settings {
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    pub fn history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    pub fn plugin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.plugin_prefix = prefix.into();
        self
    }
}

/// `~/.deployctl/history`, or relative to the working directory when there
/// is no home directory.
pub fn default_history_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DEFAULT_HISTORY_DIR),
        None => PathBuf::from(DEFAULT_HISTORY_DIR),
    }
}
