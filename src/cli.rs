// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and the global settings flags.

use clap::{Args, Parser, Subcommand};
use deployctl::output::OutputMode;
use deployctl::settings::{DEFAULT_CONFIG_DIR, DEFAULT_PLUGIN_PREFIX, Settings, default_history_dir};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deployctl")]
#[command(about = "Deploy applications through pluggable backends with health checks and history-driven rollback")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Directory holding apps/<app>.yaml descriptors and environments.yaml
    #[arg(long, global = true, env = "DEPLOYCTL_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Directory for deployment history records [default: ~/.deployctl/history]
    #[arg(long, global = true, env = "DEPLOYCTL_HISTORY_DIR")]
    pub history_dir: Option<PathBuf>,

    /// Prefix of backend plugin programs (e.g. deployctl-docker)
    #[arg(long, global = true, env = "DEPLOYCTL_PLUGIN_PREFIX", default_value = DEFAULT_PLUGIN_PREFIX)]
    pub plugin_prefix: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    pub fn settings(&self) -> Settings {
        Settings::default()
            .config_dir(&self.config_dir)
            .history_dir(self.history_dir.clone().unwrap_or_else(default_history_dir))
            .plugin_prefix(&self.plugin_prefix)
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a version of an application to an environment
    Deploy {
        /// Application name
        app: String,

        /// Target environment
        env: String,

        /// Version to deploy
        version: String,

        /// Descriptor path (default: <config-dir>/apps/<app>.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Backend option passed to the plugin as DEPLOYCTL_OPT_<KEY>
        #[arg(short, long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, String)>,
    },

    /// Roll back to the last successfully deployed version
    Rollback {
        /// Application name
        app: String,

        /// Target environment
        env: String,

        /// Deploy this version instead of choosing one from history
        #[arg(long)]
        version: Option<String>,
    },

    /// Show the most recent deployment of an application in an environment
    Status {
        /// Application name
        app: String,

        /// Target environment
        env: String,
    },

    /// List recorded deployments, newest first
    History {
        /// Application name
        app: String,

        /// Only show this environment
        #[arg(short, long)]
        env: Option<String>,

        /// Maximum number of records (0 for all)
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// List known environments
    Envs,
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
