// ABOUTME: Application-wide error type for the deployctl binary surface.
// ABOUTME: Maps every failure to an exit code: 1 failed deployment, 2 usage or config.

use thiserror::Error;

use crate::config::LoadError;
use crate::deploy::{DeployError, RollbackError};
use crate::history::HistoryError;
use crate::types::NameError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Rollback(#[from] RollbackError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error(transparent)]
    Config(#[from] LoadError),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit status for a deployment that was attempted and failed.
pub const EXIT_FAILED: i32 = 1;

/// Exit status for bad invocation or configuration.
pub const EXIT_USAGE: i32 = 2;

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Deploy(e) => deploy_exit_code(e),
            Error::Rollback(RollbackError::Deploy(e)) => deploy_exit_code(e),
            Error::Rollback(_) | Error::History(_) | Error::Io(_) => EXIT_FAILED,
            Error::Config(_) | Error::Name(_) | Error::InvalidArgument(_) => EXIT_USAGE,
        }
    }
}

fn deploy_exit_code(e: &DeployError) -> i32 {
    if e.is_config_error() {
        EXIT_USAGE
    } else {
        EXIT_FAILED
    }
}

pub type Result<T> = std::result::Result<T, Error>;
