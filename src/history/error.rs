// ABOUTME: Persistence error types with SNAFU pattern.
// ABOUTME: Every variant carries the path involved so failures are actionable.

use snafu::Snafu;
use std::path::PathBuf;

/// Failure to persist or scan deployment history.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HistoryError {
    #[snafu(display("failed to create history directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to serialize deployment record: {source}"))]
    Serialize { source: serde_json::Error },

    #[snafu(display("history record {} already exists", path.display()))]
    AlreadyRecorded { path: PathBuf },

    #[snafu(display("failed to write history record {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to scan history directory {}: {source}", path.display()))]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },
}
