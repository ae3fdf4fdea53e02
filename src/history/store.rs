// ABOUTME: Storage abstraction for deployment history.
// ABOUTME: Append-only writes and newest-first queries per (app, environment).

use async_trait::async_trait;
use std::path::PathBuf;

use super::{DeploymentRecord, HistoryError};
use crate::types::{AppName, EnvName};

/// Append-only persistence of deployment attempts.
///
/// The ordered history is the only source of truth for the current version
/// and for rollback candidates. Implementations must report every failed
/// write rather than dropping the record.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Durably write `record`, returning where it was stored.
    async fn append(&self, record: &DeploymentRecord) -> Result<PathBuf, HistoryError>;

    /// Records for `app` (optionally one environment), newest first.
    ///
    /// `limit == 0` means no limit. Entries that cannot be decoded are skipped.
    async fn query(
        &self,
        app: &AppName,
        env: Option<&EnvName>,
        limit: usize,
    ) -> Result<Vec<DeploymentRecord>, HistoryError>;

    /// Most recent record for (app, env), if any.
    async fn latest(
        &self,
        app: &AppName,
        env: &EnvName,
    ) -> Result<Option<DeploymentRecord>, HistoryError> {
        Ok(self.query(app, Some(env), 1).await?.into_iter().next())
    }
}

/// Sort newest first and apply `limit`.
///
/// The sort is stable, so records with identical timestamps keep the order
/// they were scanned in.
pub(crate) fn newest_first(mut records: Vec<DeploymentRecord>, limit: usize) -> Vec<DeploymentRecord> {
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    if limit > 0 {
        records.truncate(limit);
    }
    records
}
