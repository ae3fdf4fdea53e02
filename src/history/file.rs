// ABOUTME: File-backed deployment history.
// ABOUTME: One JSON file per attempt, named `{app}_{env}_{timestamp}.json`.

use async_trait::async_trait;
use snafu::ResultExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::error::{
    AlreadyRecordedSnafu, CreateDirSnafu, ScanSnafu, SerializeSnafu, WriteSnafu,
};
use super::store::newest_first;
use super::{DeploymentRecord, HistoryError, HistoryStore};
use crate::types::{AppName, EnvName};

/// Default history location under the user's home directory.
pub const DEFAULT_HISTORY_DIR: &str = ".deployctl/history";

/// File-backed implementation of [`HistoryStore`].
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .context(CreateDirSnafu { path: dir.clone() })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, record: &DeploymentRecord) -> PathBuf {
        self.dir.join(format!("{}.json", record.key()))
    }

    async fn read_record(path: &Path) -> Option<DeploymentRecord> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("skipping unreadable history file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping malformed history file {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn append(&self, record: &DeploymentRecord) -> Result<PathBuf, HistoryError> {
        let path = self.record_path(record);
        let content = serde_json::to_vec_pretty(record).context(SerializeSnafu)?;

        // create_new makes the write atomic with respect to other writers of the same key.
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return AlreadyRecordedSnafu { path }.fail();
            }
            Err(source) => return Err(HistoryError::Write { path, source }),
        };

        file.write_all(&content)
            .await
            .context(WriteSnafu { path: path.clone() })?;
        file.sync_all()
            .await
            .context(WriteSnafu { path: path.clone() })?;

        tracing::debug!(
            app = %record.app(),
            env = %record.env(),
            status = %record.status(),
            "recorded deployment at {}",
            path.display()
        );

        Ok(path)
    }

    async fn query(
        &self,
        app: &AppName,
        env: Option<&EnvName>,
        limit: usize,
    ) -> Result<Vec<DeploymentRecord>, HistoryError> {
        let prefix = format!("{app}_");

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .context(ScanSnafu { path: self.dir.clone() })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context(ScanSnafu { path: self.dir.clone() })?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }

        // Directory order is arbitrary; fix it so equal timestamps sort stably.
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in &paths {
            if let Some(record) = Self::read_record(path).await
                && record.app() == app
                && env.is_none_or(|env| record.env() == env)
            {
                records.push(record);
            }
        }

        Ok(newest_first(records, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mapping;
    use crate::history::DeployStatus;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("history");

        let store = FileHistoryStore::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn duplicate_key_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::open(tmp.path()).await.unwrap();

        let record = DeploymentRecord::at(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            AppName::new("svc").unwrap(),
            EnvName::new("prod").unwrap(),
            "v1",
            DeployStatus::Success,
            Mapping::new(),
        );

        store.append(&record).await.unwrap();
        let err = store.append(&record).await.unwrap_err();
        assert!(matches!(err, HistoryError::AlreadyRecorded { .. }));
    }
}
