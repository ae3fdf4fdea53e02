// ABOUTME: Immutable record of one deployment attempt.
// ABOUTME: Persisted as JSON; the timestamp is fixed-width so keys sort chronologically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Mapping;
use crate::types::{AppName, EnvName};

/// Fixed-width, zero-padded ISO-8601 UTC with microsecond resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Final outcome of a deployment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Success,
    Failed,
}

impl DeployStatus {
    pub fn is_success(self) -> bool {
        self == DeployStatus::Success
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStatus::Success => f.write_str("success"),
            DeployStatus::Failed => f.write_str("failed"),
        }
    }
}

/// One deployment attempt for an (app, environment) pair.
///
/// Created once the outcome is known and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    app: AppName,
    env: EnvName,
    version: String,
    #[serde(with = "timestamp")]
    timestamp: DateTime<Utc>,
    status: DeployStatus,
    #[serde(default)]
    config: Mapping,
}

impl DeploymentRecord {
    /// Record an attempt that finished now.
    pub fn new(
        app: AppName,
        env: EnvName,
        version: impl Into<String>,
        status: DeployStatus,
        config: Mapping,
    ) -> Self {
        Self::at(Utc::now(), app, env, version, status, config)
    }

    /// Record an attempt with an explicit timestamp.
    pub fn at(
        timestamp: DateTime<Utc>,
        app: AppName,
        env: EnvName,
        version: impl Into<String>,
        status: DeployStatus,
        config: Mapping,
    ) -> Self {
        Self {
            app,
            env,
            version: version.into(),
            timestamp,
            status,
            config,
        }
    }

    pub fn app(&self) -> &AppName {
        &self.app
    }

    pub fn env(&self) -> &EnvName {
        &self.env
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn status(&self) -> DeployStatus {
        self.status
    }

    pub fn config(&self) -> &Mapping {
        &self.config
    }

    /// Formatted timestamp, as stored.
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Storage key: `{app}_{env}_{timestamp}`.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.app, self.env, self.timestamp_str())
    }
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    // Accepts any RFC 3339 timestamp so records written at lower resolution still load.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(timestamp: DateTime<Utc>) -> DeploymentRecord {
        DeploymentRecord::at(
            timestamp,
            AppName::new("svc").unwrap(),
            EnvName::new("prod").unwrap(),
            "v1",
            DeployStatus::Success,
            Mapping::new(),
        )
    }

    #[test]
    fn key_uses_fixed_width_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let record = record_at(ts);

        assert_eq!(record.timestamp_str(), "2024-03-05T07:08:09.000000Z");
        assert_eq!(record.key(), "svc_prod_2024-03-05T07:08:09.000000Z");
    }

    #[test]
    fn serializes_persisted_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(record_at(ts)).unwrap();

        assert_eq!(json["app"], "svc");
        assert_eq!(json["env"], "prod");
        assert_eq!(json["version"], "v1");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00.000000Z");
        assert_eq!(json["status"], "success");
        assert!(json["config"].is_object());
    }

    #[test]
    fn reads_second_resolution_timestamps() {
        let json = r#"{
            "app": "svc",
            "env": "prod",
            "version": "v0",
            "timestamp": "2023-12-31T23:59:59Z",
            "status": "failed",
            "config": {"type": "docker"}
        }"#;

        let record: DeploymentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status(), DeployStatus::Failed);
        assert_eq!(
            record.timestamp(),
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn status_display_matches_wire_format() {
        assert_eq!(DeployStatus::Success.to_string(), "success");
        assert_eq!(DeployStatus::Failed.to_string(), "failed");
        assert!(DeployStatus::Success.is_success());
    }
}
