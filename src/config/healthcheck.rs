// ABOUTME: HTTP health check configuration.
// ABOUTME: Parsed from the resolved `health_check` section with sensible defaults.

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use super::value::{Mapping, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthCheckConfig {
    pub endpoint: String,

    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

#[derive(Debug, Error)]
pub enum HealthConfigError {
    #[error("invalid health_check section: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("health_check retries must be at least 1")]
    ZeroRetries,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_retries() -> u32 {
    3
}

fn default_expected_status() -> u16 {
    200
}

impl HealthCheckConfig {
    /// Build a health check from its config section.
    ///
    /// Null fields count as absent. Returns `Ok(None)` when no `endpoint` is
    /// given: there is nothing to probe.
    pub fn from_section(section: &Mapping) -> Result<Option<Self>, HealthConfigError> {
        let present: Mapping = section
            .iter()
            .filter(|(_, value)| **value != Value::Null)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if !present.contains_key("endpoint") {
            return Ok(None);
        }

        let json = serde_json::to_value(&present)?;
        let config: HealthCheckConfig = serde_json::from_value(json)?;

        if config.retries == 0 {
            return Err(HealthConfigError::ZeroRetries);
        }

        Ok(Some(config))
    }

    /// Config for `endpoint` with every other field defaulted.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: default_timeout(),
            interval: default_interval(),
            retries: default_retries(),
            expected_status: default_expected_status(),
        }
    }
}

/// Durations are integer seconds or humantime strings ("500ms", "10s").
#[derive(Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Seconds(u64),
    Human(#[serde(with = "humantime_serde")] Duration),
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match DurationValue::deserialize(deserializer)? {
        DurationValue::Seconds(secs) => Ok(Duration::from_secs(secs)),
        DurationValue::Human(duration) => Ok(duration),
    }
}
