// ABOUTME: Bounded-retry health verification of a deployed endpoint.
// ABOUTME: Attempts run strictly one after another with a fixed sleep between them.

use std::sync::Arc;

use super::probe::Probe;
use crate::config::HealthCheckConfig;

/// Verifies an endpoint reports the expected status within a fixed number of attempts.
pub struct HealthVerifier {
    config: HealthCheckConfig,
    probe: Arc<dyn Probe>,
}

impl HealthVerifier {
    pub fn new(config: HealthCheckConfig, probe: Arc<dyn Probe>) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Run the check. Never errors: transport failures, timeouts and status
    /// mismatches all count as a failed attempt.
    ///
    /// Worst case duration is `retries * timeout + (retries - 1) * interval`.
    pub async fn check(&self) -> bool {
        let HealthCheckConfig {
            endpoint,
            timeout,
            interval,
            retries,
            expected_status,
        } = &self.config;

        for attempt in 1..=*retries {
            match tokio::time::timeout(*timeout, self.probe.get(endpoint)).await {
                Ok(Ok(status)) if status == *expected_status => {
                    tracing::info!(endpoint = %endpoint, attempt, "health check passed");
                    return true;
                }
                Ok(Ok(status)) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        attempt,
                        "health check returned {} (expected {})",
                        status,
                        expected_status
                    );
                }
                Ok(Err(e)) => {
                    tracing::debug!(endpoint = %endpoint, attempt, "health probe failed: {}", e);
                }
                Err(_elapsed) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        attempt,
                        "health probe timed out after {:?}",
                        timeout
                    );
                }
            }

            if attempt < *retries {
                tokio::time::sleep(*interval).await;
            }
        }

        tracing::warn!(
            endpoint = %endpoint,
            "health check failed after {} attempt(s)",
            retries
        );
        false
    }
}
