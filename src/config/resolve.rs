// ABOUTME: Environment resolution for deployment descriptors.
// ABOUTME: Flattens the base descriptor with one environment's overrides.

use super::value::{Mapping, Value};
use thiserror::Error;

/// Key holding the per-environment override sections.
pub const ENVIRONMENTS_KEY: &str = "environments";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no environments section found in deployment config")]
    EnvironmentsSectionMissing,

    #[error("environment '{0}' not found in deployment config")]
    EnvironmentNotFound(String),
}

/// Merge `base` with the override section for `env`.
///
/// Every key of `base` except `environments` is copied, then every key of
/// `base.environments[env]` is written over it. Nested mappings are replaced
/// wholesale, never merged recursively.
pub fn resolve(env: &str, base: &Mapping) -> Result<Mapping, ResolveError> {
    let environments = base
        .get(ENVIRONMENTS_KEY)
        .and_then(Value::as_mapping)
        .ok_or(ResolveError::EnvironmentsSectionMissing)?;

    let overrides = environments
        .get(env)
        .and_then(Value::as_mapping)
        .ok_or_else(|| ResolveError::EnvironmentNotFound(env.to_string()))?;

    let mut merged: Mapping = base
        .iter()
        .filter(|(key, _)| key.as_str() != ENVIRONMENTS_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }

    Ok(merged)
}
