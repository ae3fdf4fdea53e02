// ABOUTME: Deployment descriptor loading, environment resolution and typed field access.
// ABOUTME: All "missing or wrong-typed field" decisions for descriptors are made here.

mod environments;
mod healthcheck;
mod resolve;
mod value;

pub use environments::{EnvironmentCatalog, EnvironmentInfo, ENVIRONMENTS_FILENAME};
pub use healthcheck::{HealthCheckConfig, HealthConfigError};
pub use resolve::{ENVIRONMENTS_KEY, ResolveError, resolve};
pub use value::{Mapping, Value, ValueKind};

use crate::diagnostics::Diagnostics;
use crate::hooks::{HookConfigError, PreDeployHook};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory of the config dir holding per-app descriptors.
pub const APPS_DIR: &str = "apps";

/// Descriptor extensions, in lookup order.
pub const DESCRIPTOR_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Errors from reading a descriptor file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{0} does not contain a mapping at the top level")]
    NotAMapping(PathBuf),
}

/// A field present with the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{key}` must be a {expected}, found {found}")]
pub struct FieldError {
    pub key: String,
    pub expected: ValueKind,
    pub found: ValueKind,
}

/// Any problem with the deployment configuration itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Hook(#[from] HookConfigError),

    #[error(transparent)]
    HealthCheck(#[from] HealthConfigError),
}

/// Find the conventional descriptor for `app` under `config_dir`.
pub fn locate_descriptor(config_dir: &Path, app: &str) -> Option<PathBuf> {
    let apps = config_dir.join(APPS_DIR);
    DESCRIPTOR_EXTENSIONS
        .iter()
        .map(|ext| apps.join(format!("{app}.{ext}")))
        .find(|path| path.is_file())
}

/// Load a YAML or JSON descriptor. The top level must be a mapping.
pub async fn load_descriptor(path: &Path) -> Result<Mapping, LoadError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(LoadError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let value: Value = serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(LoadError::NotAMapping(path.to_path_buf())),
    }
}

/// The flattened configuration for one (app, environment) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig(Mapping);

impl ResolvedConfig {
    /// Resolve `env` from a loaded descriptor.
    pub fn resolve(env: &str, descriptor: &Mapping) -> Result<Self, ResolveError> {
        resolve(env, descriptor).map(Self)
    }

    pub fn from_mapping(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn snapshot(&self) -> &Mapping {
        &self.0
    }

    pub fn into_mapping(self) -> Mapping {
        self.0
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: ValueKind,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, FieldError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => extract(value).map(Some).ok_or_else(|| FieldError {
                key: key.to_string(),
                expected,
                found: value.kind(),
            }),
        }
    }

    pub fn string(&self, key: &str) -> Result<Option<&str>, FieldError> {
        self.typed(key, ValueKind::String, Value::as_str)
    }

    pub fn integer(&self, key: &str) -> Result<Option<i64>, FieldError> {
        self.typed(key, ValueKind::Integer, Value::as_i64)
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>, FieldError> {
        self.typed(key, ValueKind::Bool, Value::as_bool)
    }

    pub fn mapping(&self, key: &str) -> Result<Option<&Mapping>, FieldError> {
        self.typed(key, ValueKind::Mapping, Value::as_mapping)
    }

    pub fn sequence(&self, key: &str) -> Result<Option<&[Value]>, FieldError> {
        self.typed(key, ValueKind::Sequence, Value::as_sequence)
    }

    /// Raw backend selector. Interpreted by [`crate::backend::BackendKind::for_config`].
    pub fn backend_type(&self) -> Option<&Value> {
        self.0.get("type").filter(|v| !matches!(v, Value::Null))
    }

    /// Parsed `pre_deploy` hooks, empty when the section is absent.
    pub fn pre_deploy_hooks(
        &self,
        diag: &mut Diagnostics,
    ) -> Result<Vec<PreDeployHook>, ConfigError> {
        match self.sequence("pre_deploy")? {
            Some(entries) => Ok(PreDeployHook::parse_all(entries, diag)?),
            None => Ok(Vec::new()),
        }
    }

    /// Parsed `health_check` section. `None` means no verification is configured.
    pub fn health_check(&self) -> Result<Option<HealthCheckConfig>, ConfigError> {
        match self.mapping("health_check")? {
            Some(section) => Ok(HealthCheckConfig::from_section(section)?),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> ResolvedConfig {
        ResolvedConfig::from_mapping(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn typed_accessors() {
        let config = config(
            r#"
path: ./app
port: 8080
auto_approve: true
build:
  dockerfile: Dockerfile
"#,
        );

        assert_eq!(config.string("path").unwrap(), Some("./app"));
        assert_eq!(config.integer("port").unwrap(), Some(8080));
        assert_eq!(config.boolean("auto_approve").unwrap(), Some(true));
        assert!(config.mapping("build").unwrap().is_some());
        assert_eq!(config.string("namespace").unwrap(), None);
    }

    #[test]
    fn wrong_type_is_field_error() {
        let config = config("port: \"8080\"\n");
        let err = config.integer("port").unwrap_err();
        assert_eq!(err.key, "port");
        assert_eq!(err.expected, ValueKind::Integer);
        assert_eq!(err.found, ValueKind::String);
    }

    #[test]
    fn null_reads_as_absent() {
        let config = config("namespace: ~\ntype: ~\n");
        assert_eq!(config.string("namespace").unwrap(), None);
        assert!(config.backend_type().is_none());
    }

    #[test]
    fn pre_deploy_must_be_a_sequence() {
        let config = config("pre_deploy: file_check\n");
        let mut diag = Diagnostics::default();
        assert!(matches!(
            config.pre_deploy_hooks(&mut diag),
            Err(ConfigError::Field(_))
        ));
    }

    #[test]
    fn absent_health_check_is_none() {
        assert!(config("type: docker\n").health_check().unwrap().is_none());
    }
}
