// ABOUTME: Catalog of known deployment environments.
// ABOUTME: Read from environments.yaml in the config dir, with dev/staging/prod defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::LoadError;

pub const ENVIRONMENTS_FILENAME: &str = "environments.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCatalog {
    pub environments: BTreeMap<String, EnvironmentInfo>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    environments: BTreeMap<String, EnvironmentInfo>,
}

impl EnvironmentCatalog {
    /// Load the catalog from `config_dir`, falling back to the defaults when
    /// the file does not exist.
    pub async fn load(config_dir: &Path) -> Result<Self, LoadError> {
        let path = config_dir.join(ENVIRONMENTS_FILENAME);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(source) => return Err(LoadError::Read { path, source }),
        };

        let file: CatalogFile =
            serde_yaml::from_str(&content).map_err(|source| LoadError::Parse { path, source })?;

        Ok(Self {
            environments: file.environments,
        })
    }

    pub fn defaults() -> Self {
        let environments = [
            ("dev", "Development environment"),
            ("staging", "Staging environment"),
            ("prod", "Production environment"),
        ]
        .into_iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                EnvironmentInfo {
                    description: Some(description.to_string()),
                },
            )
        })
        .collect();

        Self { environments }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.environments.contains_key(name)
    }
}
