use super::RouteDeclaration;
use crate::controller::{DeclaredModelRoutes, EchoController};
use crate::model::{ModelDefinition, StaticModelCatalog};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Startup declaration of models, their custom routes and manifest
/// controllers, loaded from YAML or JSON.
///
/// ```yaml
/// models:
///   - name: Users
///     fields:
///       - { name: id, type: ID }
///       - { name: username, type: Text }
///     routes:
///       - { method: GET, path: /Users/me, apiClass: UsersAPIController, apiMethod: me }
/// controllers:
///   - class: Gravitycar\Api\HealthAPIController
///     routes:
///       - { method: GET, path: /health, apiMethod: check }
/// records:
///   Users:
///     - { username: ada }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteManifest {
    pub models: Vec<ManifestModel>,
    pub controllers: Vec<ManifestController>,
    /// Seed rows per model for the in-memory repository.
    pub records: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestModel {
    #[serde(flatten)]
    pub definition: ModelDefinition,
    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestController {
    /// Fully qualified class name.
    pub class: String,
    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,
}

impl RouteManifest {
    /// Parse a manifest file; `.yaml`/`.yml` as YAML, anything else as JSON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading route manifest {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let manifest = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("parsing YAML manifest {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON manifest {}", path.display()))?
        };
        Ok(manifest)
    }

    #[must_use]
    pub fn catalog(&self) -> StaticModelCatalog {
        StaticModelCatalog::new(self.models.iter().map(|m| m.definition.clone()))
    }

    /// Models that declare custom routes.
    #[must_use]
    pub fn model_route_sources(&self) -> Vec<DeclaredModelRoutes> {
        self.models
            .iter()
            .filter(|m| !m.routes.is_empty())
            .map(|m| DeclaredModelRoutes {
                model: m.definition.name.clone(),
                routes: m.routes.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn echo_controllers(&self) -> Vec<EchoController> {
        self.controllers
            .iter()
            .map(|c| EchoController::new(c.class.clone(), c.routes.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ApiController;
    use std::io::Write;

    const YAML: &str = r#"
models:
  - name: Users
    fields:
      - { name: id, type: ID }
      - { name: username, type: Text }
    searchableFields: [username]
    routes:
      - { method: GET, path: /Users/me, apiClass: UsersAPIController, apiMethod: me, parameterNames: ["", ""] }
  - name: Books
    fields:
      - { name: title, type: TextField }
controllers:
  - class: Gravitycar\Api\HealthAPIController
    routes:
      - { method: GET, path: /health, apiMethod: check }
records:
  Books:
    - { title: Dune }
"#;

    #[test]
    fn test_load_yaml_manifest() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let manifest = RouteManifest::load(file.path()).unwrap();
        assert_eq!(manifest.models.len(), 2);
        assert_eq!(manifest.catalog().len(), 2);
        assert_eq!(manifest.model_route_sources().len(), 1);
        assert_eq!(manifest.records["Books"].len(), 1);

        let controllers = manifest.echo_controllers();
        assert_eq!(controllers[0].register_routes()[0].api_class, "Gravitycar\\Api\\HealthAPIController");
    }

    #[test]
    fn test_load_json_manifest_and_errors() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"models": [{"name": "Tags"}]}"#).unwrap();
        let manifest = RouteManifest::load(file.path()).unwrap();
        assert_eq!(manifest.models[0].definition.name, "Tags");
        assert!(manifest.controllers.is_empty());

        assert!(RouteManifest::load(Path::new("/definitely/not/here.yaml")).is_err());
    }
}
