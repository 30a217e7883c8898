#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a fresh temp file ending in `.{ext}`.
    pub fn create_temp_file(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("gravitycar_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_file(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_file(content, "json")
    }
}

pub mod fixtures {
    use gravitycar::cli::bootstrap;
    use gravitycar::request::params::RawParams;
    use gravitycar::route::RouteManifest;
    use gravitycar::router::Router;
    use gravitycar::runtime_config::RuntimeConfig;
    use serde_json::Value;

    /// Users with custom routes, Books served only by the CRUD wildcards,
    /// a health controller and a few seeded rows.
    pub const MANIFEST: &str = r#"
models:
  - name: Users
    fields:
      - { name: id, type: ID }
      - { name: username, type: Text }
      - { name: email, type: Email }
      - { name: password, type: Password }
      - { name: role, type: Enum, options: { admin: Administrator, user: User } }
      - { name: created_at, type: DateTime }
    searchableFields: [username, email]
    routes:
      - { method: GET, path: /Users/me, apiClass: UsersAPIController, apiMethod: me }
  - name: Books
    fields:
      - { name: id, type: ID }
      - { name: title, type: Text }
      - { name: pages, type: Integer }
      - { name: rating, type: Float }
      - { name: published, type: Boolean }
      - { name: summary, type: BigText }
    searchableFields: [title]
controllers:
  - class: Gravitycar\Models\Users\Api\UsersAPIController
    routes:
      - { method: GET, path: /Users, apiMethod: index }
      - { method: GET, path: /Users/me/profile, apiMethod: me }
      - { method: GET, path: /Users/?, apiMethod: show, parameterNames: [userId] }
      - method: DELETE
        path: /Users/?/sessions
        apiMethod: logout
        parameterNames: [userId]
        allowedRoles: [admin]
  - class: Gravitycar\Api\HealthAPIController
    routes:
      - { method: GET, path: /health, apiMethod: check }
records:
  Books:
    - { title: Dune, pages: 412, rating: 4.5, published: true }
    - { title: Emma, pages: 474, rating: 3.9, published: true }
    - { title: Ubik, pages: 202, rating: 4.1, published: false }
    - { title: Solaris, pages: 204, rating: 4.2, published: true }
"#;

    pub fn manifest() -> RouteManifest {
        serde_yaml::from_str(MANIFEST).unwrap()
    }

    pub fn uncached_config() -> RuntimeConfig {
        RuntimeConfig {
            route_cache_enabled: false,
            ..RuntimeConfig::default()
        }
    }

    pub fn router() -> Router {
        bootstrap(&manifest(), &uncached_config()).unwrap()
    }

    /// JSON object literal into request data.
    pub fn params(value: Value) -> RawParams {
        value.as_object().cloned().unwrap_or_default()
    }
}
