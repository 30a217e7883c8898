use super::path::{is_dynamic_component, parse_path_components};
use http::Method;
use serde::{Deserialize, Serialize};

/// HTTP verbs a route may be registered under.
pub const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

/// Parse and upper-case a verb, accepting only [`SUPPORTED_METHODS`].
#[must_use]
pub fn normalize_method(raw: &str) -> Option<Method> {
    let upper = raw.trim().to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
}

/// Route as declared by a controller or model, before validation.
///
/// Every field defaults to empty so that a missing field is reported by the
/// registry's validation rather than by the deserializer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteDeclaration {
    pub method: String,
    pub path: String,
    pub api_class: String,
    pub api_method: String,
    /// Either one entry per path component (empty string = not captured) or
    /// one entry per dynamic component.
    pub parameter_names: Vec<String>,
    /// Roles allowed to call the route; empty or `*` means public.
    pub allowed_roles: Vec<String>,
    /// Explicit permission action, overriding the verb-derived one.
    pub rbac_action: Option<String>,
}

impl RouteDeclaration {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        api_class: impl Into<String>,
        api_method: impl Into<String>,
        parameter_names: &[&str],
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            api_class: api_class.into(),
            api_method: api_method.into(),
            parameter_names: parameter_names.iter().map(|s| s.to_string()).collect(),
            allowed_roles: Vec::new(),
            rbac_action: None,
        }
    }

    #[must_use]
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.allowed_roles = roles.iter().map(|s| s.to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_rbac_action(mut self, action: impl Into<String>) -> Self {
        self.rbac_action = Some(action.into());
        self
    }
}

/// Validated, immutable route held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    /// Upper-case verb.
    pub method: String,
    pub path: String,
    /// Class reference exactly as declared.
    pub api_class: String,
    pub api_method: String,
    /// Positional: exactly one entry per path component.
    pub parameter_names: Vec<String>,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    #[serde(default)]
    pub rbac_action: Option<String>,
    pub path_components: Vec<String>,
    pub path_length: usize,
    /// Fully qualified controller name after resolution.
    pub resolved_api_class: String,
}

impl RouteRecord {
    /// Build a record from an already validated declaration.
    ///
    /// Compact parameter names (one per dynamic component) are spread over
    /// the dynamic positions so the stored form is always positional.
    pub(crate) fn from_declaration(decl: &RouteDeclaration, method: &Method, resolved: String) -> Self {
        let path_components = parse_path_components(&decl.path);
        let parameter_names = positional_parameter_names(&path_components, &decl.parameter_names);
        Self {
            method: method.as_str().to_string(),
            path: decl.path.clone(),
            api_class: decl.api_class.clone(),
            api_method: decl.api_method.clone(),
            parameter_names,
            allowed_roles: decl.allowed_roles.clone(),
            rbac_action: decl.rbac_action.clone(),
            path_length: path_components.len(),
            path_components,
            resolved_api_class: resolved,
        }
    }

    /// `"GET /Users/?"`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Routes with no roles or a `*` role need no authentication.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.allowed_roles.is_empty() || self.allowed_roles.iter().any(|r| r == "*")
    }

    /// Whether the component at `index` is a wildcard/brace segment.
    #[must_use]
    pub fn is_dynamic_at(&self, index: usize) -> bool {
        self.path_components
            .get(index)
            .is_some_and(|c| is_dynamic_component(c))
    }

    /// Captured parameter names, in path order.
    pub fn captured_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameter_names
            .iter()
            .filter(|n| !n.is_empty())
            .map(String::as_str)
    }

    /// Short (unqualified) name of the resolved controller class.
    #[must_use]
    pub fn short_class_name(&self) -> &str {
        short_class_name(&self.resolved_api_class)
    }
}

/// Last `\`-separated segment of a class reference.
#[must_use]
pub fn short_class_name(class: &str) -> &str {
    class.rsplit('\\').next().unwrap_or(class)
}

fn positional_parameter_names(components: &[String], declared: &[String]) -> Vec<String> {
    if declared.len() == components.len() {
        return declared.to_vec();
    }
    let mut compact = declared.iter();
    components
        .iter()
        .map(|c| {
            if is_dynamic_component(c) {
                compact.next().cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_method() {
        assert_eq!(normalize_method("get"), Some(Method::GET));
        assert_eq!(normalize_method(" Patch "), Some(Method::PATCH));
        assert_eq!(normalize_method("OPTIONS"), None);
        assert_eq!(normalize_method("FETCH"), None);
    }

    #[test]
    fn test_compact_parameter_names_are_spread() {
        let decl = RouteDeclaration::new("GET", "/Users/?", "UsersApi", "get", &["userId"]);
        let record = RouteRecord::from_declaration(&decl, &Method::GET, "App\\UsersApi".into());
        assert_eq!(record.parameter_names, vec!["".to_string(), "userId".to_string()]);
        assert_eq!(record.path_length, 2);
        assert_eq!(record.captured_parameter_names().collect::<Vec<_>>(), vec!["userId"]);
    }

    #[test]
    fn test_positional_parameter_names_kept() {
        let decl = RouteDeclaration::new(
            "PUT",
            "/?/?/restore",
            "Crud",
            "restore",
            &["modelName", "id", ""],
        );
        let record = RouteRecord::from_declaration(&decl, &Method::PUT, "Crud".into());
        assert_eq!(record.parameter_names, vec!["modelName", "id", ""]);
        assert!(record.is_dynamic_at(1));
        assert!(!record.is_dynamic_at(2));
    }

    #[test]
    fn test_public_routes() {
        let decl = RouteDeclaration::new("GET", "/health", "Health", "check", &[]);
        let record = RouteRecord::from_declaration(&decl, &Method::GET, "Health".into());
        assert!(record.is_public());

        let decl = decl.with_roles(&["admin"]);
        let record = RouteRecord::from_declaration(&decl, &Method::GET, "Health".into());
        assert!(!record.is_public());

        let decl = RouteDeclaration::new("GET", "/x", "A", "b", &[]).with_roles(&["admin", "*"]);
        let record = RouteRecord::from_declaration(&decl, &Method::GET, "A".into());
        assert!(record.is_public());
    }

    #[test]
    fn test_short_class_name() {
        assert_eq!(short_class_name("Gravitycar\\Api\\HealthAPIController"), "HealthAPIController");
        assert_eq!(short_class_name("Plain"), "Plain");
    }
}
