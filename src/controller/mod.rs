//! # Controller Module
//!
//! Controllers are the targets routes dispatch to. Instead of instantiating
//! classes by name at runtime, every controller is registered up front in a
//! [`ControllerTable`] under its fully qualified class name. The registry
//! resolves route `apiClass` references against that table, and the router
//! dispatches through [`ApiController::invoke`].
//!
//! - [`ModelBaseApiController`] serves generic CRUD for every model through
//!   wildcard routes (`/?`, `/?/?`, ...).
//! - [`EchoController`] backs controllers declared in a route manifest and
//!   answers with the route and bound parameters.
//!
//! Models may contribute routes of their own through [`ModelRouteSource`].

mod echo;
mod model_base;

pub use echo::EchoController;
pub use model_base::{ModelBaseApiController, MODEL_BASE_CONTROLLER};

use crate::error::ApiError;
use crate::request::Request;
use crate::route::{short_class_name, RouteDeclaration};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A dispatch target.
pub trait ApiController: Send + Sync {
    /// Fully qualified class name, e.g. `Gravitycar\Api\HealthAPIController`.
    fn class_name(&self) -> &str;

    /// Routes this controller serves.
    fn register_routes(&self) -> Vec<RouteDeclaration>;

    /// Whether `method` can be invoked.
    fn has_method(&self, method: &str) -> bool;

    /// Run `method` for a routed request.
    fn invoke(&self, method: &str, request: &Request) -> Result<Value, ApiError>;
}

/// A model contributing custom routes beyond the generic CRUD wildcards.
pub trait ModelRouteSource: Send + Sync {
    fn model_name(&self) -> &str;

    fn register_routes(&self) -> Vec<RouteDeclaration>;
}

/// Custom routes declared for a model in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredModelRoutes {
    pub model: String,
    pub routes: Vec<RouteDeclaration>,
}

impl ModelRouteSource for DeclaredModelRoutes {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn register_routes(&self) -> Vec<RouteDeclaration> {
        self.routes.clone()
    }
}

/// Controllers keyed by fully qualified class name, in registration order.
#[derive(Clone, Default)]
pub struct ControllerTable {
    controllers: BTreeMap<String, Arc<dyn ApiController>>,
    order: Vec<String>,
}

impl ControllerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller. An existing controller with the same class
    /// name is replaced in place.
    pub fn register(&mut self, controller: Arc<dyn ApiController>) {
        let class = controller.class_name().to_string();
        if self.controllers.insert(class.clone(), controller).is_some() {
            warn!(class = %class, "Controller replaced");
        } else {
            debug!(class = %class, "Controller registered");
            self.order.push(class);
        }
    }

    #[must_use]
    pub fn get(&self, class: &str) -> Option<&Arc<dyn ApiController>> {
        self.controllers.get(class)
    }

    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.controllers.contains_key(class)
    }

    /// First registered controller whose short class name is `short`.
    #[must_use]
    pub fn find_by_short_name(&self, short: &str) -> Option<&str> {
        self.order
            .iter()
            .find(|class| short_class_name(class) == short)
            .map(String::as_str)
    }

    /// Controllers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ApiController>> {
        self.order.iter().filter_map(|c| self.controllers.get(c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for ControllerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerTable")
            .field("controllers", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keeps_registration_order_and_short_names() {
        let mut table = ControllerTable::new();
        table.register(Arc::new(EchoController::new("App\\Api\\ZetaController", vec![])));
        table.register(Arc::new(EchoController::new("App\\Api\\AlphaController", vec![])));
        table.register(Arc::new(EchoController::new("App\\Api\\ZetaController", vec![])));

        assert_eq!(table.len(), 2);
        let names: Vec<&str> = table.iter().map(|c| c.class_name()).collect();
        assert_eq!(names, vec!["App\\Api\\ZetaController", "App\\Api\\AlphaController"]);
        assert_eq!(table.find_by_short_name("AlphaController"), Some("App\\Api\\AlphaController"));
        assert_eq!(table.find_by_short_name("Missing"), None);
    }
}
