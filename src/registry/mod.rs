//! # Registry Module
//!
//! The route registry discovers route declarations from the registered
//! controllers and model route sources, validates each one, and publishes a
//! [`RouteTable`] indexed by verb and path length.
//!
//! ## Discovery
//!
//! | order | source |
//! |---|---|
//! | 1 | the default CRUD controller (`ModelBaseAPIController`) |
//! | 2 | every other controller, in [`ControllerTable`](crate::controller::ControllerTable) order |
//! | 3 | model route sources |
//!
//! A declaration that fails validation is logged at `warn` and skipped; the
//! rest of the pass continues.
//!
//! ## Class resolution
//!
//! A route's `apiClass` may be fully qualified, a short name under the
//! `<namespace>\Models\<Model>\Api\` convention, or a short name of a
//! controller that already registered routes.
//!
//! ## Cache
//!
//! With caching enabled the table is persisted as JSON
//! (`{routes, groupedRoutes, cached_at}`) and reused on the next start.
//! Invalidation is explicit through [`RouteRegistry::rebuild_cache`] or
//! [`RouteRegistry::clear_cache`].
//!
//! ```rust
//! use gravitycar::controller::{ControllerTable, EchoController};
//! use gravitycar::registry::RouteRegistry;
//! use gravitycar::route::RouteDeclaration;
//! use gravitycar::runtime_config::RuntimeConfig;
//! use std::sync::Arc;
//!
//! let mut controllers = ControllerTable::new();
//! controllers.register(Arc::new(EchoController::new(
//!     "App\\Api\\HealthController",
//!     vec![RouteDeclaration::new("GET", "/health", "", "check", &[])],
//! )));
//! let config = RuntimeConfig { route_cache_enabled: false, ..RuntimeConfig::default() };
//! let registry = RouteRegistry::initialize(&config, controllers, vec![]);
//! assert_eq!(registry.table().routes_for("GET", 1).len(), 1);
//! ```

mod cache;
mod core;
mod docs;

pub use cache::{clear_cache, load_cache, write_cache};
pub use core::{group_routes_by_method_and_length, GroupedRoutes, RouteRegistry, RouteTable};
pub use docs::{EndpointDoc, EndpointDocumentation, RoutesSummary};
