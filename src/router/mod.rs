//! # Router Module
//!
//! Matches incoming requests against the registry's route table and drives
//! them through binding, normalization, validation and authorization to a
//! controller call.
//!
//! ## Matching
//!
//! Routes are bucketed by verb and component count, so a request only
//! scores the routes of its own length. [`PathScorer`] weighs each position
//! by its distance from the end of the path:
//!
//! | registered component | points at position `i` of `L` |
//! |---|---|
//! | equal to the client component | `2 * (L - i)` |
//! | wildcard (`?` or `{name}`) | `L - i` |
//! | anything else | route disqualified |
//!
//! The highest score wins and ties keep the first registered route. For
//! `GET /Users/42`, `/Users/?` scores 5 and the CRUD route `/?/?` scores 3.
//!
//! ## Example
//!
//! ```rust
//! use gravitycar::controller::{ControllerTable, EchoController};
//! use gravitycar::model::StaticModelCatalog;
//! use gravitycar::registry::RouteRegistry;
//! use gravitycar::request::params::RawParams;
//! use gravitycar::route::RouteDeclaration;
//! use gravitycar::router::Router;
//! use gravitycar::runtime_config::RuntimeConfig;
//! use std::sync::Arc;
//!
//! let config = RuntimeConfig { route_cache_enabled: false, ..RuntimeConfig::default() };
//! let mut controllers = ControllerTable::new();
//! controllers.register(Arc::new(EchoController::new(
//!     "App\\Api\\UsersController",
//!     vec![
//!         RouteDeclaration::new("GET", "/Users", "", "index", &[]),
//!         RouteDeclaration::new("GET", "/Users/?", "", "show", &["userId"]),
//!     ],
//! )));
//! let registry = Arc::new(RouteRegistry::initialize(&config, controllers, vec![]));
//! let router = Router::new(registry, Arc::new(StaticModelCatalog::default()), &config);
//!
//! let matched = router.prepare("GET", "/Users/42", RawParams::new()).unwrap();
//! assert_eq!(matched.request.get("userId"), Some("42"));
//! ```

mod core;
mod scorer;

pub use core::{RouteMatch, Router};
pub use scorer::PathScorer;
