//! # Gravitycar
//!
//! **Gravitycar** is the routing core of a metadata-driven REST API: a route
//! registry fed by controllers and models, a path-scoring router with
//! deterministic most-specific-match semantics, and a request/response
//! pipeline that lets one backend serve several data-grid clients (AG-Grid,
//! MUI DataGrid, TanStack Query, SWR) by detecting their query conventions.
//!
//! ## Architecture
//!
//! - **[`route`]** - Route declarations, validated route records, path components, manifests
//! - **[`registry`]** - Discovery, validation, class resolution, grouping, cache, documentation views
//! - **[`router`]** - [`router::PathScorer`] and the per-request [`router::Router`] pipeline
//! - **[`controller`]** - Dispatch targets: the default CRUD controller and manifest echo controllers
//! - **[`request`]** - [`request::Request`], request ids and the format-detecting parameter parser
//! - **[`validation`]** - Model-aware filter, search, sorting and pagination validation
//! - **[`response`]** - Per-client response envelopes
//! - **[`model`]** - Field kinds, operator capabilities and the model catalog
//! - **[`repository`]** - Storage collaborator interface and an in-memory implementation
//! - **[`security`]** - Current user, roles and model permissions
//! - **[`error`]** - Typed error taxonomy with HTTP status mapping
//! - **[`runtime_config`]** / **[`logging`]** - Configuration and tracing setup
//! - **[`cli`]** - The `gravitycar-routes` command line
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller as HTTP layer
//!     participant Router
//!     participant Registry as RouteRegistry
//!     participant Scorer as PathScorer
//!     participant Parser as RequestParameterParser
//!     participant Validator as ParamsValidator
//!     participant Guard as AccessGuard
//!     participant Controller as ApiController
//!
//!     Caller->>Router: route("GET", "/Users", data)
//!     Router->>Registry: routes_for(GET, 1)
//!     Router->>Scorer: find_best_match
//!     Scorer-->>Router: GET /? (ModelBaseAPIController::list)
//!     Router->>Router: Request::bind (modelName = Users)
//!     Router->>Parser: parse(data)
//!     Parser-->>Router: ParsedParams (format: ag-grid)
//!     Router->>Validator: validate_for_model(Users)
//!     alt field problems
//!         Validator-->>Caller: RouterError::Validation (422)
//!     end
//!     Router->>Guard: authorize
//!     Router->>Controller: invoke("list", request)
//!     Controller-->>Caller: {success, data, lastRow}
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gravitycar::cli::bootstrap;
//! use gravitycar::request::params::RawParams;
//! use gravitycar::route::RouteManifest;
//! use gravitycar::runtime_config::RuntimeConfig;
//! use serde_json::json;
//!
//! let manifest: RouteManifest = serde_json::from_value(json!({
//!     "models": [{
//!         "name": "Books",
//!         "fields": [{"name": "id", "type": "ID"}, {"name": "title", "type": "Text"}]
//!     }],
//!     "records": {"Books": [{"title": "Dune"}, {"title": "Emma"}]}
//! })).unwrap();
//! let config = RuntimeConfig { route_cache_enabled: false, ..RuntimeConfig::default() };
//! let router = bootstrap(&manifest, &config).unwrap();
//!
//! let mut data = RawParams::new();
//! data.insert("startRow".into(), json!(0));
//! data.insert("endRow".into(), json!(20));
//! let body = router.route("GET", "/Books", data).unwrap();
//! assert_eq!(body["lastRow"], 2);
//! ```
//!
//! ## Runtime Considerations
//!
//! Routing is synchronous. The registry publishes its table through
//! `arc-swap`, so lookups never block a rebuild; the cache file has no
//! locking and concurrent rebuilds should be serialized by the deployment.

pub mod cli;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repository;
pub mod request;
pub mod response;
pub mod route;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod validation;

pub use error::{ApiError, ParameterValidationError, RouteFormatError, RouterError};
pub use registry::RouteRegistry;
pub use router::Router;
