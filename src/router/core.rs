use super::scorer::PathScorer;
use crate::error::RouterError;
use crate::model::ModelCatalog;
use crate::registry::RouteRegistry;
use crate::request::params::{PageLimits, RawParams, RequestParameterParser};
use crate::request::Request;
use crate::route::{normalize_method, path_length, RouteRecord};
use crate::runtime_config::RuntimeConfig;
use crate::security::{AccessGuard, User};
use crate::validation::ParamsValidator;
use http::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Routes shown in a not-found error.
const AVAILABLE_ROUTES_SAMPLE: usize = 10;

/// A request bound to the route that will serve it.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: RouteRecord,
    pub request: Request,
    /// Authorized user; `None` on public routes.
    pub user: Option<User>,
}

/// Resolves `(method, path, data)` to a controller call.
///
/// Per request: candidate lookup by verb and path length, scoring, request
/// binding, parameter normalization, model-aware validation, authorization,
/// required-parameter check, dispatch.
pub struct Router {
    registry: Arc<RouteRegistry>,
    catalog: Arc<dyn ModelCatalog>,
    scorer: PathScorer,
    parser: RequestParameterParser,
    validator: ParamsValidator,
    guard: AccessGuard,
}

impl Router {
    /// A router with anonymous access; page limits come from `config`.
    pub fn new(registry: Arc<RouteRegistry>, catalog: Arc<dyn ModelCatalog>, config: &RuntimeConfig) -> Self {
        let limits = PageLimits::from(config);
        let routes_count = registry.table().len();
        info!(routes_count, namespace = %registry.namespace(), "Router ready");
        Self {
            registry,
            catalog,
            scorer: PathScorer::new(),
            parser: RequestParameterParser::new(limits),
            validator: ParamsValidator::new(limits),
            guard: AccessGuard::default(),
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: AccessGuard) -> Self {
        self.guard = guard;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: RequestParameterParser) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn parser(&self) -> &RequestParameterParser {
        &self.parser
    }

    /// Find the route serving `method path`.
    ///
    /// Same-length candidates are scored first. On a miss every other length
    /// bucket registered for the verb is scored too; since scoring requires
    /// equal component counts this second pass only reports what the first
    /// already established.
    pub fn resolve(&self, method: &str, path: &str) -> Result<RouteRecord, RouterError> {
        let start = Instant::now();
        let not_found = || RouterError::NotFound {
            method: method.to_string(),
            path: path.to_string(),
            available: self.registry.sample_routes(AVAILABLE_ROUTES_SAMPLE),
        };

        let Some(verb) = normalize_method(method) else {
            warn!(method, path, "Unsupported HTTP method");
            return Err(not_found());
        };

        let table = self.registry.table();
        let length = path_length(path);
        let candidates = table.routes_for(verb.as_str(), length);
        debug!(method = %verb, path, path_length = length, candidates = candidates.len(), "Route match attempt");

        let mut matched = self.scorer.find_best_match(verb.as_str(), path, candidates);
        if matched.is_none() {
            debug!(method = %verb, path, "No same-length match, trying other lengths");
            matched = table
                .buckets_for(verb.as_str())
                .filter(|(len, _)| *len != length)
                .find_map(|(_, routes)| self.scorer.find_best_match(verb.as_str(), path, routes));
        }

        let elapsed = start.elapsed();
        match matched {
            Some(route) => {
                if elapsed > Duration::from_millis(1) {
                    warn!(method = %verb, path, route_path = %route.path, duration_us = elapsed.as_micros(), "Slow route matching detected");
                } else {
                    debug!(method = %verb, path, route_path = %route.path, duration_us = elapsed.as_micros(), "Route matched");
                }
                Ok(route.clone())
            }
            None => {
                warn!(method = %verb, path, duration_us = elapsed.as_micros(), "No route matched");
                Err(not_found())
            }
        }
    }

    /// Resolve and bind a request, running every check short of dispatch.
    pub fn prepare(&self, method: &str, path: &str, request_data: RawParams) -> Result<RouteMatch, RouterError> {
        let route = self.resolve(method, path)?;
        let verb = Method::from_bytes(route.method.as_bytes())
            .map_err(|err| RouterError::Internal(format!("stored route method '{}': {err}", route.method)))?;

        let mut request = Request::bind(verb, path, &route, request_data)?;

        let parsed = self.parser.parse(request.request_data());
        let model = request.model_name().and_then(|name| self.catalog.model(name));
        let validated = match model {
            Some(model) => Some(self.validator.validate_for_model(&parsed, &model).inspect_err(|err| {
                warn!(model = %model.name, fields = err.field_count(), "Request parameters rejected");
            })?),
            None => None,
        };
        request.set_parsed_params(parsed);
        if let Some(validated) = validated {
            request.set_validated_params(validated);
        }

        let user = self.guard.authorize(&route, &request)?;

        if let Some(missing) = route.captured_parameter_names().find(|name| !request.has(name)) {
            return Err(RouterError::MissingParameter {
                name: missing.to_string(),
                route_path: route.path.clone(),
            });
        }

        Ok(RouteMatch { route, request, user })
    }

    /// Invoke the matched route's controller method.
    pub fn dispatch(&self, matched: &RouteMatch) -> Result<Value, RouterError> {
        let route = &matched.route;
        let controller = self
            .registry
            .controller(&route.resolved_api_class)
            .ok_or_else(|| RouterError::UnknownController(route.resolved_api_class.clone()))?;

        info!(
            request_id = %matched.request.request_id,
            method = %route.method,
            path = %matched.request.path,
            route_path = %route.path,
            controller = %route.short_class_name(),
            api_method = %route.api_method,
            "Dispatching request"
        );
        controller
            .invoke(&route.api_method, &matched.request)
            .map_err(|source| {
                warn!(request_id = %matched.request.request_id, error = %source, "Controller failed");
                RouterError::Controller {
                    class: route.resolved_api_class.clone(),
                    method: route.api_method.clone(),
                    source,
                }
            })
    }

    /// Route a request end to end.
    pub fn route(&self, method: &str, path: &str, request_data: RawParams) -> Result<Value, RouterError> {
        let matched = self.prepare(method, path, request_data)?;
        self.dispatch(&matched)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("formats", &self.parser.format_names())
            .finish()
    }
}
