use super::cache;
use crate::controller::{ApiController, ControllerTable, ModelRouteSource, MODEL_BASE_CONTROLLER};
use crate::error::RouteFormatError;
use crate::route::{
    dynamic_component_count, is_dynamic_component, normalize_method, parse_path_components,
    short_class_name, RouteDeclaration, RouteRecord,
};
use crate::runtime_config::RuntimeConfig;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// `method → path length → routes`, in registration order.
pub type GroupedRoutes = BTreeMap<String, BTreeMap<usize, Vec<RouteRecord>>>;

/// An immutable snapshot of every registered route plus its lookup index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub routes: Vec<RouteRecord>,
    pub grouped: GroupedRoutes,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        let grouped = group_routes_by_method_and_length(&routes);
        Self { routes, grouped }
    }

    /// Candidates for `method` whose path has exactly `length` components.
    #[must_use]
    pub fn routes_for(&self, method: &str, length: usize) -> &[RouteRecord] {
        self.grouped
            .get(method)
            .and_then(|by_len| by_len.get(&length))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every length bucket registered for `method`, shortest first.
    pub fn buckets_for<'a>(
        &'a self,
        method: &str,
    ) -> impl Iterator<Item = (usize, &'a [RouteRecord])> + 'a {
        self.grouped
            .get(method)
            .into_iter()
            .flat_map(|by_len| by_len.iter().map(|(len, routes)| (*len, routes.as_slice())))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Build the two-level lookup index. Order within a bucket follows `routes`.
#[must_use]
pub fn group_routes_by_method_and_length(routes: &[RouteRecord]) -> GroupedRoutes {
    let mut grouped = GroupedRoutes::new();
    for route in routes {
        grouped
            .entry(route.method.clone())
            .or_default()
            .entry(route.path_length)
            .or_default()
            .push(route.clone());
    }
    grouped
}

/// Process-wide route registry.
///
/// Owns the controller table and the model route sources, discovers and
/// validates their declarations, and publishes the result as a
/// [`RouteTable`] that readers load without locking. Construct one per
/// process in the composition root and share it behind an `Arc`.
pub struct RouteRegistry {
    controllers: ControllerTable,
    model_sources: Vec<Arc<dyn ModelRouteSource>>,
    namespace: String,
    cache_path: Option<PathBuf>,
    table: ArcSwap<RouteTable>,
}

impl RouteRegistry {
    /// An empty registry. Call [`RouteRegistry::load_or_discover`] to fill it.
    pub fn new(
        config: &RuntimeConfig,
        controllers: ControllerTable,
        model_sources: Vec<Arc<dyn ModelRouteSource>>,
    ) -> Self {
        Self {
            controllers,
            model_sources,
            namespace: config.app_namespace.clone(),
            cache_path: config
                .route_cache_enabled
                .then(|| config.route_cache_path.clone()),
            table: ArcSwap::from_pointee(RouteTable::default()),
        }
    }

    /// Construct and populate from the cache or a fresh discovery pass.
    pub fn initialize(
        config: &RuntimeConfig,
        controllers: ControllerTable,
        model_sources: Vec<Arc<dyn ModelRouteSource>>,
    ) -> Self {
        let registry = Self::new(config, controllers, model_sources);
        registry.load_or_discover();
        registry
    }

    #[must_use]
    pub fn controllers(&self) -> &ControllerTable {
        &self.controllers
    }

    #[must_use]
    pub fn controller(&self, class: &str) -> Option<&Arc<dyn ApiController>> {
        self.controllers.get(class)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `None` when caching is disabled.
    #[must_use]
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Current snapshot.
    #[must_use]
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<RouteRecord> {
        self.table.load().routes.clone()
    }

    #[must_use]
    pub fn grouped_routes(&self) -> GroupedRoutes {
        self.table.load().grouped.clone()
    }

    /// Up to `limit` route labels for diagnostics.
    #[must_use]
    pub fn sample_routes(&self, limit: usize) -> Vec<String> {
        self.table
            .load()
            .routes
            .iter()
            .take(limit)
            .map(RouteRecord::label)
            .collect()
    }

    /// Use the cached table when one is present and well formed, otherwise
    /// discover and write a fresh cache. Returns the route count.
    pub fn load_or_discover(&self) -> usize {
        if let Some(path) = &self.cache_path {
            match cache::load_cache(path) {
                Ok(Some(table)) => {
                    let count = table.len();
                    info!(path = %path.display(), routes_count = count, "Routes loaded from cache");
                    self.table.store(Arc::new(table));
                    return count;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = ?err, "Route cache unusable, rediscovering");
                }
            }
        }

        let table = self.discover();
        let count = table.len();
        if let Some(path) = &self.cache_path {
            if let Err(err) = cache::write_cache(path, &table) {
                error!(path = %path.display(), error = ?err, "Failed to write route cache");
            }
        }
        self.table.store(Arc::new(table));
        count
    }

    /// Rediscover unconditionally and overwrite the cache.
    pub fn rebuild_cache(&self) -> anyhow::Result<usize> {
        let table = self.discover();
        let count = table.len();
        if let Some(path) = &self.cache_path {
            cache::write_cache(path, &table)?;
        }
        self.table.store(Arc::new(table));
        Ok(count)
    }

    /// Delete the cache file. `Ok(false)` when caching is disabled or no
    /// file existed.
    pub fn clear_cache(&self) -> anyhow::Result<bool> {
        match &self.cache_path {
            Some(path) => cache::clear_cache(path),
            None => Ok(false),
        }
    }

    /// Run a full discovery pass without publishing it.
    ///
    /// The default CRUD controller registers first, then the remaining
    /// controllers in table order, then model route sources. Invalid
    /// declarations are logged and skipped.
    #[must_use]
    pub fn discover(&self) -> RouteTable {
        let mut routes: Vec<RouteRecord> = Vec::new();
        let mut skipped = 0usize;

        let (defaults, others): (Vec<_>, Vec<_>) = self
            .controllers
            .iter()
            .partition(|c| short_class_name(c.class_name()) == MODEL_BASE_CONTROLLER);

        for controller in defaults.into_iter().chain(others) {
            for decl in controller.register_routes() {
                match self.validate_route(&decl, None, &routes) {
                    Ok(record) => routes.push(record),
                    Err(err) => {
                        skipped += 1;
                        warn!(controller = %controller.class_name(), path = %decl.path, method = %decl.method, error = %err, "Skipping invalid route");
                    }
                }
            }
        }

        for source in &self.model_sources {
            for decl in source.register_routes() {
                match self.validate_route(&decl, Some(source.model_name()), &routes) {
                    Ok(record) => routes.push(record),
                    Err(err) => {
                        skipped += 1;
                        warn!(model = %source.model_name(), path = %decl.path, method = %decl.method, error = %err, "Skipping invalid model route");
                    }
                }
            }
        }

        info!(
            routes_count = routes.len(),
            skipped,
            controllers = self.controllers.len(),
            model_sources = self.model_sources.len(),
            "Route discovery complete"
        );
        RouteTable::new(routes)
    }

    /// Validate and add one route to the live table.
    pub fn register_route(&self, decl: &RouteDeclaration) -> Result<RouteRecord, RouteFormatError> {
        let current = self.table.load_full();
        let record = self.validate_route(decl, None, &current.routes)?;
        let mut routes = current.routes.clone();
        routes.push(record.clone());
        self.table.store(Arc::new(RouteTable::new(routes)));
        info!(route = %record.label(), class = %record.resolved_api_class, "Route registered");
        Ok(record)
    }

    /// Check a declaration and build its record.
    ///
    /// `model` is the model that declared the route, if any; it feeds the
    /// model-name class convention. `registered` are the routes accepted so
    /// far in this pass.
    pub fn validate_route(
        &self,
        decl: &RouteDeclaration,
        model: Option<&str>,
        registered: &[RouteRecord],
    ) -> Result<RouteRecord, RouteFormatError> {
        for (name, value) in [
            ("method", &decl.method),
            ("path", &decl.path),
            ("apiClass", &decl.api_class),
            ("apiMethod", &decl.api_method),
        ] {
            if value.trim().is_empty() {
                return Err(RouteFormatError::MissingField(name));
            }
        }

        let method = normalize_method(&decl.method)
            .ok_or_else(|| RouteFormatError::InvalidMethod(decl.method.clone()))?;

        if !decl.path.starts_with('/') {
            return Err(RouteFormatError::InvalidPath(decl.path.clone()));
        }

        let resolved = self
            .resolve_controller_class_name(&decl.api_class, model, &decl.path, registered)
            .ok_or_else(|| RouteFormatError::UnresolvableClass(decl.api_class.clone()))?;

        let has_method = self
            .controllers
            .get(&resolved)
            .is_some_and(|c| c.has_method(&decl.api_method));
        if !has_method {
            return Err(RouteFormatError::UnknownMethod {
                class: resolved,
                method: decl.api_method.clone(),
            });
        }

        let components = parse_path_components(&decl.path);
        let dynamic = dynamic_component_count(&components);
        let named = decl.parameter_names.iter().filter(|n| !n.is_empty()).count();
        let shape_ok = decl.parameter_names.len() == components.len()
            || decl.parameter_names.len() == dynamic;
        if named != dynamic || !shape_ok {
            return Err(RouteFormatError::ParameterCount {
                path: decl.path.clone(),
                declared: named,
                dynamic,
            });
        }

        let record = RouteRecord::from_declaration(decl, &method, resolved);
        debug!(route = %record.label(), class = %record.resolved_api_class, "Route validated");
        Ok(record)
    }

    /// Resolve a class reference to a registered controller.
    ///
    /// Tried in order: the name as given; the model convention
    /// `<namespace>\Models\<Model>\Api\<class>` where the model is the
    /// declaring model or the route's first literal component; a scan of
    /// already registered routes, then of the controller table, by short
    /// name.
    #[must_use]
    pub fn resolve_controller_class_name(
        &self,
        api_class: &str,
        model: Option<&str>,
        path: &str,
        registered: &[RouteRecord],
    ) -> Option<String> {
        if self.controllers.contains(api_class) {
            return Some(api_class.to_string());
        }

        let short = short_class_name(api_class);
        let model = model.map(str::to_string).or_else(|| {
            parse_path_components(path)
                .into_iter()
                .find(|c| !is_dynamic_component(c))
        });
        if let Some(model) = model {
            let candidate = format!("{}\\Models\\{model}\\Api\\{short}", self.namespace);
            if self.controllers.contains(&candidate) {
                return Some(candidate);
            }
        }

        registered
            .iter()
            .map(|r| r.resolved_api_class.as_str())
            .find(|class| short_class_name(class) == short)
            .or_else(|| self.controllers.find_by_short_name(short))
            .map(str::to_string)
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("controllers", &self.controllers)
            .field("model_sources", &self.model_sources.len())
            .field("namespace", &self.namespace)
            .field("cache_path", &self.cache_path)
            .field("routes", &self.table.load().routes.len())
            .finish()
    }
}
