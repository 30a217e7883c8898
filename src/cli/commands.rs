use crate::controller::{ControllerTable, ModelBaseApiController, ModelRouteSource};
use crate::model::ModelCatalog;
use crate::registry::RouteRegistry;
use crate::repository::InMemoryRepository;
use crate::request::params::{RawParams, RequestParameterParser};
use crate::route::{RouteManifest, RouteRecord};
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Inspect and exercise the Gravitycar route table.
#[derive(Debug, Parser)]
#[command(name = "gravitycar-routes")]
#[command(about = "Gravitycar route registry and request normalization tools", long_about = None)]
pub struct Cli {
    /// Route manifest (YAML or JSON) declaring models and controllers
    #[arg(long, global = true, env = "GRAVITYCAR_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// TOML runtime configuration; environment variables still apply
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered routes with a summary
    Routes {
        /// Only routes for this HTTP method
        #[arg(long)]
        method: Option<String>,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolve a request and show the bound route and parameters
    Match {
        /// HTTP method, e.g. GET
        method: String,

        /// Request path, e.g. /Users/42
        path: String,

        /// Request data as key=value pairs
        params: Vec<String>,

        /// Invoke the controller and print its response
        #[arg(long, default_value_t = false)]
        dispatch: bool,
    },
    /// Run format detection on key=value pairs and print the normalized envelope
    Parse {
        /// Request data as key=value pairs
        params: Vec<String>,
    },
    /// Manage the route cache file
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Endpoint documentation for a model
    Docs {
        /// Model name, e.g. Users
        model: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheAction {
    /// Rediscover routes and overwrite the cache
    Rebuild,
    /// Delete the cache file
    Clear,
}

/// Parse process arguments and run.
///
/// # Errors
///
/// Returns an error if the manifest or config cannot be loaded, or the
/// command itself fails (unmatched route, cache I/O).
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Run `cli`, writing results to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let manifest = match &cli.manifest {
        Some(path) => RouteManifest::load(path)?,
        None => RouteManifest::default(),
    };

    match &cli.command {
        Commands::Parse { params } => {
            let raw = parse_pairs(params)?;
            let parsed = RequestParameterParser::from_config(&config).parse(&raw);
            write_json(out, &serde_json::to_value(parsed)?)
        }
        Commands::Routes { method, json } => {
            let router = bootstrap(&manifest, &config)?;
            let registry = router.registry();
            let filter = method.as_deref().map(str::to_ascii_uppercase);
            let routes: Vec<RouteRecord> = registry
                .routes()
                .into_iter()
                .filter(|r| filter.as_deref().map_or(true, |m| r.method == m))
                .collect();
            if *json {
                write_json(
                    out,
                    &json!({ "summary": registry.get_routes_summary(), "routes": routes }),
                )
            } else {
                print_route_table(out, &routes, registry)
            }
        }
        Commands::Match {
            method,
            path,
            params,
            dispatch,
        } => {
            let router = bootstrap(&manifest, &config)?;
            let raw = parse_pairs(params)?;
            let outcome = if *dispatch {
                router.route(method, path, raw)
            } else {
                router.prepare(method, path, raw).map(|m| describe_match(&m))
            };
            match outcome {
                Ok(body) => write_json(out, &body),
                Err(err) => {
                    write_json(out, &err.to_json())?;
                    Err(anyhow!(err))
                }
            }
        }
        Commands::Cache { action } => {
            if !config.route_cache_enabled {
                writeln!(out, "route cache is disabled")?;
                return Ok(());
            }
            match action {
                CacheAction::Rebuild => {
                    let router = bootstrap(&manifest, &config)?;
                    let count = router.registry().rebuild_cache()?;
                    writeln!(
                        out,
                        "cached {count} routes at {}",
                        config.route_cache_path.display()
                    )?;
                }
                CacheAction::Clear => {
                    let removed = crate::registry::clear_cache(&config.route_cache_path)?;
                    if removed {
                        writeln!(out, "removed {}", config.route_cache_path.display())?;
                    } else {
                        writeln!(out, "no cache at {}", config.route_cache_path.display())?;
                    }
                }
            }
            Ok(())
        }
        Commands::Docs { model } => {
            let router = bootstrap(&manifest, &config)?;
            let docs = router.registry().get_endpoint_documentation(model);
            write_json(out, &serde_json::to_value(docs)?)
        }
    }
}

/// TOML file when given, otherwise defaults; the environment applies to both.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_toml_file(path),
        None => Ok(RuntimeConfig::from_env()),
    }
}

/// Wire a router from a manifest: catalog, seeded in-memory repository,
/// default CRUD controller, manifest controllers and model routes.
pub fn bootstrap(manifest: &RouteManifest, config: &RuntimeConfig) -> anyhow::Result<Router> {
    let catalog: Arc<dyn ModelCatalog> = Arc::new(manifest.catalog());
    let repository = Arc::new(InMemoryRepository::new());
    for (model, rows) in &manifest.records {
        let count = repository
            .seed(model, rows.iter().cloned())
            .with_context(|| format!("seeding records for {model}"))?;
        info!(model = %model, count, "Seeded records");
    }

    let mut controllers = ControllerTable::new();
    controllers.register(Arc::new(ModelBaseApiController::new(
        &config.app_namespace,
        Arc::clone(&catalog),
        repository,
    )));
    for controller in manifest.echo_controllers() {
        controllers.register(Arc::new(controller));
    }

    let sources: Vec<Arc<dyn ModelRouteSource>> = manifest
        .model_route_sources()
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn ModelRouteSource>)
        .collect();

    let registry = Arc::new(RouteRegistry::initialize(config, controllers, sources));
    Ok(Router::new(registry, catalog, config))
}

/// `key=value` pairs into request data; a bare `key` maps to an empty string.
fn parse_pairs(pairs: &[String]) -> anyhow::Result<RawParams> {
    let mut raw = Map::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
        if key.is_empty() {
            return Err(anyhow!("invalid parameter '{pair}', expected key=value"));
        }
        raw.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(raw)
}

fn describe_match(matched: &crate::router::RouteMatch) -> Value {
    let params: Map<String, Value> = matched
        .request
        .params()
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    json!({
        "requestId": matched.request.request_id,
        "route": matched.route,
        "params": params,
        "responseFormat": matched.request.response_format(),
        "parsed": matched.request.parsed_params(),
        "validated": matched.request.validated_params(),
        "user": matched.user,
    })
}

fn print_route_table(out: &mut dyn Write, routes: &[RouteRecord], registry: &RouteRegistry) -> anyhow::Result<()> {
    let summary = registry.get_routes_summary();
    writeln!(out, "{} routes", summary.total_routes)?;
    for (method, count) in &summary.by_method {
        writeln!(out, "  {method:<7} {count}")?;
    }
    writeln!(out)?;
    for route in routes {
        let params: Vec<&str> = route.captured_parameter_names().collect();
        writeln!(
            out,
            "{:<7} {:<32} {}::{} [{}]",
            route.method,
            route.path,
            route.short_class_name(),
            route.api_method,
            params.join(", ")
        )?;
    }
    Ok(())
}

fn write_json(out: &mut dyn Write, value: &Value) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
