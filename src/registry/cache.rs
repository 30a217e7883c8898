//! On-disk route cache.
//!
//! The file is a JSON object `{routes, groupedRoutes, cached_at}`. A file
//! lacking `routes` or `groupedRoutes`, or failing to deserialize, is an
//! error; the registry then rediscovers. Writes replace the whole file
//! through a rename.

use super::core::{GroupedRoutes, RouteTable};
use crate::route::RouteRecord;
use anyhow::{bail, Context};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    routes: Vec<RouteRecord>,
    #[serde(rename = "groupedRoutes")]
    grouped_routes: GroupedRoutes,
    #[serde(default)]
    cached_at: Option<String>,
}

/// Read a cached route table.
///
/// # Returns
///
/// `Ok(None)` when the file does not exist, `Err` when it exists but is
/// unreadable or malformed.
pub fn load_cache(path: &Path) -> anyhow::Result<Option<RouteTable>> {
    if !path.exists() {
        debug!(path = %path.display(), "No route cache file");
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading route cache {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("route cache {} is not valid JSON", path.display()))?;

    let Some(obj) = value.as_object() else {
        bail!("route cache {} is not a JSON object", path.display());
    };
    for key in ["routes", "groupedRoutes"] {
        if !obj.contains_key(key) {
            bail!("route cache {} is missing '{key}'", path.display());
        }
    }

    let cache: CacheFile = serde_json::from_value(value)
        .with_context(|| format!("route cache {} has an unexpected shape", path.display()))?;
    debug!(
        path = %path.display(),
        routes = cache.routes.len(),
        cached_at = cache.cached_at.as_deref().unwrap_or("unknown"),
        "Route cache loaded"
    );
    Ok(Some(RouteTable {
        routes: cache.routes,
        grouped: cache.grouped_routes,
    }))
}

/// Write `table` to `path`, creating parent directories.
pub fn write_cache(path: &Path, table: &RouteTable) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating cache directory {}", parent.display()))?;
    }
    let cache = CacheFile {
        routes: table.routes.clone(),
        grouped_routes: table.grouped.clone(),
        cached_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
    };
    let body = serde_json::to_string_pretty(&cache).context("serializing route cache")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, body).with_context(|| format!("writing route cache {}", path.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing route cache {}", path.display()))?;

    info!(path = %path.display(), routes_count = table.routes.len(), "Route cache written");
    Ok(())
}

/// Remove the cache file. `Ok(false)` when there was none.
pub fn clear_cache(path: &Path) -> anyhow::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "Route cache cleared");
            Ok(true)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("removing route cache {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::group_routes_by_method_and_length;
    use crate::route::RouteDeclaration;
    use http::Method;

    fn table() -> RouteTable {
        let decl = RouteDeclaration::new("GET", "/Users/?", "Api", "get", &["", "userId"]);
        let routes = vec![RouteRecord::from_declaration(&decl, &Method::GET, "App\\Api".into())];
        RouteTable {
            grouped: group_routes_by_method_and_length(&routes),
            routes,
        }
    }

    #[test]
    fn test_round_trip_preserves_grouped_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/api_routes.json");
        let original = table();
        write_cache(&path, &original).unwrap();

        let loaded = load_cache(&path).unwrap().unwrap();
        assert_eq!(loaded.grouped, original.grouped);
        assert_eq!(loaded.routes, original.routes);

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["groupedRoutes"]["GET"]["2"].is_array());
        assert!(raw["cached_at"].is_string());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_routes.json");
        assert!(load_cache(&path).unwrap().is_none());

        fs::write(&path, r#"{"routes": []}"#).unwrap();
        assert!(load_cache(&path).is_err());

        fs::write(&path, "{truncated").unwrap();
        assert!(load_cache(&path).is_err());

        assert!(clear_cache(&path).unwrap());
        assert!(!clear_cache(&path).unwrap());
    }
}
