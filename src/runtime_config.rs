//! # Runtime Configuration Module
//!
//! Configuration for route discovery, the route cache and request
//! normalization.
//!
//! ## Sources
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`RuntimeConfig::default`])
//! 2. An optional TOML file ([`RuntimeConfig::from_toml_file`])
//! 3. Environment variables ([`RuntimeConfig::apply_env`])
//!
//! ## Environment Variables
//!
//! | variable | field | default |
//! |---|---|---|
//! | `GRAVITYCAR_ROUTE_CACHE` | `route_cache_path` | `cache/api_routes.json` |
//! | `GRAVITYCAR_ROUTE_CACHE_ENABLED` | `route_cache_enabled` | `true` |
//! | `GRAVITYCAR_DEFAULT_PAGE_SIZE` | `default_page_size` | `20` |
//! | `GRAVITYCAR_MAX_PAGE_SIZE` | `max_page_size` | `1000` |
//! | `GRAVITYCAR_NAMESPACE` | `app_namespace` | `Gravitycar` |
//!
//! Values that fail to parse are ignored and the previous value is kept.
//!
//! ## Usage
//!
//! ```rust
//! use gravitycar::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.max_page_size >= 1);
//! ```
//!
//! ## Example TOML
//!
//! ```toml
//! route_cache_path = "var/cache/api_routes.json"
//! max_page_size = 500
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Routing and normalization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Where the serialized route cache lives.
    pub route_cache_path: PathBuf,
    /// When false the registry always rediscovers and never touches the cache file.
    pub route_cache_enabled: bool,
    /// Page size used when a request does not ask for one.
    pub default_page_size: u64,
    /// Hard ceiling for any requested page size.
    pub max_page_size: u64,
    /// Root namespace used by the model-name class resolution convention.
    pub app_namespace: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            route_cache_path: PathBuf::from("cache/api_routes.json"),
            route_cache_enabled: true,
            default_page_size: 20,
            max_page_size: 1000,
            app_namespace: "Gravitycar".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a TOML file (missing keys take defaults), then apply the environment.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: RuntimeConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `GRAVITYCAR_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(val) = env::var("GRAVITYCAR_ROUTE_CACHE") {
            if !val.trim().is_empty() {
                self.route_cache_path = PathBuf::from(val);
            }
        }
        if let Some(enabled) = env::var("GRAVITYCAR_ROUTE_CACHE_ENABLED")
            .ok()
            .and_then(|v| parse_flag(&v))
        {
            self.route_cache_enabled = enabled;
        }
        if let Some(size) = env::var("GRAVITYCAR_DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.default_page_size = size;
        }
        if let Some(size) = env::var("GRAVITYCAR_MAX_PAGE_SIZE")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.max_page_size = size;
        }
        if let Ok(ns) = env::var("GRAVITYCAR_NAMESPACE") {
            if !ns.trim().is_empty() {
                self.app_namespace = ns.trim().trim_matches('\\').to_string();
            }
        }
        self.max_page_size = self.max_page_size.max(1);
        self.default_page_size = self.default_page_size.clamp(1, self.max_page_size);
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
