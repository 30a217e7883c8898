//! # CLI Module
//!
//! Command-line surface of the `gravitycar-routes` binary.
//!
//! ## Commands
//!
//! | command | does |
//! |---|---|
//! | `routes [--method M] [--json]` | route table and summary |
//! | `match METHOD PATH [key=value]... [--dispatch]` | resolve a request, optionally invoke it |
//! | `parse [key=value]...` | format detection and the normalized envelope |
//! | `cache rebuild` / `cache clear` | manage the route cache file |
//! | `docs MODEL` | endpoint documentation, implied CRUD routes included |
//!
//! Every command accepts `--manifest <FILE>` (YAML or JSON, see
//! [`RouteManifest`](crate::route::RouteManifest)) and `--config <FILE>`
//! (TOML, see [`RuntimeConfig`](crate::runtime_config::RuntimeConfig)).
//!
//! ```bash
//! gravitycar-routes --manifest routes.yaml match GET /Users/42
//! gravitycar-routes parse startRow=20 endRow=40
//! gravitycar-routes --manifest routes.yaml match GET /Books sort=title:asc --dispatch
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{bootstrap, execute, load_config, run_cli, CacheAction, Cli, Commands};
