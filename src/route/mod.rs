//! # Route Module
//!
//! Route declarations, validated route records and path component parsing.
//!
//! A controller or model declares routes as [`RouteDeclaration`]s:
//!
//! ```rust
//! use gravitycar::route::RouteDeclaration;
//!
//! let decl = RouteDeclaration::new("GET", "/Users/?", "UsersAPIController", "getUser", &["userId"]);
//! assert_eq!(decl.method, "GET");
//! ```
//!
//! The registry validates each declaration and stores it as a [`RouteRecord`]
//! carrying the derived `path_components`, `path_length` and
//! `resolved_api_class`. Paths may contain literal segments and wildcard
//! segments, written either `?` or `{name}`.

mod manifest;
mod path;
mod types;

pub use manifest::{ManifestController, ManifestModel, RouteManifest};

pub use path::{
    dynamic_component_count, is_dynamic_component, parse_path_components, path_length, WILDCARD,
};
pub use types::{
    normalize_method, short_class_name, RouteDeclaration, RouteRecord, SUPPORTED_METHODS,
};
