//! Error taxonomy for routing, registration, validation and dispatch.
//!
//! Registration problems ([`RouteFormatError`]) are recovered by the registry
//! (the offending route is logged and skipped). Everything that prevents a
//! single request from being served surfaces as a [`RouterError`] so an outer
//! HTTP layer can translate it with [`RouterError::status_code`].

use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// A declared route record failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteFormatError {
    #[error("route is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unsupported HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("route path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("API class '{0}' could not be resolved")]
    UnresolvableClass(String),

    #[error("method '{method}' does not exist on API class '{class}'")]
    UnknownMethod { class: String, method: String },

    #[error(
        "route '{path}' declares {declared} parameter names but has {dynamic} dynamic components"
    )]
    ParameterCount {
        path: String,
        declared: usize,
        dynamic: usize,
    },
}

/// Aggregate of every field-level problem found while validating request
/// parameters against a model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("request parameter validation failed for {} field(s)", errors.len())]
pub struct ParameterValidationError {
    /// Problems keyed by the offending field (or pseudo-field such as `pagination`).
    pub errors: BTreeMap<String, Vec<String>>,
    /// Free-text remediation hints.
    pub suggestions: Vec<String>,
}

impl ParameterValidationError {
    /// Number of distinct problem fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.errors.len()
    }
}

/// Failure raised by a controller method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("storage failure: {0}")]
    Repository(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status an outer layer should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Repository(_) | ApiError::Internal(_) => 500,
        }
    }
}

/// Failure reported by a [`crate::repository::ModelRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("record '{id}' of model '{model}' is invalid: {reason}")]
    InvalidRecord {
        model: String,
        id: String,
        reason: String,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownModel(model) => {
                ApiError::NotFound(format!("model '{model}' not found"))
            }
            RepositoryError::InvalidRecord { .. } => ApiError::BadRequest(err.to_string()),
            RepositoryError::Backend(msg) => ApiError::Repository(msg),
        }
    }
}

/// Everything that can stop a request from being served.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no route matches {method} {path}")]
    NotFound {
        method: String,
        path: String,
        /// Sample of registered routes, `"METHOD /path"`.
        available: Vec<String>,
    },

    #[error("route '{route_path}' declares {declared} parameter names but path '{path}' has {actual} components")]
    ParameterMismatch {
        route_path: String,
        path: String,
        declared: usize,
        actual: usize,
    },

    #[error("required parameter '{name}' is missing for route '{route_path}'")]
    MissingParameter { name: String, route_path: String },

    #[error(transparent)]
    Validation(#[from] ParameterValidationError),

    #[error("authentication required for {method} {path}")]
    Unauthenticated { method: String, path: String },

    #[error("user '{user_id}' lacks '{required}' for {method} {path}")]
    Forbidden {
        method: String,
        path: String,
        user_id: String,
        required: String,
    },

    #[error("no controller registered for '{0}'")]
    UnknownController(String),

    #[error("{class}::{method} failed: {source}")]
    Controller {
        class: String,
        method: String,
        #[source]
        source: ApiError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// HTTP status an outer layer should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            RouterError::NotFound { .. } => 404,
            RouterError::ParameterMismatch { .. } | RouterError::MissingParameter { .. } => 400,
            RouterError::Validation(_) => 422,
            RouterError::Unauthenticated { .. } => 401,
            RouterError::Forbidden { .. } => 403,
            RouterError::Controller { source, .. } => source.status_code(),
            RouterError::UnknownController(_) | RouterError::Internal(_) => 500,
        }
    }

    /// Error envelope: `{success: false, status, error, context}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let context = match self {
            RouterError::NotFound {
                method,
                path,
                available,
            } => json!({ "method": method, "path": path, "available_routes": available }),
            RouterError::ParameterMismatch {
                route_path,
                path,
                declared,
                actual,
            } => json!({
                "route_path": route_path,
                "path": path,
                "declared": declared,
                "actual": actual,
            }),
            RouterError::MissingParameter { name, route_path } => {
                json!({ "parameter": name, "route_path": route_path })
            }
            RouterError::Validation(err) => json!({
                "errors": err.errors,
                "suggestions": err.suggestions,
            }),
            RouterError::Unauthenticated { method, path } => {
                json!({ "method": method, "path": path })
            }
            RouterError::Forbidden {
                method,
                path,
                user_id,
                required,
            } => json!({
                "method": method,
                "path": path,
                "user_id": user_id,
                "required": required,
            }),
            RouterError::Controller { class, method, .. } => {
                json!({ "class": class, "method": method })
            }
            RouterError::UnknownController(class) => json!({ "class": class }),
            RouterError::Internal(_) => json!({}),
        };

        json!({
            "success": false,
            "status": self.status_code(),
            "error": self.to_string(),
            "context": context,
        })
    }
}
