//! Read-only documentation views over the registered routes.
//!
//! Nothing here affects dispatch. Implied routes are synthesized from the
//! default CRUD controller's wildcard routes so a model's documentation shows
//! `/Users/{id}` even though only `/?/?` is registered.

use super::core::RouteRegistry;
use crate::controller::MODEL_BASE_CONTROLLER;
use crate::route::{is_dynamic_component, RouteRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Route counts for the `routes` overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutesSummary {
    pub total_routes: usize,
    pub by_method: BTreeMap<String, usize>,
    pub by_controller: BTreeMap<String, usize>,
    pub by_path_length: BTreeMap<usize, usize>,
}

/// One documented endpoint of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDoc {
    pub method: String,
    pub path: String,
    pub api_class: String,
    pub api_method: String,
    pub parameters: Vec<String>,
    /// Derived from a wildcard CRUD route rather than registered for the model.
    pub implied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDocumentation {
    pub model: String,
    pub endpoints: Vec<EndpointDoc>,
}

impl RouteRegistry {
    /// Routes registered specifically for `model`: those whose controller
    /// lives under `\Models\<model>\` or whose first literal component is the
    /// model name.
    #[must_use]
    pub fn get_model_routes(&self, model: &str) -> Vec<RouteRecord> {
        let segment = format!("\\Models\\{model}\\");
        self.table()
            .routes
            .iter()
            .filter(|r| {
                r.resolved_api_class.contains(&segment)
                    || r.path_components
                        .first()
                        .is_some_and(|c| c == model)
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get_routes_by_model(&self, models: &[String]) -> BTreeMap<String, Vec<RouteRecord>> {
        models
            .iter()
            .map(|m| (m.clone(), self.get_model_routes(m)))
            .collect()
    }

    #[must_use]
    pub fn get_routes_summary(&self) -> RoutesSummary {
        let table = self.table();
        let mut summary = RoutesSummary {
            total_routes: table.routes.len(),
            ..RoutesSummary::default()
        };
        for route in &table.routes {
            *summary.by_method.entry(route.method.clone()).or_default() += 1;
            *summary
                .by_controller
                .entry(route.short_class_name().to_string())
                .or_default() += 1;
            *summary.by_path_length.entry(route.path_length).or_default() += 1;
        }
        summary
    }

    /// Explicit model routes followed by the CRUD routes implied for it.
    /// An implied route is omitted when an explicit one has the same verb
    /// and path shape.
    #[must_use]
    pub fn get_endpoint_documentation(&self, model: &str) -> EndpointDocumentation {
        let explicit = self.get_model_routes(model);
        let mut endpoints: Vec<EndpointDoc> = explicit
            .iter()
            .map(|r| EndpointDoc {
                method: r.method.clone(),
                path: r.path.clone(),
                api_class: r.resolved_api_class.clone(),
                api_method: r.api_method.clone(),
                parameters: r.captured_parameter_names().map(str::to_string).collect(),
                implied: false,
            })
            .collect();

        let table = self.table();
        for route in table
            .routes
            .iter()
            .filter(|r| r.short_class_name() == MODEL_BASE_CONTROLLER)
        {
            let shadowed = explicit.iter().any(|e| {
                e.method == route.method && same_shape(e, route, model)
            });
            if shadowed {
                continue;
            }
            endpoints.push(EndpointDoc {
                method: route.method.clone(),
                path: implied_path(route, model),
                api_class: route.resolved_api_class.clone(),
                api_method: route.api_method.clone(),
                parameters: route
                    .captured_parameter_names()
                    .filter(|n| *n != "modelName")
                    .map(str::to_string)
                    .collect(),
                implied: true,
            });
        }

        EndpointDocumentation {
            model: model.to_string(),
            endpoints,
        }
    }
}

/// `/?/?` with `["modelName", "id"]` for `Users` → `/Users/{id}`.
fn implied_path(route: &RouteRecord, model: &str) -> String {
    let parts: Vec<String> = route
        .path_components
        .iter()
        .zip(&route.parameter_names)
        .map(|(component, name)| {
            if name == "modelName" {
                model.to_string()
            } else if is_dynamic_component(component) {
                let name = if name.is_empty() { "param" } else { name.as_str() };
                format!("{{{name}}}")
            } else {
                component.clone()
            }
        })
        .collect();
    format!("/{}", parts.join("/"))
}

/// Whether an explicit model route covers the same URLs as a CRUD route
/// once its `modelName` slot is filled with `model`.
fn same_shape(explicit: &RouteRecord, crud: &RouteRecord, model: &str) -> bool {
    explicit.path_length == crud.path_length
        && explicit
            .path_components
            .iter()
            .zip(crud.path_components.iter().zip(&crud.parameter_names))
            .all(|(e, (c, name))| {
                if name == "modelName" {
                    e == model || is_dynamic_component(e)
                } else if is_dynamic_component(c) {
                    is_dynamic_component(e)
                } else {
                    e == c
                }
            })
}
