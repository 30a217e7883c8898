use super::ids::RequestId;
use super::params::{ParsedParams, RawParams, DEFAULT_RESPONSE_FORMAT};
use crate::error::RouterError;
use crate::route::{parse_path_components, RouteRecord};
use crate::validation::ValidatedParams;
use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

/// Route parameters stored inline before spilling to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Named path parameters bound from the matched route.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One incoming call, bound to the route that matched it.
#[derive(Debug, Clone)]
pub struct Request {
    pub request_id: RequestId,
    pub method: Method,
    /// Path as requested.
    pub path: String,
    /// Path of the route that matched.
    pub route_path: String,
    params: ParamVec,
    request_data: RawParams,
    parsed: Option<ParsedParams>,
    validated: Option<ValidatedParams>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, params: ParamVec, request_data: RawParams) -> Self {
        let path = path.into();
        Self {
            request_id: RequestId::new(),
            method,
            route_path: path.clone(),
            path,
            params,
            request_data,
            parsed: None,
            validated: None,
        }
    }

    /// Bind `path` to `route`: component `i` is captured under
    /// `route.parameter_names[i]` when that name is non-empty.
    ///
    /// Fails when the route's parameter names do not line up with the path's
    /// components.
    pub fn bind(
        method: Method,
        path: &str,
        route: &RouteRecord,
        request_data: RawParams,
    ) -> Result<Self, RouterError> {
        let components = parse_path_components(path);
        if route.parameter_names.len() != components.len() {
            return Err(RouterError::ParameterMismatch {
                route_path: route.path.clone(),
                path: path.to_string(),
                declared: route.parameter_names.len(),
                actual: components.len(),
            });
        }

        let params: ParamVec = route
            .parameter_names
            .iter()
            .zip(components)
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (Arc::from(name.as_str()), value))
            .collect();

        let mut request = Self::new(method, path, params, request_data);
        request.route_path = route.path.clone();
        Ok(request)
    }

    /// Bound path parameter. Last binding wins on duplicate names.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.params.iter().any(|(k, _)| k.as_ref() == name)
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Query string and body, as received.
    #[must_use]
    pub fn request_data(&self) -> &RawParams {
        &self.request_data
    }

    #[must_use]
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.request_data.get(key)
    }

    /// Request data with path parameters layered on top.
    #[must_use]
    pub fn all(&self) -> RawParams {
        let mut all = self.request_data.clone();
        for (name, value) in &self.params {
            all.insert(name.to_string(), Value::String(value.clone()));
        }
        all
    }

    /// `modelName` path parameter, when the route captures one.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.get("modelName").filter(|m| !m.is_empty())
    }

    pub fn set_parsed_params(&mut self, parsed: ParsedParams) {
        self.parsed = Some(parsed);
    }

    #[must_use]
    pub fn parsed_params(&self) -> Option<&ParsedParams> {
        self.parsed.as_ref()
    }

    pub fn set_validated_params(&mut self, validated: ValidatedParams) {
        self.validated = Some(validated);
    }

    #[must_use]
    pub fn validated_params(&self) -> Option<&ValidatedParams> {
        self.validated.as_ref()
    }

    /// Response format chosen during parameter parsing.
    #[must_use]
    pub fn response_format(&self) -> &str {
        self.parsed
            .as_ref()
            .map(|p| p.response_format.as_str())
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_RESPONSE_FORMAT)
    }
}
