use super::ApiController;
use crate::error::ApiError;
use crate::request::Request;
use crate::route::RouteDeclaration;
use serde_json::{json, Map, Value};

/// Controller declared in a manifest. Every method it declares answers with
/// the route that matched and the parameters bound to it.
#[derive(Debug, Clone)]
pub struct EchoController {
    class_name: String,
    routes: Vec<RouteDeclaration>,
}

impl EchoController {
    /// Routes whose `apiClass` is empty are attributed to this controller.
    pub fn new(class_name: impl Into<String>, routes: Vec<RouteDeclaration>) -> Self {
        let class_name = class_name.into();
        let routes = routes
            .into_iter()
            .map(|mut r| {
                if r.api_class.is_empty() {
                    r.api_class = class_name.clone();
                }
                r
            })
            .collect();
        Self { class_name, routes }
    }
}

impl ApiController for EchoController {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn register_routes(&self) -> Vec<RouteDeclaration> {
        self.routes.clone()
    }

    fn has_method(&self, method: &str) -> bool {
        self.routes.iter().any(|r| r.api_method == method)
    }

    fn invoke(&self, method: &str, request: &Request) -> Result<Value, ApiError> {
        let params: Map<String, Value> = request
            .params()
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect();
        Ok(json!({
            "success": true,
            "data": {
                "controller": self.class_name,
                "method": method,
                "httpMethod": request.method.as_str(),
                "path": request.path,
                "route": request.route_path,
                "params": params,
                "query": request.request_data(),
                "requestId": request.request_id,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::params::RawParams;
    use crate::route::RouteRecord;
    use http::Method;

    #[test]
    fn test_echoes_bound_params() {
        let decl = RouteDeclaration::new("GET", "/health/?", "", "check", &["", "probe"]);
        let controller = EchoController::new("App\\HealthController", vec![decl]);
        assert_eq!(controller.register_routes()[0].api_class, "App\\HealthController");
        assert!(controller.has_method("check"));
        assert!(!controller.has_method("other"));

        let route = RouteRecord::from_declaration(
            &controller.register_routes()[0],
            &Method::GET,
            "App\\HealthController".into(),
        );
        let request = Request::bind(Method::GET, "/health/db", &route, RawParams::new()).unwrap();
        let body = controller.invoke("check", &request).unwrap();
        assert_eq!(body["data"]["params"]["probe"], "db");
        assert_eq!(body["data"]["route"], "/health/?");
    }
}
