use super::ApiController;
use crate::error::ApiError;
use crate::model::{ModelCatalog, ModelDefinition};
use crate::repository::ModelRepository;
use crate::request::Request;
use crate::response::{ResponseFormatter, ResponseMeta};
use crate::route::RouteDeclaration;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

/// Short class name of the default CRUD controller.
pub const MODEL_BASE_CONTROLLER: &str = "ModelBaseAPIController";

const METHODS: [&str; 7] = [
    "list",
    "listDeleted",
    "retrieve",
    "create",
    "update",
    "delete",
    "restore",
];

/// Generic CRUD for every model, reached through wildcard routes.
pub struct ModelBaseApiController {
    class_name: String,
    catalog: Arc<dyn ModelCatalog>,
    repository: Arc<dyn ModelRepository>,
    formatter: ResponseFormatter,
}

impl ModelBaseApiController {
    /// Registered as `<namespace>\Models\Api\Api\ModelBaseAPIController`.
    pub fn new(
        namespace: &str,
        catalog: Arc<dyn ModelCatalog>,
        repository: Arc<dyn ModelRepository>,
    ) -> Self {
        Self {
            class_name: format!("{namespace}\\Models\\Api\\Api\\{MODEL_BASE_CONTROLLER}"),
            catalog,
            repository,
            formatter: ResponseFormatter::new(),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: ResponseFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    fn model(&self, request: &Request) -> Result<Arc<ModelDefinition>, ApiError> {
        let name = request
            .model_name()
            .ok_or_else(|| ApiError::BadRequest("model name is required".to_string()))?;
        self.catalog
            .model(name)
            .ok_or_else(|| ApiError::NotFound(format!("model '{name}' not found")))
    }

    fn id<'r>(&self, request: &'r Request) -> Result<&'r str, ApiError> {
        request
            .get("id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("record id is required".to_string()))
    }

    /// Request data restricted to the model's DB fields, minus the id.
    fn record_data(&self, model: &ModelDefinition, request: &Request) -> Result<Map<String, Value>, ApiError> {
        let data: Map<String, Value> = request
            .request_data()
            .iter()
            .filter(|(key, _)| key.as_str() != "id" && model.db_field_names().any(|f| f == key.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if data.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "no writable {} fields in request",
                model.name
            )));
        }
        Ok(data)
    }

    fn list(&self, request: &Request, deleted: bool) -> Result<Value, ApiError> {
        let model = self.model(request)?;
        let params = request.validated_params().ok_or_else(|| {
            ApiError::Internal("list parameters were not validated for this request".to_string())
        })?;
        let result = if deleted {
            self.repository.list_deleted(&model, params)?
        } else {
            self.repository.list(&model, params)?
        };
        let meta = ResponseMeta::from_validated(params)
            .with_total(result.total)
            .with_path(request.path.clone());
        Ok(self
            .formatter
            .format(Value::Array(result.rows), &meta, request.response_format()))
    }

    fn retrieve(&self, request: &Request) -> Result<Value, ApiError> {
        let model = self.model(request)?;
        let id = self.id(request)?;
        let record = self
            .repository
            .find(&model, id)?
            .ok_or_else(|| not_found(&model, id))?;
        Ok(json!({ "success": true, "data": record }))
    }

    fn create(&self, request: &Request) -> Result<Value, ApiError> {
        let model = self.model(request)?;
        let data = self.record_data(&model, request)?;
        let record = self.repository.create(&model, data)?;
        info!(model = %model.name, id = %record["id"], "Record created");
        Ok(json!({ "success": true, "data": record, "message": format!("{} created", model.name) }))
    }

    fn update(&self, request: &Request) -> Result<Value, ApiError> {
        let model = self.model(request)?;
        let id = self.id(request)?;
        let data = self.record_data(&model, request)?;
        let record = self
            .repository
            .update(&model, id, data)?
            .ok_or_else(|| not_found(&model, id))?;
        Ok(json!({ "success": true, "data": record, "message": format!("{} updated", model.name) }))
    }

    fn delete(&self, request: &Request) -> Result<Value, ApiError> {
        let model = self.model(request)?;
        let id = self.id(request)?;
        if !self.repository.delete(&model, id)? {
            return Err(not_found(&model, id));
        }
        info!(model = %model.name, id, "Record soft-deleted");
        Ok(json!({ "success": true, "data": null, "message": format!("{} deleted", model.name) }))
    }

    fn restore(&self, request: &Request) -> Result<Value, ApiError> {
        let model = self.model(request)?;
        let id = self.id(request)?;
        let record = self
            .repository
            .restore(&model, id)?
            .ok_or_else(|| ApiError::NotFound(format!("no deleted {} record '{id}'", model.name)))?;
        Ok(json!({ "success": true, "data": record, "message": format!("{} restored", model.name) }))
    }
}

fn not_found(model: &ModelDefinition, id: &str) -> ApiError {
    ApiError::NotFound(format!("{} record '{id}' not found", model.name))
}

impl ApiController for ModelBaseApiController {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn register_routes(&self) -> Vec<RouteDeclaration> {
        let class = self.class_name.as_str();
        vec![
            RouteDeclaration::new("GET", "/?", class, "list", &["modelName"]),
            RouteDeclaration::new("GET", "/?/deleted", class, "listDeleted", &["modelName", ""]),
            RouteDeclaration::new("GET", "/?/?", class, "retrieve", &["modelName", "id"]),
            RouteDeclaration::new("POST", "/?", class, "create", &["modelName"]),
            RouteDeclaration::new("PUT", "/?/?", class, "update", &["modelName", "id"]),
            RouteDeclaration::new("PATCH", "/?/?", class, "update", &["modelName", "id"]),
            RouteDeclaration::new("DELETE", "/?/?", class, "delete", &["modelName", "id"]),
            RouteDeclaration::new("PUT", "/?/?/restore", class, "restore", &["modelName", "id", ""])
                .with_rbac_action("update"),
        ]
    }

    fn has_method(&self, method: &str) -> bool {
        METHODS.contains(&method)
    }

    fn invoke(&self, method: &str, request: &Request) -> Result<Value, ApiError> {
        match method {
            "list" => self.list(request, false),
            "listDeleted" => self.list(request, true),
            "retrieve" => self.retrieve(request),
            "create" => self.create(request),
            "update" => self.update(request),
            "delete" => self.delete(request),
            "restore" => self.restore(request),
            other => Err(ApiError::Internal(format!(
                "{MODEL_BASE_CONTROLLER} has no method '{other}'"
            ))),
        }
    }
}
