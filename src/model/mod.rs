//! # Model Module
//!
//! The slice of model metadata the routing core consumes: which fields a
//! model has, what type each field is, whether it is persisted, which filter
//! operators it supports and whether it is searchable.
//!
//! Metadata loading and the ORM proper live outside this crate. The
//! [`ModelCatalog`] trait is the seam; [`StaticModelCatalog`] is a plain
//! in-memory implementation, deserializable from YAML or JSON.

mod field;
mod operator;

pub use field::{FieldCapabilities, FieldDefinition, FieldKind};
pub use operator::Operator;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Field metadata of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Fields a global search targets when the caller names none.
    #[serde(default)]
    pub searchable_fields: Vec<String>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            searchable_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_searchable_fields(mut self, fields: &[&str]) -> Self {
        self.searchable_fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn db_field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.is_db_field())
            .map(|f| f.name.as_str())
    }

    /// Declared searchable fields, or every searchable DB field when none are declared.
    #[must_use]
    pub fn default_search_fields(&self) -> Vec<String> {
        if !self.searchable_fields.is_empty() {
            return self.searchable_fields.clone();
        }
        self.fields
            .iter()
            .filter(|f| f.is_db_field() && f.is_searchable())
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Lookup of model metadata by model name.
pub trait ModelCatalog: Send + Sync {
    fn model(&self, name: &str) -> Option<Arc<ModelDefinition>>;

    fn model_names(&self) -> Vec<String>;
}

/// Fixed set of models held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticModelCatalog {
    models: BTreeMap<String, Arc<ModelDefinition>>,
}

impl StaticModelCatalog {
    pub fn new(models: impl IntoIterator<Item = ModelDefinition>) -> Self {
        let mut catalog = Self::default();
        for model in models {
            catalog.insert(model);
        }
        catalog
    }

    pub fn insert(&mut self, model: ModelDefinition) {
        self.models.insert(model.name.clone(), Arc::new(model));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelCatalog for StaticModelCatalog {
    fn model(&self, name: &str) -> Option<Arc<ModelDefinition>> {
        self.models.get(name).cloned()
    }

    fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }
}
