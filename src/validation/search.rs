use crate::model::{FieldCapabilities, ModelDefinition};
use crate::request::params::{SearchOperator, SearchSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Global search that passed validation; `fields` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSearch {
    pub term: String,
    pub fields: Vec<String>,
    pub operator: SearchOperator,
}

/// Validates global search requests against model metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// `None` when there is nothing to search: blank term or no usable field.
    #[must_use]
    pub fn validate_search_for_model(
        &self,
        search: &SearchSpec,
        model: &ModelDefinition,
    ) -> Option<ValidatedSearch> {
        self.validate_with_dropped(search, model).0
    }

    /// Like [`Self::validate_search_for_model`], also returning the requested
    /// fields that were dropped, with the reason.
    #[must_use]
    pub fn validate_with_dropped(
        &self,
        search: &SearchSpec,
        model: &ModelDefinition,
    ) -> (Option<ValidatedSearch>, Vec<String>) {
        let term = search.term.trim();
        if term.is_empty() {
            return (None, Vec::new());
        }

        let requested = if search.fields.is_empty() {
            model.default_search_fields()
        } else {
            search.fields.clone()
        };

        let mut fields = Vec::new();
        let mut dropped = Vec::new();
        for name in requested {
            let reason = match model.field(&name) {
                None => Some("does not exist"),
                Some(f) if !f.is_db_field() => Some("is not a database field"),
                Some(f) if !f.is_searchable() => Some("is not searchable"),
                Some(_) => None,
            };
            match reason {
                Some(reason) => {
                    warn!(model = %model.name, field = %name, reason, "Search field dropped");
                    dropped.push(format!("search field '{name}' {reason}"));
                }
                None if fields.contains(&name) => {}
                None => fields.push(name),
            }
        }

        if fields.is_empty() {
            debug!(model = %model.name, term, "No searchable fields left, search dropped");
            return (None, dropped);
        }

        let validated = ValidatedSearch {
            term: term.to_string(),
            fields,
            operator: search.operator,
        };
        (Some(validated), dropped)
    }
}
