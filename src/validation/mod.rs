//! # Validation Module
//!
//! Model-aware validation of a normalized request:
//!
//! - [`FilterCriteria`] checks each filter's field, operator and value and
//!   drops the ones that fail.
//! - [`SearchEngine`] resolves search fields and drops the search when no
//!   searchable field remains.
//! - [`ParamsValidator`] runs both, then checks sorting and pagination.
//!   Sorting and pagination problems are accumulated in a
//!   [`ValidationResult`] and reported together as one
//!   [`ParameterValidationError`].
//!
//! Dropped filters and search fields are not errors. They are logged and
//! listed in [`ValidatedParams::warnings`].

mod filter;
mod result;
mod search;

pub use filter::{
    parse_datetime, validate_value, FilterCriteria, FilterReport, RejectedFilter,
    ValidatedFilter, CANONICAL_DATETIME_FORMAT,
};
pub use result::ValidationResult;
pub use search::{SearchEngine, ValidatedSearch};

use crate::error::ParameterValidationError;
use crate::model::{FieldCapabilities, ModelDefinition};
use crate::request::params::{PageLimits, Pagination, ParseOptions, ParsedParams, SortSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request parameters after model-aware validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedParams {
    pub model: String,
    pub pagination: Pagination,
    pub sorting: Vec<SortSpec>,
    pub filters: Vec<ValidatedFilter>,
    pub search: Option<ValidatedSearch>,
    pub response_format: String,
    pub options: ParseOptions,
    pub warnings: Vec<String>,
}

/// Runs filter, search, sorting and pagination validation for one model.
#[derive(Debug, Clone, Default)]
pub struct ParamsValidator {
    filters: FilterCriteria,
    search: SearchEngine,
    limits: PageLimits,
}

impl ParamsValidator {
    pub fn new(limits: PageLimits) -> Self {
        Self {
            filters: FilterCriteria::new(),
            search: SearchEngine::new(),
            limits,
        }
    }

    pub fn validate_for_model(
        &self,
        parsed: &ParsedParams,
        model: &ModelDefinition,
    ) -> Result<ValidatedParams, ParameterValidationError> {
        let mut result = ValidationResult::new();
        for ignored in &parsed.meta.ignored {
            result.add_warning(format!("ignored parameter {ignored}"));
        }

        let report = self.filters.validate_with_report(&parsed.filters, model);
        for rejected in &report.rejected {
            result.add_warning(format!(
                "filter on '{}' ({}) dropped: {}",
                rejected.field, rejected.operator, rejected.reason
            ));
        }

        let (search, dropped) = self.search.validate_with_dropped(&parsed.search, model);
        for reason in dropped {
            result.add_warning(reason);
        }

        let sorting = self.check_sorting(&parsed.sorting, model, &mut result);
        self.check_pagination(&parsed.pagination, &mut result);

        let warnings = result.take_warnings();
        result.into_result()?;

        debug!(
            model = %model.name,
            filters = report.accepted.len(),
            sorts = sorting.len(),
            search = search.is_some(),
            warnings = warnings.len(),
            "Request parameters validated"
        );

        Ok(ValidatedParams {
            model: model.name.clone(),
            pagination: parsed.pagination.clone(),
            sorting,
            filters: report.accepted,
            search,
            response_format: parsed.response_format.clone(),
            options: parsed.options,
            warnings,
        })
    }

    fn check_sorting(
        &self,
        sorting: &[SortSpec],
        model: &ModelDefinition,
        result: &mut ValidationResult,
    ) -> Vec<SortSpec> {
        let mut accepted: Vec<SortSpec> = Vec::new();
        for sort in sorting {
            match model.field(&sort.field) {
                None => {
                    result.add_error(
                        sort.field.as_str(),
                        format!("cannot sort by unknown field '{}'", sort.field),
                    );
                }
                Some(field) if !field.is_db_field() => {
                    result.add_error(
                        sort.field.as_str(),
                        format!("cannot sort by non-database field '{}'", sort.field),
                    );
                }
                Some(_) if accepted.iter().any(|s| s.field == sort.field) => {
                    result.add_warning(format!("duplicate sort on '{}' ignored", sort.field));
                }
                Some(_) => {
                    accepted.push(SortSpec::new(
                        sort.field.clone(),
                        sort.direction,
                        accepted.len(),
                    ));
                }
            }
        }
        if result.has_errors() {
            let sortable: Vec<&str> = model.db_field_names().collect();
            result.add_suggestion(format!("Sortable fields: {}", sortable.join(", ")));
        }
        accepted
    }

    fn check_pagination(&self, pagination: &Pagination, result: &mut ValidationResult) {
        if pagination.page < 1 {
            result.add_error("page", "page must be at least 1");
        }
        if pagination.page_size < 1 {
            result.add_error("pageSize", "pageSize must be at least 1");
        }
        if pagination.page_size > self.limits.max_page_size {
            result.add_error(
                "pageSize",
                format!(
                    "pageSize {} exceeds the maximum of {}",
                    pagination.page_size, self.limits.max_page_size
                ),
            );
            result.add_suggestion(format!(
                "Request at most {} rows per page",
                self.limits.max_page_size
            ));
        }
    }
}
