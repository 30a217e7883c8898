//! Advanced (hand-written client) requests.
//!
//! Recognized by `per_page`, `search_fields`, `include_*` flags, a
//! `field:direction` sort string, or `filter[...]` keys.

use super::common::{
    expand_brackets, extract_search, int_param, parse_bool_flag, parse_sort_list,
    sanitize_field_name, split_list, value_to_string, PageLimits,
};
use super::types::{FilterSpec, Pagination, ParseOptions, ParsedParams, RawParams, SortSpec};
use super::FormatParser;
use crate::model::Operator;
use serde_json::{Map, Value};
use tracing::debug;

const SIGNATURE_KEYS: [&str; 5] = [
    "per_page",
    "search_fields",
    "include_total",
    "include_available_filters",
    "include_metadata",
];

#[derive(Debug, Clone, Default)]
pub struct AdvancedRequestParser {
    limits: PageLimits,
}

impl AdvancedRequestParser {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    fn pagination(&self, raw: &RawParams) -> Pagination {
        let page = self.limits.page(int_param(raw, "page"));
        let requested = int_param(raw, "per_page")
            .or_else(|| int_param(raw, "pageSize"))
            .or_else(|| int_param(raw, "limit"));
        Pagination::from_page(page, self.limits.page_size(requested))
    }

    fn sorting(raw: &RawParams) -> Vec<SortSpec> {
        match raw.get("sort") {
            Some(Value::String(spec)) => parse_sort_list(spec, 0),
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(value_to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                parse_sort_list(&joined, 0)
            }
            _ => Vec::new(),
        }
    }

    fn filters(expanded: &Map<String, Value>, ignored: &mut Vec<String>) -> Vec<FilterSpec> {
        let Some(Value::Object(filter_map)) = expanded.get("filter") else {
            return Vec::new();
        };

        let mut filters = Vec::new();
        for (raw_field, spec) in filter_map {
            let field = sanitize_field_name(raw_field);
            if field.is_empty() {
                continue;
            }
            match spec {
                // filter[field][operator]=value
                Value::Object(by_operator) => {
                    for (op_name, value) in by_operator {
                        match Operator::parse_alias(op_name) {
                            Some(operator) => {
                                filters.push(FilterSpec::new(
                                    field.clone(),
                                    operator,
                                    normalize_value(operator, value),
                                ));
                            }
                            None => {
                                debug!(field = %field, operator = %op_name, "Unknown filter operator, skipped");
                                ignored.push(format!("filter[{field}][{op_name}]: unknown operator"));
                            }
                        }
                    }
                }
                // filter[field]=value
                other => {
                    filters.push(FilterSpec::new(
                        field,
                        Operator::Equals,
                        normalize_value(Operator::Equals, other),
                    ));
                }
            }
        }
        filters
    }

    fn options(raw: &RawParams) -> ParseOptions {
        let flag = |key: &str| raw.get(key).is_some_and(parse_bool_flag);
        ParseOptions {
            include_total: flag("include_total"),
            include_available_filters: flag("include_available_filters"),
            include_metadata: flag("include_metadata"),
        }
    }
}

/// Split comma strings for list operators; blank out valueless ones.
fn normalize_value(operator: Operator, value: &Value) -> Value {
    if operator.is_valueless() {
        return Value::Null;
    }
    if operator.takes_list() {
        return Value::Array(split_list(value));
    }
    value.clone()
}

impl FormatParser for AdvancedRequestParser {
    fn format_name(&self) -> &'static str {
        "advanced"
    }

    fn can_handle(&self, raw: &RawParams) -> bool {
        SIGNATURE_KEYS.iter().any(|k| raw.contains_key(*k))
            || matches!(raw.get("sort"), Some(Value::String(s)) if s.contains(':'))
            || matches!(raw.get("filter"), Some(Value::Object(_)))
            || raw.keys().any(|k| k.starts_with("filter["))
    }

    fn parse(&self, raw: &RawParams) -> ParsedParams {
        let expanded = expand_brackets(raw);
        let mut parsed = ParsedParams::new(self.pagination(raw));
        parsed.sorting = Self::sorting(raw);
        parsed.filters = Self::filters(&expanded, &mut parsed.meta.ignored);
        parsed.search = extract_search(raw);
        parsed.options = Self::options(raw);
        parsed
    }
}
