//! Fallback strategy: plain `?key=value` query strings.
//!
//! Every non-reserved scalar key is an implicit `equals` filter. Handles any
//! input, so it must sit last in the priority list.

use super::common::{
    extract_search, int_param, parse_sort_list, sanitize_field_name, str_param, value_to_i64,
    PageLimits,
};
use super::types::{FilterSpec, Pagination, ParsedParams, RawParams, SortDirection, SortSpec};
use super::FormatParser;
use crate::model::Operator;
use serde_json::Value;

/// Keys that never become filters.
pub const RESERVED_PARAMS: &[&str] = &[
    "page",
    "pageSize",
    "per_page",
    "offset",
    "limit",
    "sortBy",
    "sortOrder",
    "sort",
    "search",
    "search_fields",
    "search_operator",
    "q",
    "include_total",
    "include_available_filters",
    "include_metadata",
    "responseFormat",
    "format",
];

#[derive(Debug, Clone, Default)]
pub struct SimpleRequestParser {
    limits: PageLimits,
}

impl SimpleRequestParser {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    fn pagination(&self, raw: &RawParams) -> Pagination {
        let page_size = self.limits.page_size(
            int_param(raw, "pageSize")
                .or_else(|| int_param(raw, "per_page"))
                .or_else(|| int_param(raw, "limit")),
        );
        match raw.get("offset").and_then(value_to_i64) {
            Some(offset) if !raw.contains_key("page") => {
                let offset = offset.max(0) as u64;
                Pagination {
                    page: offset / page_size + 1,
                    page_size,
                    offset,
                    limit: page_size,
                    extras: Default::default(),
                }
            }
            _ => Pagination::from_page(self.limits.page(int_param(raw, "page")), page_size),
        }
    }

    fn sorting(raw: &RawParams) -> Vec<SortSpec> {
        if let Some(field) = str_param(raw, "sortBy") {
            let field = sanitize_field_name(&field);
            if field.is_empty() {
                return Vec::new();
            }
            let direction = str_param(raw, "sortOrder")
                .map(|d| SortDirection::parse(&d))
                .unwrap_or_default();
            return vec![SortSpec::new(field, direction, 0)];
        }
        str_param(raw, "sort")
            .map(|spec| parse_sort_list(&spec, 0))
            .unwrap_or_default()
    }

    fn filters(raw: &RawParams, ignored: &mut Vec<String>) -> Vec<FilterSpec> {
        let mut filters = Vec::new();
        for (key, value) in raw {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                continue;
            }
            if key.contains('[') || matches!(value, Value::Array(_) | Value::Object(_) | Value::Null)
            {
                ignored.push(format!("{key}: not a scalar filter"));
                continue;
            }
            let field = sanitize_field_name(key);
            if field.is_empty() {
                continue;
            }
            filters.push(FilterSpec::new(field, Operator::Equals, value.clone()));
        }
        filters
    }
}

impl FormatParser for SimpleRequestParser {
    fn format_name(&self) -> &'static str {
        "simple"
    }

    fn can_handle(&self, _raw: &RawParams) -> bool {
        true
    }

    fn parse(&self, raw: &RawParams) -> ParsedParams {
        let mut parsed = ParsedParams::new(self.pagination(raw));
        parsed.sorting = Self::sorting(raw);
        parsed.filters = Self::filters(raw, &mut parsed.meta.ignored);
        parsed.search = extract_search(raw);
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ParsedParams {
        SimpleRequestParser::default().parse(value.as_object().unwrap())
    }

    #[test]
    fn test_unreserved_keys_become_equals_filters() {
        let parsed = parse(json!({"status": "active", "page": "2"}));
        assert_eq!(
            parsed.filters,
            vec![FilterSpec::new("status", Operator::Equals, "active")]
        );
        assert_eq!(parsed.pagination.page, 2);
        assert_eq!(parsed.pagination.offset, 20);
    }

    #[test]
    fn test_extreme_page_and_offset() {
        let parsed = parse(json!({"page": "9223372036854775807"}));
        assert_eq!(parsed.pagination.page, i64::MAX as u64);
        assert_eq!(parsed.pagination.offset, u64::MAX);

        let parsed = parse(json!({"offset": "9223372036854775807", "limit": 1}));
        assert_eq!(parsed.pagination.offset, i64::MAX as u64);
        assert_eq!(parsed.pagination.page, i64::MAX as u64 + 1);

        let parsed = parse(json!({"offset": -40, "limit": -5}));
        let p = &parsed.pagination;
        assert_eq!((p.page, p.page_size, p.offset), (1, 1, 0));
    }

    #[test]
    fn test_sort_by_and_order() {
        let parsed = parse(json!({"sortBy": "name", "sortOrder": "DESC"}));
        assert_eq!(parsed.sorting, vec![SortSpec::new("name", SortDirection::Desc, 0)]);

        let parsed = parse(json!({"sort": "age,name:desc"}));
        assert_eq!(parsed.sorting.len(), 2);
        assert_eq!(parsed.sorting[1].direction, SortDirection::Desc);
    }

    #[test]
    fn test_offset_pagination() {
        let parsed = parse(json!({"offset": 40, "limit": 20}));
        assert_eq!(parsed.pagination.page, 3);
        assert_eq!(parsed.pagination.offset, 40);
    }

    #[test]
    fn test_reserved_and_structured_keys_skipped() {
        let parsed = parse(json!({
            "search": "ann",
            "format": "mui",
            "tags[]": "x",
            "nested": {"a": 1},
            "na;me": "bob",
        }));
        assert_eq!(parsed.filters, vec![FilterSpec::new("name", Operator::Equals, "bob")]);
        assert_eq!(parsed.search.term, "ann");
        assert_eq!(parsed.meta.ignored.len(), 2);
    }
}
