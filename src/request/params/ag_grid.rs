//! AG-Grid server-side row model requests.
//!
//! Signature: `startRow` and `endRow` both present. Sorting arrives as
//! `sort[i][colId]`/`sort[i][sort]` (or a `sortModel` JSON array), filters as
//! `filters[field][type]`/`filters[field][filter]` (or a `filterModel` JSON
//! object keyed by field).

use super::common::{
    expand_brackets, extract_search, indexed_values, int_param, json_param, sanitize_field_name,
    split_list, value_to_string, PageLimits,
};
use super::types::{FilterSpec, Pagination, ParsedParams, RawParams, SortDirection, SortSpec};
use super::FormatParser;
use crate::model::Operator;
use serde_json::{Map, Value};
use tracing::debug;

/// AG-Grid filter `type` to standard operator.
#[must_use]
pub fn map_ag_grid_operator(ag_type: &str) -> Option<Operator> {
    let op = match ag_type {
        "equals" => Operator::Equals,
        "notEqual" => Operator::NotEquals,
        "contains" => Operator::Contains,
        "startsWith" => Operator::StartsWith,
        "endsWith" => Operator::EndsWith,
        "lessThan" => Operator::LessThan,
        "lessThanOrEqual" => Operator::LessThanOrEqual,
        "greaterThan" => Operator::GreaterThan,
        "greaterThanOrEqual" => Operator::GreaterThanOrEqual,
        "inRange" => Operator::Between,
        "blank" => Operator::IsNull,
        "notBlank" => Operator::IsNotNull,
        "set" => Operator::In,
        _ => return None,
    };
    Some(op)
}

#[derive(Debug, Clone, Default)]
pub struct AgGridRequestParser {
    limits: PageLimits,
}

impl AgGridRequestParser {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    fn pagination(&self, raw: &RawParams) -> Pagination {
        let start_row = int_param(raw, "startRow").unwrap_or(0).max(0);
        let end_row = int_param(raw, "endRow")
            .unwrap_or_else(|| start_row.saturating_add(self.limits.default_page_size as i64));
        let page_size = self.limits.page_size(Some(end_row.saturating_sub(start_row)));
        let start = start_row as u64;

        Pagination {
            page: start / page_size + 1,
            page_size,
            offset: start,
            limit: page_size,
            extras: Map::new(),
        }
        .with_extra("startRow", start_row)
        .with_extra("endRow", end_row)
    }

    fn sorting(&self, expanded: &Map<String, Value>, raw: &RawParams) -> Vec<SortSpec> {
        let entries: Vec<Value> = match expanded.get("sort") {
            Some(sort @ (Value::Object(_) | Value::Array(_))) => {
                indexed_values(sort).into_iter().cloned().collect()
            }
            _ => match json_param(raw, "sortModel") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
        };

        entries
            .iter()
            .filter_map(|entry| {
                let field = entry.get("colId").and_then(value_to_string)?;
                let field = sanitize_field_name(&field);
                if field.is_empty() {
                    return None;
                }
                let direction = entry
                    .get("sort")
                    .and_then(value_to_string)
                    .map(|d| SortDirection::parse(&d))
                    .unwrap_or_default();
                Some((field, direction))
            })
            .enumerate()
            .map(|(priority, (field, direction))| SortSpec::new(field, direction, priority))
            .collect()
    }

    fn filters(
        &self,
        expanded: &Map<String, Value>,
        raw: &RawParams,
        ignored: &mut Vec<String>,
    ) -> Vec<FilterSpec> {
        let model = match expanded.get("filters") {
            Some(Value::Object(map)) => map.clone(),
            _ => match json_param(raw, "filterModel") {
                Some(Value::Object(map)) if !map.contains_key("items") => map,
                _ => Map::new(),
            },
        };

        let mut filters = Vec::new();
        for (raw_field, spec) in &model {
            let field = sanitize_field_name(raw_field);
            if field.is_empty() {
                continue;
            }
            match Self::filter_for(&field, spec) {
                Some(filter) => filters.push(filter),
                None => {
                    debug!(field = %field, "AG-Grid filter not translatable, skipped");
                    ignored.push(format!("filters[{field}]: unsupported filter"));
                }
            }
        }
        filters
    }

    fn filter_for(field: &str, spec: &Value) -> Option<FilterSpec> {
        let Value::Object(spec) = spec else {
            let value = value_to_string(spec)?;
            return Some(FilterSpec::new(field, Operator::Equals, value));
        };

        let filter_type = spec.get("filterType").and_then(value_to_string);
        let ag_type = match (spec.get("type").and_then(value_to_string), filter_type.as_deref()) {
            (Some(t), _) => t,
            (None, Some("set")) => "set".to_string(),
            (None, _) => "equals".to_string(),
        };
        let operator = map_ag_grid_operator(&ag_type)?;

        let primary = if filter_type.as_deref() == Some("date") {
            spec.get("dateFrom").or_else(|| spec.get("filter"))
        } else {
            spec.get("filter")
        };
        let secondary = if filter_type.as_deref() == Some("date") {
            spec.get("dateTo").or_else(|| spec.get("filterTo"))
        } else {
            spec.get("filterTo")
        };

        let value = match operator {
            Operator::IsNull | Operator::IsNotNull => Value::Null,
            Operator::Between => Value::Array(vec![
                primary.cloned().unwrap_or(Value::Null),
                secondary.cloned().unwrap_or(Value::Null),
            ]),
            Operator::In => Value::Array(split_list(spec.get("values").or(primary)?)),
            _ => primary.cloned()?,
        };
        Some(FilterSpec::new(field, operator, value))
    }
}

impl FormatParser for AgGridRequestParser {
    fn format_name(&self) -> &'static str {
        "ag-grid"
    }

    fn can_handle(&self, raw: &RawParams) -> bool {
        raw.contains_key("startRow") && raw.contains_key("endRow")
    }

    fn parse(&self, raw: &RawParams) -> ParsedParams {
        let expanded = expand_brackets(raw);
        let mut parsed = ParsedParams::new(self.pagination(raw));
        parsed.sorting = self.sorting(&expanded, raw);
        parsed.filters = self.filters(&expanded, raw, &mut parsed.meta.ignored);
        parsed.search = extract_search(raw);
        if parsed.search.is_empty() {
            if let Some(term) = raw.get("quickFilter").and_then(value_to_string) {
                parsed.search.term = term.trim().to_string();
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ParsedParams {
        AgGridRequestParser::default().parse(value.as_object().unwrap())
    }

    #[test]
    fn test_page_math() {
        let parsed = parse(json!({"startRow": 20, "endRow": 40}));
        let p = &parsed.pagination;
        assert_eq!((p.page, p.page_size, p.offset, p.limit), (2, 20, 20, 20));
        assert_eq!(p.extras["startRow"], 20);
        assert_eq!(p.extras["endRow"], 40);
    }

    #[test]
    fn test_page_size_clamped() {
        let parsed = parse(json!({"startRow": "0", "endRow": "5000"}));
        assert_eq!(parsed.pagination.page_size, 1000);
        let parsed = parse(json!({"startRow": 10, "endRow": 10}));
        assert_eq!(parsed.pagination.page_size, 1);
        assert_eq!(parsed.pagination.page, 11);
    }

    #[test]
    fn test_extreme_rows_do_not_overflow() {
        let parsed = parse(json!({"startRow": "9223372036854775807", "endRow": "-10"}));
        let p = &parsed.pagination;
        assert_eq!(p.page_size, 1);
        assert_eq!(p.offset, i64::MAX as u64);
        assert_eq!(p.page, i64::MAX as u64 + 1);

        let parsed = parse(json!({"startRow": "9223372036854775807"}));
        assert_eq!(parsed.pagination.page_size, 1);
        assert_eq!(parsed.pagination.extras["endRow"], i64::MAX);

        let parsed = parse(json!({"startRow": -50, "endRow": "-9223372036854775808"}));
        let p = &parsed.pagination;
        assert_eq!((p.page, p.page_size, p.offset), (1, 1, 0));
    }

    #[test]
    fn test_bracket_sort_in_index_order() {
        let parsed = parse(json!({
            "startRow": 0, "endRow": 100,
            "sort[1][colId]": "name", "sort[1][sort]": "asc",
            "sort[0][colId]": "created_at", "sort[0][sort]": "desc",
        }));
        let sorting: Vec<(&str, SortDirection)> = parsed
            .sorting
            .iter()
            .map(|s| (s.field.as_str(), s.direction))
            .collect();
        assert_eq!(
            sorting,
            vec![("created_at", SortDirection::Desc), ("name", SortDirection::Asc)]
        );
    }

    #[test]
    fn test_bracket_filters_translate_operators() {
        let parsed = parse(json!({
            "startRow": 0, "endRow": 100,
            "filters[age][type]": "inRange",
            "filters[age][filter]": 18,
            "filters[age][filterTo]": 65,
            "filters[email][type]": "blank",
            "filters[name][type]": "notEqual",
            "filters[name][filter]": "bob",
            "filters[nick][type]": "fuzzy",
            "filters[nick][filter]": "x",
        }));
        let by_field = |f: &str| parsed.filters.iter().find(|x| x.field == f).cloned();
        let age = by_field("age").unwrap();
        assert_eq!(age.operator, Operator::Between);
        assert_eq!(age.value, json!([18, 65]));
        assert_eq!(by_field("email").unwrap().operator, Operator::IsNull);
        assert_eq!(by_field("name").unwrap().operator, Operator::NotEquals);
        assert!(by_field("nick").is_none());
        assert_eq!(parsed.meta.ignored.len(), 1);
    }

    #[test]
    fn test_filter_model_json() {
        let parsed = parse(json!({
            "startRow": 0, "endRow": 50,
            "filterModel": r#"{"status":{"filterType":"set","values":["a","b"]}}"#,
            "sortModel": r#"[{"colId":"name","sort":"desc"}]"#,
        }));
        assert_eq!(parsed.filters[0].operator, Operator::In);
        assert_eq!(parsed.filters[0].value, json!(["a", "b"]));
        assert_eq!(parsed.sorting[0].direction, SortDirection::Desc);
    }
}
