//! MUI DataGrid requests.
//!
//! Page is 0-based on the wire. `sortModel` and `filterModel` arrive as
//! JSON-encoded strings; malformed JSON degrades to "no sorting"/"no filters".

use super::common::{
    extract_search, format_hint, int_param, json_param, sanitize_field_name, split_list,
    value_to_string, PageLimits,
};
use super::types::{FilterSpec, Pagination, ParsedParams, RawParams, SortDirection, SortSpec};
use super::FormatParser;
use crate::model::Operator;
use serde_json::Value;
use tracing::debug;

/// MUI filter operator (string, number, date and boolean vocabularies) to standard operator.
#[must_use]
pub fn map_mui_operator(mui: &str) -> Option<Operator> {
    let op = match mui {
        "contains" => Operator::Contains,
        "equals" | "is" | "=" | "eq" => Operator::Equals,
        "not" | "!=" | "ne" => Operator::NotEquals,
        "startsWith" => Operator::StartsWith,
        "endsWith" => Operator::EndsWith,
        "isEmpty" => Operator::IsNull,
        "isNotEmpty" => Operator::IsNotNull,
        "isAnyOf" => Operator::In,
        ">" | "gt" | "after" => Operator::GreaterThan,
        ">=" | "gte" | "onOrAfter" => Operator::GreaterThanOrEqual,
        "<" | "lt" | "before" => Operator::LessThan,
        "<=" | "lte" | "onOrBefore" => Operator::LessThanOrEqual,
        _ => return None,
    };
    Some(op)
}

#[derive(Debug, Clone, Default)]
pub struct MuiDataGridRequestParser {
    limits: PageLimits,
}

impl MuiDataGridRequestParser {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    fn pagination(&self, raw: &RawParams) -> Pagination {
        let zero_based = int_param(raw, "page").unwrap_or(0).max(0);
        let page_size = self.limits.page_size(int_param(raw, "pageSize"));
        Pagination::from_page(zero_based as u64 + 1, page_size)
    }

    fn sorting(raw: &RawParams) -> Vec<SortSpec> {
        let Some(Value::Array(items)) = json_param(raw, "sortModel") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let field = sanitize_field_name(&item.get("field").and_then(value_to_string)?);
                if field.is_empty() {
                    return None;
                }
                let direction = item
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

    fn filters(filter_model: Option<&Value>, ignored: &mut Vec<String>) -> Vec<FilterSpec> {
        let Some(items) = filter_model.and_then(|m| m.get("items")).and_then(Value::as_array)
        else {
            return Vec::new();
        };

        let mut filters = Vec::new();
        for item in items {
            let field = item
                .get("field")
                .or_else(|| item.get("columnField"))
                .and_then(value_to_string)
                .map(|f| sanitize_field_name(&f))
                .unwrap_or_default();
            let mui_op = item
                .get("operator")
                .or_else(|| item.get("operatorValue"))
                .and_then(value_to_string)
                .unwrap_or_else(|| "equals".to_string());
            if field.is_empty() {
                continue;
            }
            let Some(operator) = map_mui_operator(&mui_op) else {
                debug!(field = %field, operator = %mui_op, "MUI filter operator not mapped, skipped");
                ignored.push(format!("filterModel.{field}: unsupported operator '{mui_op}'"));
                continue;
            };

            let value = item.get("value").cloned().unwrap_or(Value::Null);
            let value = match operator {
                Operator::IsNull | Operator::IsNotNull => Value::Null,
                Operator::In => Value::Array(split_list(&value)),
                _ => value,
            };
            let empty = match &value {
                Value::Null => !operator.is_valueless(),
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                _ => false,
            };
            if empty {
                continue;
            }
            filters.push(FilterSpec::new(field, operator, value));
        }
        filters
    }

    fn quick_filter(filter_model: Option<&Value>) -> Option<String> {
        let values = filter_model?.get("quickFilterValues")?.as_array()?;
        let term = values
            .iter()
            .filter_map(value_to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let term = term.trim();
        (!term.is_empty()).then(|| term.to_string())
    }
}

impl FormatParser for MuiDataGridRequestParser {
    fn format_name(&self) -> &'static str {
        "mui"
    }

    fn can_handle(&self, raw: &RawParams) -> bool {
        raw.contains_key("filterModel")
            || raw.contains_key("sortModel")
            || matches!(format_hint(raw).as_deref(), Some("mui" | "mui-datagrid"))
    }

    fn parse(&self, raw: &RawParams) -> ParsedParams {
        let filter_model = json_param(raw, "filterModel");
        let mut parsed = ParsedParams::new(self.pagination(raw));
        parsed.sorting = Self::sorting(raw);
        parsed.filters = Self::filters(filter_model.as_ref(), &mut parsed.meta.ignored);
        parsed.search = extract_search(raw);
        if parsed.search.is_empty() {
            if let Some(term) = Self::quick_filter(filter_model.as_ref()) {
                parsed.search.term = term;
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
        MuiDataGridRequestParser::default().parse(value.as_object().unwrap())
    }

    #[test]
    fn test_zero_based_page() {
        let parsed = parse(json!({"page": 0, "pageSize": 25}));
        let p = &parsed.pagination;
        assert_eq!((p.page, p.page_size, p.offset, p.limit), (1, 25, 0, 25));

        let parsed = parse(json!({"page": "3", "pageSize": "10"}));
        assert_eq!(parsed.pagination.page, 4);
        assert_eq!(parsed.pagination.offset, 30);
    }

    #[test]
    fn test_sort_and_filter_models() {
        let parsed = parse(json!({
            "sortModel": r#"[{"field":"age","sort":"desc"},{"field":"name","sort":"asc"}]"#,
            "filterModel": r#"{"items":[
                {"field":"age","operator":">=","value":"21"},
                {"columnField":"created","operatorValue":"onOrAfter","value":"2024-01-01"},
                {"field":"role","operator":"isAnyOf","value":["admin","user"]},
                {"field":"bio","operator":"isEmpty"},
                {"field":"name","operator":"contains","value":""}
            ],"quickFilterValues":["ada","lovelace"]}"#,
        }));
        assert_eq!(parsed.sorting[0].field, "age");
        assert_eq!(parsed.sorting[0].direction, SortDirection::Desc);
        assert_eq!(parsed.sorting[1].priority, 1);

        let ops: Vec<(&str, Operator)> = parsed
            .filters
            .iter()
            .map(|f| (f.field.as_str(), f.operator))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("age", Operator::GreaterThanOrEqual),
                ("created", Operator::GreaterThanOrEqual),
                ("role", Operator::In),
                ("bio", Operator::IsNull),
            ]
        );
        assert_eq!(parsed.search.term, "ada lovelace");
    }

    #[test]
    fn test_malformed_json_is_empty() {
        let parsed = parse(json!({"sortModel": "[{oops", "filterModel": "nope"}));
        assert!(parsed.sorting.is_empty());
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.pagination.page, 1);
    }

    #[test]
    fn test_unmapped_operator_recorded() {
        let parsed = parse(json!({
            "filterModel": {"items": [{"field": "name", "operator": "fuzzy", "value": "x"}]}
        }));
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.meta.ignored.len(), 1);
    }
}
