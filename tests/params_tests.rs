mod common;

use common::fixtures::params;
use gravitycar::model::Operator;
use gravitycar::request::params::{
    FormatParser, MuiDataGridRequestParser, PageLimits, RequestParameterParser, SortDirection,
};
use serde_json::json;

#[test]
fn test_ag_grid_rows_become_pages() {
    let parsed = RequestParameterParser::default().parse(&params(json!({"startRow": 20, "endRow": 40})));
    assert_eq!(parsed.meta.detected_format, "ag-grid");
    let p = &parsed.pagination;
    assert_eq!((p.page, p.page_size, p.offset, p.limit), (2, 20, 20, 20));
    assert_eq!(parsed.response_format, "ag-grid");
}

#[test]
fn test_mui_pages_are_zero_based() {
    let parser = MuiDataGridRequestParser::new(PageLimits::default());
    let parsed = parser.parse(&params(json!({"page": 0, "pageSize": 25})));
    assert_eq!(parsed.pagination.page, 1);
    assert_eq!(parsed.pagination.page_size, 25);
    assert_eq!(parsed.pagination.offset, 0);

    let detected = RequestParameterParser::default().parse(&params(json!({
        "page": 2,
        "pageSize": 25,
        "sortModel": [{"field": "title", "sort": "desc"}],
    })));
    assert_eq!(detected.meta.detected_format, "mui");
    assert_eq!(detected.pagination.page, 3);
    assert_eq!(detected.pagination.offset, 50);
    assert_eq!(detected.sorting[0].field, "title");
    assert_eq!(detected.sorting[0].direction, SortDirection::Desc);
}

#[test]
fn test_advanced_sort_keeps_declared_priority() {
    let parsed = RequestParameterParser::default().parse(&params(json!({"sort": "created_at:desc,name:asc"})));
    assert_eq!(parsed.meta.detected_format, "advanced");
    let sorts: Vec<(&str, SortDirection, usize)> = parsed
        .sorting
        .iter()
        .map(|s| (s.field.as_str(), s.direction, s.priority))
        .collect();
    assert_eq!(
        sorts,
        vec![
            ("created_at", SortDirection::Desc, 0),
            ("name", SortDirection::Asc, 1),
        ]
    );
}

#[test]
fn test_simple_query_becomes_equals_filters() {
    let parsed = RequestParameterParser::default().parse(&params(json!({"status": "active", "page": "2"})));
    assert_eq!(parsed.meta.detected_format, "simple");
    assert_eq!(parsed.filters.len(), 1);
    assert_eq!(parsed.filters[0].field, "status");
    assert_eq!(parsed.filters[0].operator, Operator::Equals);
    assert_eq!(parsed.filters[0].value, json!("active"));
    assert_eq!(parsed.pagination.page, 2);
    assert_eq!(parsed.response_format, "standard");
}

#[test]
fn test_ag_grid_takes_precedence_over_mui_signature() {
    let parsed = RequestParameterParser::default().parse(&params(json!({
        "startRow": 0,
        "endRow": 50,
        "filterModel": {"title": {"filterType": "text", "type": "contains", "filter": "du"}},
    })));
    assert_eq!(parsed.meta.detected_format, "ag-grid");
    assert_eq!(parsed.pagination.page_size, 50);
}

#[test]
fn test_empty_request_falls_back_to_simple_defaults() {
    let parsed = RequestParameterParser::default().parse(&params(json!({})));
    assert_eq!(parsed.meta.detected_format, "simple");
    assert_eq!(parsed.pagination.page, 1);
    assert_eq!(parsed.pagination.page_size, 20);
    assert!(parsed.filters.is_empty());
    assert!(parsed.sorting.is_empty());
    assert!(parsed.search.is_empty());
}

#[test]
fn test_page_size_is_clamped_to_configured_maximum() {
    let parser = RequestParameterParser::new(PageLimits {
        default_page_size: 10,
        max_page_size: 50,
    });
    let parsed = parser.parse(&params(json!({"pageSize": "500"})));
    assert_eq!(parsed.pagination.page_size, 50);
    let parsed = parser.parse(&params(json!({})));
    assert_eq!(parsed.pagination.page_size, 10);
}

#[test]
fn test_explicit_response_format_wins() {
    let parsed = RequestParameterParser::default().parse(&params(json!({
        "startRow": 0,
        "endRow": 10,
        "responseFormat": "swr",
    })));
    assert_eq!(parsed.meta.detected_format, "ag-grid");
    assert_eq!(parsed.response_format, "swr");
}

#[test]
fn test_extreme_and_negative_pagination_stays_in_bounds() {
    let parser = RequestParameterParser::default();
    let cases = [
        (json!({"startRow": "9223372036854775807", "endRow": "-10"}), "ag-grid"),
        (json!({"startRow": -5, "endRow": "9223372036854775807"}), "ag-grid"),
        (json!({"sortModel": [], "page": "9223372036854775807", "pageSize": -1}), "mui"),
        (json!({"sortModel": [], "page": -7, "pageSize": "99999"}), "mui"),
        (json!({"sort": "title:asc", "page": "9223372036854775807", "per_page": 5000}), "advanced"),
        (json!({"sort": "title:asc", "page": "-9223372036854775808", "per_page": 0}), "advanced"),
        (json!({"page": "9223372036854775807", "pageSize": "-9223372036854775808"}), "simple"),
        (json!({"offset": "9223372036854775807"}), "simple"),
        (json!({"offset": -1, "limit": "1e300"}), "simple"),
    ];
    for (raw, format) in cases {
        let parsed = parser.parse(&params(raw.clone()));
        assert_eq!(parsed.meta.detected_format, format, "{raw}");
        let p = &parsed.pagination;
        assert!(p.page >= 1, "{raw}");
        assert!((1..=1000).contains(&p.page_size), "{raw}");
        assert_eq!(p.limit, p.page_size, "{raw}");
    }

    let parsed = parser.parse(&params(json!({"page": "9223372036854775807"})));
    assert_eq!(parsed.pagination.page, i64::MAX as u64);
    assert_eq!(parsed.pagination.offset, u64::MAX);

    let parsed = parser.parse(&params(json!({"sortModel": [], "page": "9223372036854775807", "pageSize": 1})));
    assert_eq!(parsed.pagination.page, i64::MAX as u64 + 1);
    assert_eq!(parsed.pagination.offset, i64::MAX as u64);
}
