mod common;

use common::fixtures::{manifest, params};
use gravitycar::model::{ModelCatalog, ModelDefinition, Operator};
use gravitycar::request::params::{
    FilterSpec, PageLimits, Pagination, ParsedParams, RequestParameterParser, SearchOperator, SearchSpec,
    SortDirection, SortSpec,
};
use gravitycar::validation::{FilterCriteria, ParamsValidator, SearchEngine};
use serde_json::json;
use std::sync::Arc;

fn model(name: &str) -> Arc<ModelDefinition> {
    manifest().catalog().model(name).unwrap()
}

#[test]
fn test_filters_are_dropped_never_substituted() {
    let users = model("Users");
    let filters = vec![
        FilterSpec::new("username", Operator::StartsWith, "ad"),
        FilterSpec::new("password", Operator::Equals, "hunter2"),
        FilterSpec::new("role", Operator::Equals, "owner"),
        FilterSpec::new("created_at", Operator::GreaterThan, "2024-01-15"),
        FilterSpec::new("missing", Operator::Equals, "x"),
    ];
    let report = FilterCriteria::new().validate_with_report(&filters, &users);

    let accepted: Vec<(&str, Operator)> = report
        .accepted
        .iter()
        .map(|f| (f.field.as_str(), f.operator))
        .collect();
    assert_eq!(
        accepted,
        vec![("username", Operator::StartsWith), ("created_at", Operator::GreaterThan)]
    );
    assert_eq!(report.accepted[1].value, json!("2024-01-15 00:00:00"));

    let rejected: Vec<&str> = report.rejected.iter().map(|r| r.field.as_str()).collect();
    assert_eq!(rejected, vec!["password", "role", "missing"]);
}

#[test]
fn test_values_are_coerced_to_field_types() {
    let books = model("Books");
    let filters = vec![
        FilterSpec::new("pages", Operator::Between, "200,300"),
        FilterSpec::new("rating", Operator::GreaterThanOrEqual, "4.1"),
        FilterSpec::new("published", Operator::Equals, "yes"),
    ];
    let accepted = FilterCriteria::new().validate_and_filter_for_model(&filters, &books);
    assert_eq!(accepted.len(), 3);
    assert_eq!(accepted[0].value, json!([200, 300]));
    assert_eq!(accepted[1].value, json!(4.1));
    assert_eq!(accepted[2].value, json!(true));
}

#[test]
fn test_search_uses_declared_fields_and_drops_unsearchable_ones() {
    let users = model("Users");
    let engine = SearchEngine::new();

    let search = SearchSpec {
        term: "ada".into(),
        fields: Vec::new(),
        operator: SearchOperator::Contains,
    };
    let validated = engine.validate_search_for_model(&search, &users).unwrap();
    assert_eq!(validated.fields, vec!["username", "email"]);

    let search = SearchSpec {
        term: "ada".into(),
        fields: vec!["password".into(), "email".into(), "ghost".into()],
        operator: SearchOperator::StartsWith,
    };
    let (validated, dropped) = engine.validate_with_dropped(&search, &users);
    assert_eq!(validated.unwrap().fields, vec!["email"]);
    assert_eq!(dropped.len(), 2);

    let blank = SearchSpec {
        term: "   ".into(),
        ..SearchSpec::default()
    };
    assert!(engine.validate_search_for_model(&blank, &users).is_none());

    let books = model("Books");
    let only_bigtext = SearchSpec {
        term: "spice".into(),
        fields: vec!["summary".into()],
        operator: SearchOperator::Contains,
    };
    assert!(engine.validate_search_for_model(&only_bigtext, &books).is_none());
}

#[test]
fn test_sorting_problems_aggregate_into_one_error() {
    let users = model("Users");
    let mut parsed = ParsedParams::new(Pagination::from_page(1, 20));
    parsed.sorting = vec![
        SortSpec::new("ghost", SortDirection::Asc, 0),
        SortSpec::new("username", SortDirection::Desc, 1),
        SortSpec::new("phantom", SortDirection::Desc, 2),
    ];
    let err = ParamsValidator::new(PageLimits::default())
        .validate_for_model(&parsed, &users)
        .unwrap_err();
    assert_eq!(err.field_count(), 2);
    assert!(err.errors.contains_key("ghost"));
    assert!(err.errors.contains_key("phantom"));
    assert!(err.suggestions.iter().any(|s| s.contains("username")));
}

#[test]
fn test_valid_request_passes_through_with_warnings() {
    let books = model("Books");
    let parsed = RequestParameterParser::default().parse(&params(json!({
        "title": "Dune",
        "summary": "desert",
        "sort": "rating:desc,pages:asc",
        "search": "du",
        "search_fields": "title,summary",
        "per_page": 5,
    })));
    assert_eq!(parsed.meta.detected_format, "advanced");

    let validated = ParamsValidator::default().validate_for_model(&parsed, &books).unwrap();
    assert_eq!(validated.model, "Books");
    assert_eq!(validated.pagination.page_size, 5);
    assert_eq!(validated.sorting.len(), 2);
    assert_eq!(validated.sorting[0].field, "rating");
    assert_eq!(validated.search.as_ref().unwrap().fields, vec!["title"]);
    assert!(validated.warnings.iter().any(|w| w.contains("summary")));
}
