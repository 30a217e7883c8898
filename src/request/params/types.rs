use crate::model::Operator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat request data: query string merged with the parsed body.
pub type RawParams = Map<String, Value>;

/// Normalized pagination. `extras` carries format-specific values such as
/// AG-Grid's `startRow`/`endRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
    pub limit: u64,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Pagination {
    /// Page-addressed pagination: offset derived from `page` and `page_size`.
    #[must_use]
    pub fn from_page(page: u64, page_size: u64) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        Self {
            page,
            page_size,
            offset: (page - 1).saturating_mul(page_size),
            limit: page_size,
            extras: Map::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extras.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc`/`descending` (any case) is descending, everything else ascending.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One sort key; lower `priority` sorts first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
    pub priority: usize,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection, priority: usize) -> Self {
        Self {
            field: field.into(),
            direction,
            priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl FilterSpec {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOperator {
    #[default]
    Contains,
    StartsWith,
    EndsWith,
    Equals,
    FullText,
}

impl SearchOperator {
    /// Unknown names yield `None`; callers default to [`SearchOperator::Contains`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let op = match raw.trim().to_ascii_lowercase().as_str() {
            "contains" => SearchOperator::Contains,
            "startswith" | "starts_with" => SearchOperator::StartsWith,
            "endswith" | "ends_with" => SearchOperator::EndsWith,
            "equals" => SearchOperator::Equals,
            "fulltext" | "full_text" => SearchOperator::FullText,
            _ => return None,
        };
        Some(op)
    }
}

/// Global search request; an empty `term` means no search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchSpec {
    pub term: String,
    pub fields: Vec<String>,
    pub operator: SearchOperator,
}

impl SearchSpec {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term.trim().is_empty()
    }
}

/// Boolean switches some formats carry alongside the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    pub include_total: bool,
    pub include_available_filters: bool,
    pub include_metadata: bool,
}

/// Detection metadata added by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMeta {
    pub detected_format: String,
    pub raw_param_count: usize,
    /// Parameters the strategy could not interpret, with the reason.
    pub ignored: Vec<String>,
}

/// Format-independent view of a list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParams {
    pub pagination: Pagination,
    pub sorting: Vec<SortSpec>,
    pub filters: Vec<FilterSpec>,
    pub search: SearchSpec,
    pub response_format: String,
    pub options: ParseOptions,
    pub meta: ParseMeta,
}

impl ParsedParams {
    /// Empty envelope on the given pagination.
    #[must_use]
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            sorting: Vec::new(),
            filters: Vec::new(),
            search: SearchSpec::default(),
            response_format: String::new(),
            options: ParseOptions::default(),
            meta: ParseMeta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_serializes_flat_extras() {
        let p = Pagination::from_page(2, 20).with_extra("startRow", 20);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(
            v,
            json!({"page": 2, "pageSize": 20, "offset": 20, "limit": 20, "startRow": 20})
        );
    }

    #[test]
    fn test_pagination_floors_zero_values() {
        let p = Pagination::from_page(0, 0);
        assert_eq!((p.page, p.page_size, p.offset), (1, 1, 0));
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let p = Pagination::from_page(i64::MAX as u64, 20);
        assert_eq!(p.page, i64::MAX as u64);
        assert_eq!(p.offset, u64::MAX);
        assert_eq!(p.limit, 20);
        let p = Pagination::from_page(u64::MAX, u64::MAX);
        assert_eq!(p.offset, u64::MAX);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("whatever"), SortDirection::Asc);
    }
}
