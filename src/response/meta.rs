use crate::request::params::ParsedParams;
use crate::validation::ValidatedParams;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Page position of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
    /// Total matching rows, when the data source counted them.
    pub total: Option<u64>,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            offset: 0,
            total: None,
        }
    }
}

impl PageInfo {
    #[must_use]
    pub fn total_pages(&self) -> Option<u64> {
        let size = self.page_size.max(1);
        self.total.map(|t| t.div_ceil(size))
    }

    /// With a known total, whether rows remain past this page; otherwise
    /// whether this page came back full.
    #[must_use]
    pub fn has_next_page(&self, rows_returned: usize) -> bool {
        match self.total {
            Some(total) => self.offset.saturating_add(rows_returned as u64) < total,
            None => rows_returned as u64 >= self.page_size.max(1),
        }
    }

    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.page > 1 || self.offset > 0
    }
}

/// Everything a renderer needs besides the rows themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub pagination: PageInfo,
    pub filters: Vec<Value>,
    pub sorting: Vec<Value>,
    pub search: Option<Value>,
    /// Base path used to build pagination links.
    pub path: Option<String>,
}

impl ResponseMeta {
    /// Metadata of a normalized but not model-validated request.
    #[must_use]
    pub fn from_parsed(parsed: &ParsedParams) -> Self {
        let search = (!parsed.search.is_empty()).then(|| {
            json!({
                "term": parsed.search.term,
                "fields": parsed.search.fields,
                "operator": parsed.search.operator,
            })
        });
        Self {
            pagination: PageInfo {
                page: parsed.pagination.page,
                page_size: parsed.pagination.page_size,
                offset: parsed.pagination.offset,
                total: None,
            },
            filters: to_values(&parsed.filters),
            sorting: to_values(&parsed.sorting),
            search,
            path: None,
        }
    }

    /// Metadata of a model-validated request.
    #[must_use]
    pub fn from_validated(validated: &ValidatedParams) -> Self {
        Self {
            pagination: PageInfo {
                page: validated.pagination.page,
                page_size: validated.pagination.page_size,
                offset: validated.pagination.offset,
                total: None,
            },
            filters: to_values(&validated.filters),
            sorting: to_values(&validated.sorting),
            search: validated
                .search
                .as_ref()
                .and_then(|s| serde_json::to_value(s).ok()),
            path: None,
        }
    }

    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.pagination.total = Some(total);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let info = PageInfo {
            page: 2,
            page_size: 20,
            offset: 20,
            total: Some(45),
        };
        assert_eq!(info.total_pages(), Some(3));
        assert!(info.has_next_page(20));
        assert!(info.has_previous_page());

        let last = PageInfo {
            page: 3,
            offset: 40,
            ..info
        };
        assert!(!last.has_next_page(5));
    }

    #[test]
    fn test_unknown_total_uses_full_page_heuristic() {
        let info = PageInfo::default();
        assert!(info.has_next_page(20));
        assert!(!info.has_next_page(7));
        assert!(!info.has_previous_page());
        assert_eq!(info.total_pages(), None);
    }
}
