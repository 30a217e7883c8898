use super::{ListResult, ModelRepository};
use crate::error::RepositoryError;
use crate::model::{FieldKind, ModelDefinition, Operator};
use crate::request::params::{SearchOperator, SortDirection};
use crate::validation::{parse_datetime, ValidatedFilter, ValidatedParams, ValidatedSearch};
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

const ID_FIELD: &str = "id";
const DELETED_AT_FIELD: &str = "deleted_at";

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<String, StoredRow>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct StoredRow {
    data: Map<String, Value>,
    deleted: bool,
}

/// [`ModelRepository`] over JSON rows held in memory, with soft delete.
///
/// Ids are strings; records created without one get the next integer.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows for `model`. Rows must be JSON objects.
    pub fn seed(&self, model: &str, rows: impl IntoIterator<Item = Value>) -> Result<usize, RepositoryError> {
        let mut count = 0;
        for row in rows {
            let Value::Object(data) = row else {
                return Err(RepositoryError::InvalidRecord {
                    model: model.to_string(),
                    id: String::new(),
                    reason: "row is not a JSON object".to_string(),
                });
            };
            self.insert(model, data)?;
            count += 1;
        }
        Ok(count)
    }

    fn insert(&self, model: &str, mut data: Map<String, Value>) -> Result<Value, RepositoryError> {
        let mut tables = self.write()?;
        let table = tables.entry(model.to_string()).or_default();

        let id = match data.get(ID_FIELD).and_then(id_string) {
            Some(id) => {
                if let Ok(n) = id.parse::<u64>() {
                    table.next_id = table.next_id.max(n);
                }
                id
            }
            None => {
                table.next_id += 1;
                table.next_id.to_string()
            }
        };
        data.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        let deleted = data.get(DELETED_AT_FIELD).is_some_and(|v| !v.is_null());
        table.rows.insert(
            id,
            StoredRow {
                data: data.clone(),
                deleted,
            },
        );
        Ok(Value::Object(data))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Table>>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Backend("repository lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Table>>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Backend("repository lock poisoned".to_string()))
    }

    fn query(
        &self,
        model: &ModelDefinition,
        params: &ValidatedParams,
        deleted: bool,
    ) -> Result<ListResult, RepositoryError> {
        let tables = self.read()?;
        let mut matched: Vec<&Map<String, Value>> = tables
            .get(&model.name)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| r.deleted == deleted)
                    .map(|r| &r.data)
                    .collect()
            })
            .unwrap_or_default();

        matched.retain(|row| params.filters.iter().all(|f| filter_matches(row, f)));
        if let Some(search) = &params.search {
            matched.retain(|row| search_matches(row, search));
        }
        if !params.sorting.is_empty() {
            let mut sorting = params.sorting.clone();
            sorting.sort_by_key(|s| s.priority);
            matched.sort_by(|a, b| {
                for sort in &sorting {
                    let ord = compare_for_sort(a.get(&sort.field), b.get(&sort.field));
                    let ord = match sort.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let total = matched.len() as u64;
        let rows = matched
            .into_iter()
            .skip(params.pagination.offset as usize)
            .take(params.pagination.limit as usize)
            .map(|row| Value::Object(row.clone()))
            .collect::<Vec<_>>();
        debug!(model = %model.name, total, returned = rows.len(), deleted, "In-memory query");
        Ok(ListResult { rows, total })
    }
}

impl ModelRepository for InMemoryRepository {
    fn list(&self, model: &ModelDefinition, params: &ValidatedParams) -> Result<ListResult, RepositoryError> {
        self.query(model, params, false)
    }

    fn list_deleted(
        &self,
        model: &ModelDefinition,
        params: &ValidatedParams,
    ) -> Result<ListResult, RepositoryError> {
        self.query(model, params, true)
    }

    fn find(&self, model: &ModelDefinition, id: &str) -> Result<Option<Value>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .get(&model.name)
            .and_then(|t| t.rows.get(id))
            .filter(|r| !r.deleted)
            .map(|r| Value::Object(r.data.clone())))
    }

    fn create(&self, model: &ModelDefinition, mut data: Map<String, Value>) -> Result<Value, RepositoryError> {
        data.remove(DELETED_AT_FIELD);
        self.insert(&model.name, data)
    }

    fn update(
        &self,
        model: &ModelDefinition,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, RepositoryError> {
        let mut tables = self.write()?;
        let Some(row) = tables
            .get_mut(&model.name)
            .and_then(|t| t.rows.get_mut(id))
            .filter(|r| !r.deleted)
        else {
            return Ok(None);
        };
        for (key, value) in data {
            if key != ID_FIELD && key != DELETED_AT_FIELD {
                row.data.insert(key, value);
            }
        }
        Ok(Some(Value::Object(row.data.clone())))
    }

    fn delete(&self, model: &ModelDefinition, id: &str) -> Result<bool, RepositoryError> {
        let mut tables = self.write()?;
        let Some(row) = tables
            .get_mut(&model.name)
            .and_then(|t| t.rows.get_mut(id))
            .filter(|r| !r.deleted)
        else {
            return Ok(false);
        };
        row.deleted = true;
        row.data.insert(
            DELETED_AT_FIELD.to_string(),
            Value::String(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        Ok(true)
    }

    fn restore(&self, model: &ModelDefinition, id: &str) -> Result<Option<Value>, RepositoryError> {
        let mut tables = self.write()?;
        let Some(row) = tables
            .get_mut(&model.name)
            .and_then(|t| t.rows.get_mut(id))
            .filter(|r| r.deleted)
        else {
            return Ok(None);
        };
        row.deleted = false;
        row.data.insert(DELETED_AT_FIELD.to_string(), Value::Null);
        Ok(Some(Value::Object(row.data.clone())))
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn compare(kind: FieldKind, row: &Value, wanted: &Value) -> Option<Ordering> {
    if row.is_null() {
        return None;
    }
    match kind {
        FieldKind::Integer | FieldKind::Id | FieldKind::Float => {
            as_f64(row)?.partial_cmp(&as_f64(wanted)?)
        }
        FieldKind::Boolean => Some(truthy(row)?.cmp(&truthy(wanted)?)),
        FieldKind::Date | FieldKind::DateTime => {
            let row = parse_datetime(as_text(row)?.trim())?;
            let wanted = parse_datetime(as_text(wanted)?.trim())?;
            Some(row.cmp(&wanted))
        }
        _ => Some(as_text(row)?.cmp(&as_text(wanted)?)),
    }
}

fn is_equal(kind: FieldKind, row: &Value, wanted: &Value) -> bool {
    compare(kind, row, wanted) == Some(Ordering::Equal)
}

fn text_match(haystack: &Value, needle: &Value, op: fn(&str, &str) -> bool) -> bool {
    match (as_text(haystack), as_text(needle)) {
        (Some(h), Some(n)) => op(&h.to_lowercase(), &n.to_lowercase()),
        _ => false,
    }
}

fn row_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect(),
        _ => Vec::new(),
    }
}

fn filter_matches(row: &Map<String, Value>, filter: &ValidatedFilter) -> bool {
    let value = row.get(&filter.field).unwrap_or(&Value::Null);
    let kind = filter.field_type;
    let list = || filter.value.as_array().cloned().unwrap_or_default();
    let wanted_items = || list().iter().filter_map(as_text).collect::<Vec<_>>();

    match filter.operator {
        Operator::Equals => is_equal(kind, value, &filter.value),
        Operator::NotEquals => !is_equal(kind, value, &filter.value),
        Operator::GreaterThan => compare(kind, value, &filter.value) == Some(Ordering::Greater),
        Operator::GreaterThanOrEqual => matches!(
            compare(kind, value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::LessThan => compare(kind, value, &filter.value) == Some(Ordering::Less),
        Operator::LessThanOrEqual => matches!(
            compare(kind, value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Contains => text_match(value, &filter.value, |h, n| h.contains(n)),
        Operator::StartsWith => text_match(value, &filter.value, |h, n| h.starts_with(n)),
        Operator::EndsWith => text_match(value, &filter.value, |h, n| h.ends_with(n)),
        Operator::In => list().iter().any(|w| is_equal(kind, value, w)),
        Operator::NotIn => !list().iter().any(|w| is_equal(kind, value, w)),
        Operator::Between => match list().as_slice() {
            [low, high] => {
                matches!(compare(kind, value, low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(compare(kind, value, high), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        },
        Operator::IsNull => value.is_null() || value.as_str().is_some_and(str::is_empty),
        Operator::IsNotNull => !(value.is_null() || value.as_str().is_some_and(str::is_empty)),
        Operator::Overlap => {
            let have = row_items(value);
            wanted_items().iter().any(|w| have.contains(w))
        }
        Operator::ContainsAll => {
            let have = row_items(value);
            wanted_items().iter().all(|w| have.contains(w))
        }
        Operator::ContainsNone => {
            let have = row_items(value);
            !wanted_items().iter().any(|w| have.contains(w))
        }
    }
}

fn search_matches(row: &Map<String, Value>, search: &ValidatedSearch) -> bool {
    let term = search.term.to_lowercase();
    search.fields.iter().any(|field| {
        let Some(text) = row.get(field).and_then(as_text) else {
            return false;
        };
        let text = text.to_lowercase();
        match search.operator {
            SearchOperator::Contains => text.contains(&term),
            SearchOperator::StartsWith => text.starts_with(&term),
            SearchOperator::EndsWith => text.ends_with(&term),
            SearchOperator::Equals => text == term,
            SearchOperator::FullText => term.split_whitespace().all(|word| text.contains(word)),
        }
    })
}

/// Nulls sort last in ascending order; numbers numerically, else as text.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => as_text(a).cmp(&as_text(b)),
        },
    }
}
