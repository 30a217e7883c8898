//! Helpers shared by every format strategy: field-name sanitization,
//! page clamping, scalar coercion and bracket-key expansion.

use super::types::{RawParams, SearchOperator, SearchSpec, SortDirection, SortSpec};
use crate::runtime_config::RuntimeConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

static FIELD_NAME_STRIP: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[^A-Za-z0-9_.]").expect("static regex")
});

/// Strip everything except alphanumerics, `_` and `.` (relationship paths).
///
/// This is the only defense applied before field names reach query building.
#[must_use]
pub fn sanitize_field_name(name: &str) -> String {
    FIELD_NAME_STRIP.replace_all(name.trim(), "").into_owned()
}

/// Page-size bounds applied by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl From<&RuntimeConfig> for PageLimits {
    fn from(config: &RuntimeConfig) -> Self {
        let max_page_size = config.max_page_size.max(1);
        Self {
            default_page_size: config.default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }
}

impl PageLimits {
    /// Default when absent, floored at 1, ceilinged at `max_page_size` with a warning.
    #[must_use]
    pub fn page_size(&self, requested: Option<i64>) -> u64 {
        match requested {
            None => self.default_page_size,
            Some(n) if n < 1 => 1,
            Some(n) => {
                let n = n as u64;
                if n > self.max_page_size {
                    warn!(
                        requested = n,
                        max_page_size = self.max_page_size,
                        "Requested page size exceeds maximum, clamping"
                    );
                    self.max_page_size
                } else {
                    n
                }
            }
        }
    }

    /// 1-based page, floored at 1.
    #[must_use]
    pub fn page(&self, requested: Option<i64>) -> u64 {
        requested.unwrap_or(1).max(1) as u64
    }
}

/// Scalar as a string; `None` for null, arrays and objects.
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer view of a number or numeric string (fractions truncated).
#[must_use]
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// `true/1/yes/on` (any case), non-zero numbers and `true` are true.
#[must_use]
pub fn parse_bool_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Integer parameter lookup.
#[must_use]
pub fn int_param(raw: &RawParams, key: &str) -> Option<i64> {
    raw.get(key).and_then(value_to_i64)
}

/// Non-empty trimmed string parameter lookup.
#[must_use]
pub fn str_param(raw: &RawParams, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A parameter that may arrive as a JSON-encoded string or already decoded.
///
/// Malformed JSON is logged and treated as absent.
#[must_use]
pub fn json_param(raw: &RawParams, key: &str) -> Option<Value> {
    match raw.get(key)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(param = key, error = %err, "Malformed JSON parameter ignored");
                None
            }
        },
        v @ (Value::Array(_) | Value::Object(_)) => Some(v.clone()),
        _ => None,
    }
}

/// Comma-separated string, array or indexed object as a list of values.
#[must_use]
pub fn split_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Value::String(p.to_string()))
            .collect(),
        Value::Object(_) => indexed_values(value).into_iter().cloned().collect(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

/// Members of an array, or of an object keyed by numeric index, in index order.
#[must_use]
pub fn indexed_values(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            let mut entries: Vec<(usize, &Value)> = map
                .iter()
                .enumerate()
                .map(|(pos, (k, v))| (k.parse::<usize>().unwrap_or(usize::MAX - map.len() + pos), v))
                .collect();
            entries.sort_by_key(|(idx, _)| *idx);
            entries.into_iter().map(|(_, v)| v).collect()
        }
        _ => Vec::new(),
    }
}

/// Rebuild nested structures from bracket keys:
/// `filters[name][type]=equals` becomes `{"filters": {"name": {"type": "equals"}}}`.
///
/// Keys without brackets are kept as-is; malformed bracket keys are kept
/// verbatim. An empty segment (`ids[]`) appends at the next numeric index.
#[must_use]
pub fn expand_brackets(raw: &RawParams) -> Map<String, Value> {
    let mut root = Map::new();
    for (key, value) in raw {
        let segments = bracket_segments(key);
        insert_path(&mut root, &segments, value.clone());
    }
    root
}

fn bracket_segments(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }
    let mut segments = vec![key[..open].to_string()];
    let mut remaining = &key[open..];
    while let Some(stripped) = remaining.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                segments.push(stripped[..close].to_string());
                remaining = &stripped[close + 1..];
            }
            None => return vec![key.to_string()],
        }
    }
    if remaining.is_empty() {
        segments
    } else {
        vec![key.to_string()]
    }
}

fn insert_path(target: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let key = if first.is_empty() {
        target.len().to_string()
    } else {
        first.clone()
    };

    if rest.is_empty() {
        let leftover = match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (k, v) in incoming {
                    existing.entry(k).or_insert(v);
                }
                None
            }
            (_, value) => Some(value),
        };
        if let Some(value) = leftover {
            target.insert(key, value);
        }
        return;
    }

    let entry = target
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        debug!("Scalar parameter replaced by nested bracket parameter");
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value);
    }
}

/// Parse `field:direction,field2:direction` left to right, priorities
/// starting at `first_priority`. A leading `-` also means descending.
#[must_use]
pub fn parse_sort_list(spec: &str, first_priority: usize) -> Vec<SortSpec> {
    let mut sorting = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (field, direction) = match item.split_once(':') {
            Some((field, dir)) => (field, SortDirection::parse(dir)),
            None => match item.strip_prefix('-') {
                Some(field) => (field, SortDirection::Desc),
                None => (item, SortDirection::Asc),
            },
        };
        let field = sanitize_field_name(field);
        if field.is_empty() {
            continue;
        }
        sorting.push(SortSpec::new(field, direction, first_priority + sorting.len()));
    }
    sorting
}

/// Global search from `search`/`q`, `search_fields` and `search_operator`.
#[must_use]
pub fn extract_search(raw: &RawParams) -> SearchSpec {
    let term = str_param(raw, "search")
        .or_else(|| str_param(raw, "q"))
        .unwrap_or_default();
    let fields = raw
        .get("search_fields")
        .map(split_list)
        .unwrap_or_default()
        .iter()
        .filter_map(value_to_string)
        .map(|f| sanitize_field_name(&f))
        .filter(|f| !f.is_empty())
        .collect();
    let operator = str_param(raw, "search_operator")
        .and_then(|op| SearchOperator::parse(&op))
        .unwrap_or_default();
    SearchSpec {
        term,
        fields,
        operator,
    }
}

/// Explicit response format requested via `responseFormat` or `format`.
#[must_use]
pub fn format_hint(raw: &RawParams) -> Option<String> {
    str_param(raw, "responseFormat")
        .or_else(|| str_param(raw, "format"))
        .map(|f| f.to_ascii_lowercase())
}
