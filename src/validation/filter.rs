//! Model-aware filter validation.
//!
//! A filter survives only if its field exists, is a DB field, supports the
//! operator and its value validates for the field's kind. Anything else is
//! dropped with a warning; survivors are never altered into a passing state
//! beyond type coercion.

use crate::model::{FieldCapabilities, FieldDefinition, FieldKind, ModelDefinition, Operator};
use crate::request::params::FilterSpec;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::warn;

/// Canonical rendering of date and datetime filter values.
pub const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%B %d, %Y", "%b %d %Y"];

/// A filter that passed validation, value coerced to the field's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedFilter {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    pub field_type: FieldKind,
}

/// A filter that was dropped, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedFilter {
    pub field: String,
    pub operator: Operator,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    pub accepted: Vec<ValidatedFilter>,
    pub rejected: Vec<RejectedFilter>,
}

/// Validates normalized filters against model metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCriteria;

impl FilterCriteria {
    pub fn new() -> Self {
        Self
    }

    /// Only the filters that pass every check.
    #[must_use]
    pub fn validate_and_filter_for_model(
        &self,
        filters: &[FilterSpec],
        model: &ModelDefinition,
    ) -> Vec<ValidatedFilter> {
        self.validate_with_report(filters, model).accepted
    }

    /// Accepted filters plus the reason each rejected one was dropped.
    #[must_use]
    pub fn validate_with_report(&self, filters: &[FilterSpec], model: &ModelDefinition) -> FilterReport {
        let mut report = FilterReport::default();
        for filter in filters {
            match validate_filter(filter, model) {
                Ok(validated) => report.accepted.push(validated),
                Err(reason) => {
                    warn!(
                        model = %model.name,
                        field = %filter.field,
                        operator = %filter.operator,
                        reason = %reason,
                        "Filter dropped"
                    );
                    report.rejected.push(RejectedFilter {
                        field: filter.field.clone(),
                        operator: filter.operator,
                        reason,
                    });
                }
            }
        }
        report
    }
}

fn validate_filter(filter: &FilterSpec, model: &ModelDefinition) -> Result<ValidatedFilter, String> {
    let field = model
        .field(&filter.field)
        .ok_or_else(|| format!("field '{}' does not exist on {}", filter.field, model.name))?;
    if !field.is_db_field() {
        return Err(format!("field '{}' is not a database field", field.name));
    }
    if !field.supports_operator(filter.operator) {
        return Err(format!(
            "operator '{}' is not supported by {} field '{}'",
            filter.operator,
            field.kind(),
            field.name
        ));
    }

    let value = if filter.operator.is_valueless() {
        Value::Null
    } else {
        validate_value(field, filter.operator, &filter.value)?
    };

    Ok(ValidatedFilter {
        field: field.name.clone(),
        operator: filter.operator,
        value,
        field_type: field.kind(),
    })
}

/// Coerce `value` for `field` under `operator`, or explain why it is invalid.
pub fn validate_value(field: &FieldDefinition, operator: Operator, value: &Value) -> Result<Value, String> {
    if value.is_null() {
        return Err("a value is required".to_string());
    }

    if field.kind() == FieldKind::MultiEnum || operator.takes_list() {
        let items = list_items(value);
        if items.is_empty() {
            return Err(format!("operator '{operator}' requires at least one value"));
        }
        if operator == Operator::Between && items.len() != 2 {
            return Err(format!("'between' requires exactly 2 values, got {}", items.len()));
        }
        let coerced = items
            .iter()
            .map(|item| coerce_scalar(field, item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Array(coerced));
    }

    coerce_scalar(field, value)
}

fn list_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Value::String(p.to_string()))
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn coerce_scalar(field: &FieldDefinition, value: &Value) -> Result<Value, String> {
    match field.kind() {
        FieldKind::Integer | FieldKind::Id => coerce_integer(value).map(Value::from),
        FieldKind::Float => coerce_float(value),
        FieldKind::Boolean => coerce_boolean(value).map(Value::Bool),
        FieldKind::Date | FieldKind::DateTime => coerce_datetime(value).map(Value::String),
        FieldKind::Enum | FieldKind::Radio | FieldKind::MultiEnum => coerce_option(field, value),
        _ => coerce_string(value).map(Value::String),
    }
}

fn coerce_integer(value: &Value) -> Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| format!("'{}' is not an integer", display(value)))
}

fn coerce_float(value: &Value) -> Result<Value, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("'{}' is not a number", display(value)))
}

fn coerce_boolean(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            match s.as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                other => other
                    .parse::<f64>()
                    .map(|f| f != 0.0)
                    .map_err(|_| format!("'{other}' is not a boolean")),
            }
        }
        other => Err(format!("'{}' is not a boolean", display(other))),
    }
}

fn coerce_datetime(value: &Value) -> Result<String, String> {
    let parsed = match value {
        Value::String(s) => parse_datetime(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    };
    parsed
        .map(|dt| dt.format(CANONICAL_DATETIME_FORMAT).to_string())
        .ok_or_else(|| format!("'{}' is not a valid date", display(value)))
}

/// Parse the date formats clients commonly send.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn coerce_option(field: &FieldDefinition, value: &Value) -> Result<Value, String> {
    let text = coerce_string(value)?;
    let Some(options) = field.options() else {
        return Ok(Value::String(text));
    };
    if options.contains_key(&text) || options.values().any(|label| *label == text) {
        Ok(Value::String(text))
    } else {
        Err(format!(
            "'{text}' is not one of the allowed options for '{}'",
            field.name
        ))
    }
}

fn coerce_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("'{}' is not a scalar value", display(other))),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
