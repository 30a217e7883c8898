use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard filter operator vocabulary every format parser normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
    Overlap,
    ContainsAll,
    ContainsNone,
}

impl Operator {
    pub const ALL: [Operator; 17] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::Overlap,
        Operator::ContainsAll,
        Operator::ContainsNone,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::LessThan => "lessThan",
            Operator::LessThanOrEqual => "lessThanOrEqual",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Between => "between",
            Operator::IsNull => "isNull",
            Operator::IsNotNull => "isNotNull",
            Operator::Overlap => "overlap",
            Operator::ContainsAll => "containsAll",
            Operator::ContainsNone => "containsNone",
        }
    }

    /// Canonical name, case-insensitive.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
            .copied()
    }

    /// Canonical name or one of the short aliases accepted in query strings
    /// (`eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `like`, `not_in`, `null`, ...).
    #[must_use]
    pub fn parse_alias(name: &str) -> Option<Self> {
        if let Some(op) = Self::parse(name) {
            return Some(op);
        }
        let op = match name.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" | "is" => Operator::Equals,
            "ne" | "neq" | "!=" | "not" => Operator::NotEquals,
            "gt" | ">" => Operator::GreaterThan,
            "gte" | "ge" | ">=" => Operator::GreaterThanOrEqual,
            "lt" | "<" => Operator::LessThan,
            "lte" | "le" | "<=" => Operator::LessThanOrEqual,
            "like" => Operator::Contains,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "not_in" | "nin" => Operator::NotIn,
            "null" | "is_null" => Operator::IsNull,
            "not_null" | "notnull" | "is_not_null" => Operator::IsNotNull,
            "contains_all" => Operator::ContainsAll,
            "contains_none" => Operator::ContainsNone,
            _ => return None,
        };
        Some(op)
    }

    /// `isNull`/`isNotNull` ignore their value.
    #[must_use]
    pub fn is_valueless(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Operators whose value is a list.
    #[must_use]
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            Operator::In
                | Operator::NotIn
                | Operator::Between
                | Operator::Overlap
                | Operator::ContainsAll
                | Operator::ContainsNone
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
