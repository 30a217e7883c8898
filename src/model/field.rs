use super::operator::Operator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field type as declared in model metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "Text", alias = "TextField")]
    Text,
    #[serde(rename = "BigText", alias = "BigTextField")]
    BigText,
    #[serde(rename = "Email", alias = "EmailField")]
    Email,
    #[serde(rename = "Password", alias = "PasswordField")]
    Password,
    #[serde(rename = "Integer", alias = "IntegerField")]
    Integer,
    #[serde(rename = "ID", alias = "IDField", alias = "Id")]
    Id,
    #[serde(rename = "Float", alias = "FloatField")]
    Float,
    #[serde(rename = "Boolean", alias = "BooleanField")]
    Boolean,
    #[serde(rename = "Date", alias = "DateField")]
    Date,
    #[serde(rename = "DateTime", alias = "DateTimeField")]
    DateTime,
    #[serde(rename = "Enum", alias = "EnumField")]
    Enum,
    #[serde(rename = "RadioButtonSet", alias = "RadioButtonSetField", alias = "Radio")]
    Radio,
    #[serde(rename = "MultiEnum", alias = "MultiEnumField")]
    MultiEnum,
    #[serde(rename = "Image", alias = "ImageField")]
    Image,
    #[serde(rename = "RelatedRecord", alias = "RelatedRecordField")]
    RelatedRecord,
}

const TEXT_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
];

const NUMERIC_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::Between,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
];

const DATE_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThan,
    Operator::LessThanOrEqual,
    Operator::Between,
    Operator::IsNull,
    Operator::IsNotNull,
];

const BOOLEAN_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::IsNull,
    Operator::IsNotNull,
];

const ENUM_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
];

const MULTI_ENUM_OPERATORS: &[Operator] = &[
    Operator::Overlap,
    Operator::ContainsAll,
    Operator::ContainsNone,
    Operator::IsNull,
    Operator::IsNotNull,
];

const NULL_ONLY_OPERATORS: &[Operator] = &[Operator::IsNull, Operator::IsNotNull];

const REFERENCE_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
];

impl FieldKind {
    /// Operators a field of this kind supports unless its metadata overrides them.
    #[must_use]
    pub fn default_operators(&self) -> &'static [Operator] {
        match self {
            FieldKind::Text | FieldKind::BigText | FieldKind::Email => TEXT_OPERATORS,
            FieldKind::Integer | FieldKind::Id | FieldKind::Float => NUMERIC_OPERATORS,
            FieldKind::Date | FieldKind::DateTime => DATE_OPERATORS,
            FieldKind::Boolean => BOOLEAN_OPERATORS,
            FieldKind::Enum | FieldKind::Radio => ENUM_OPERATORS,
            FieldKind::MultiEnum => MULTI_ENUM_OPERATORS,
            FieldKind::Password => NULL_ONLY_OPERATORS,
            FieldKind::Image | FieldKind::RelatedRecord => REFERENCE_OPERATORS,
        }
    }

    /// Metadata name of the kind, e.g. `"DateTime"`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::BigText => "BigText",
            FieldKind::Email => "Email",
            FieldKind::Password => "Password",
            FieldKind::Integer => "Integer",
            FieldKind::Id => "ID",
            FieldKind::Float => "Float",
            FieldKind::Boolean => "Boolean",
            FieldKind::Date => "Date",
            FieldKind::DateTime => "DateTime",
            FieldKind::Enum => "Enum",
            FieldKind::Radio => "RadioButtonSet",
            FieldKind::MultiEnum => "MultiEnum",
            FieldKind::Image => "Image",
            FieldKind::RelatedRecord => "RelatedRecord",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability queries the filter and search engines make against a field.
pub trait FieldCapabilities {
    fn kind(&self) -> FieldKind;

    fn supported_operators(&self) -> &[Operator];

    fn supports_operator(&self, op: Operator) -> bool {
        self.supported_operators().contains(&op)
    }

    /// Whether the field is persisted in a database column.
    fn is_db_field(&self) -> bool;

    /// Whether global search may target this field.
    fn is_searchable(&self) -> bool;

    /// Allowed option keys/labels for enum-like fields.
    fn options(&self) -> Option<&BTreeMap<String, String>> {
        None
    }
}

fn default_true() -> bool {
    true
}

/// One field of a model, as declared in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true", alias = "isDBField")]
    pub db_field: bool,
    /// `None` lets the field kind decide.
    #[serde(default)]
    pub searchable: Option<bool>,
    /// Enum options, key → label.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Overrides the kind's default operator set.
    #[serde(default)]
    pub operators: Option<Vec<Operator>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            db_field: true,
            searchable: None,
            options: BTreeMap::new(),
            operators: None,
        }
    }

    #[must_use]
    pub fn non_db(mut self) -> Self {
        self.db_field = false;
        self
    }

    #[must_use]
    pub fn searchable(mut self, flag: bool) -> Self {
        self.searchable = Some(flag);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    #[must_use]
    pub fn with_operators(mut self, operators: &[Operator]) -> Self {
        self.operators = Some(operators.to_vec());
        self
    }
}

impl FieldCapabilities for FieldDefinition {
    fn kind(&self) -> FieldKind {
        self.kind
    }

    fn supported_operators(&self) -> &[Operator] {
        match &self.operators {
            Some(ops) => ops,
            None => self.kind.default_operators(),
        }
    }

    fn is_db_field(&self) -> bool {
        self.db_field
    }

    fn is_searchable(&self) -> bool {
        match self.kind {
            FieldKind::Password | FieldKind::Image => false,
            FieldKind::BigText => self.searchable == Some(true),
            FieldKind::Enum | FieldKind::Radio | FieldKind::Text | FieldKind::Email => {
                self.searchable != Some(false)
            }
            _ => self.searchable == Some(true),
        }
    }

    fn options(&self) -> Option<&BTreeMap<String, String>> {
        if self.options.is_empty() {
            None
        } else {
            Some(&self.options)
        }
    }
}
