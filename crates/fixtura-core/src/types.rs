use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Primitive value types a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Text,
    Integer,
    Decimal,
    Date,
    Bool,
}

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Bool => "bool",
        }
    }

    /// Numeric scalars interpret length bounds as value bounds.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared shape of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A single primitive value produced by a generator.
    Scalar { scalar: ScalarType },
    /// A nested schema type, generated recursively.
    Object { type_name: String },
    /// A list whose elements are scalars or nested schema types.
    List { element: ElementKind },
}

impl FieldKind {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self::Scalar { scalar }
    }

    pub fn object(type_name: impl Into<String>) -> Self {
        Self::Object {
            type_name: type_name.into(),
        }
    }

    pub fn list_of(element: ElementKind) -> Self {
        Self::List { element }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Name of the nested schema type reached through this field, if any.
    pub fn nested_type(&self) -> Option<&str> {
        match self {
            Self::Object { type_name } => Some(type_name),
            Self::List {
                element: ElementKind::Object { type_name },
            } => Some(type_name),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Scalar { scalar } => scalar.to_string(),
            Self::Object { type_name } => type_name.clone(),
            Self::List { element } => format!("list<{}>", element.describe()),
        }
    }
}

/// Element type of a list field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Scalar { scalar: ScalarType },
    Object { type_name: String },
}

impl ElementKind {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self::Scalar { scalar }
    }

    pub fn object(type_name: impl Into<String>) -> Self {
        Self::Object {
            type_name: type_name.into(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Scalar { scalar } => scalar.to_string(),
            Self::Object { type_name } => type_name.clone(),
        }
    }
}
