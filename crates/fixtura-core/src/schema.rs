use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{FieldMeta, ListBounds};
use crate::types::FieldKind;

/// Registered schema types available to the generation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SchemaCatalog {
    /// Contract version for this catalog format.
    #[serde(default = "default_version")]
    pub schema_version: String,
    /// Declared types, looked up by name.
    pub types: Vec<TypeSchema>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self {
            schema_version: default_version(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, schema: TypeSchema) -> Self {
        self.types.push(schema);
        self
    }

    pub fn register(&mut self, schema: TypeSchema) {
        self.types.push(schema);
    }

    pub fn get(&self, name: &str) -> Option<&TypeSchema> {
        self.types.iter().find(|schema| schema.name == name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|schema| schema.name.as_str())
    }
}

/// A declared type: an ordered list of fields plus default locales.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TypeSchema {
    pub name: String,
    /// BCP-47 tags; one is picked at random per build unless overridden.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_locales: Vec<String>,
    pub fields: Vec<FieldSchema>,
}

impl TypeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_locales: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_default_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_locales = locales.into_iter().map(Into::into).collect();
        self
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// One field of a declared type.
///
/// Fields without `meta` are part of the shape but never generated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldSchema {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FieldMeta>,
    /// Cardinality bounds; only meaningful for list fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListBounds>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind, meta: FieldMeta) -> Self {
        Self {
            name: name.into(),
            kind,
            meta: Some(meta),
            list: None,
        }
    }

    /// A field that carries no generation metadata.
    pub fn bare(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            meta: None,
            list: None,
        }
    }

    pub fn with_list_bounds(mut self, min_items: u32, max_items: u32) -> Self {
        self.list = Some(ListBounds::new(min_items, max_items));
        self
    }

    pub fn list_bounds(&self) -> ListBounds {
        self.list.unwrap_or_default()
    }
}

fn default_version() -> String {
    crate::SCHEMA_VERSION.to_string()
}
