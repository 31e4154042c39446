use serde::{Deserialize, Serialize};

use fixtura_core::{InvalidityKind, SchemaCatalog};

use crate::builder::FixtureBuilder;
use crate::config::GlobalConfig;
use crate::errors::GenerationError;
use crate::value::Value;

/// Everything a builder chain expresses, as data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureRequest {
    /// Schema type to populate.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub only_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub config: GlobalConfig,
    /// Entries are registered in order, so earlier entries win on overlap.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalidations: Vec<InvalidationEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_list_sizes: Vec<ListSizeEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_locales: Vec<LocaleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvalidationEntry {
    pub path: String,
    pub kind: InvalidityKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListSizeEntry {
    pub path: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleEntry {
    pub path: String,
    pub locale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueEntry {
    pub path: String,
    pub value: serde_json::Value,
}

fn default_count() -> usize {
    1
}

impl FixtureRequest {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            count: default_count(),
            locale: None,
            only_required: false,
            tags: Vec::new(),
            seed: None,
            strict: false,
            max_depth: None,
            config: GlobalConfig::default(),
            invalidations: Vec::new(),
            fixed_list_sizes: Vec::new(),
            field_locales: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, GenerationError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Builder configured with every option and override in this request.
    /// Path errors surface when the builder builds.
    pub fn apply<'c>(&self, catalog: &'c SchemaCatalog) -> FixtureBuilder<'c> {
        let mut builder = FixtureBuilder::new(catalog, &self.type_name)
            .with_config(self.config)
            .strict(self.strict)
            .with_tags(self.tags.iter().cloned());
        if self.only_required {
            builder = builder.only_required();
        }
        if let Some(locale) = &self.locale {
            builder = builder.with_locale(locale);
        }
        if let Some(seed) = self.seed {
            builder = builder.with_seed(seed);
        }
        if let Some(max_depth) = self.max_depth {
            builder = builder.with_max_depth(max_depth);
        }
        for entry in &self.values {
            builder = builder.set_value(entry.path.as_str(), Value::from(&entry.value));
        }
        for entry in &self.invalidations {
            builder = builder.invalidate(entry.path.as_str(), entry.kind);
        }
        for entry in &self.fixed_list_sizes {
            builder = builder.with_fixed_list_size(entry.path.as_str(), entry.size);
        }
        for entry in &self.field_locales {
            builder = builder.set_field_locale(entry.path.as_str(), entry.locale.as_str());
        }
        builder
    }
}
