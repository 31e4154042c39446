use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::invalid::InvalidityKind;

pub const DEFAULT_MAX_LENGTH: i64 = i32::MAX as i64;
pub const DEFAULT_MIN_YEAR_OFFSET: i32 = -100;
pub const DEFAULT_MAX_YEAR_OFFSET: i32 = 100;
pub const DEFAULT_MIN_ITEMS: u32 = 1;
pub const DEFAULT_MAX_ITEMS: u32 = 5;

/// Semantic format hint for text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Email,
}

/// Generation metadata attached to a field.
///
/// For text fields `min_length`/`max_length` bound the character count; for
/// numeric fields they bound the value itself. Year offsets are relative to
/// the current date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldMeta {
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub min_length: i64,
    #[serde(default = "default_max_length")]
    pub max_length: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub forbidden_characters: String,
    #[serde(default = "default_min_year_offset")]
    pub min_year_offset: i32,
    #[serde(default = "default_max_year_offset")]
    pub max_year_offset: i32,
    /// Invalidity kinds this field declares as meaningful.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub invalid_kinds: BTreeSet<InvalidityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
    /// Regular expression a valid value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self {
            required: true,
            tags: BTreeSet::new(),
            min_length: 0,
            max_length: DEFAULT_MAX_LENGTH,
            forbidden_characters: String::new(),
            min_year_offset: DEFAULT_MIN_YEAR_OFFSET,
            max_year_offset: DEFAULT_MAX_YEAR_OFFSET,
            invalid_kinds: BTreeSet::new(),
            format: None,
            pattern: None,
        }
    }
}

impl FieldMeta {
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_length(mut self, min: i64, max: i64) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_forbidden(mut self, characters: impl Into<String>) -> Self {
        self.forbidden_characters = characters.into();
        self
    }

    pub fn with_year_offsets(mut self, min: i32, max: i32) -> Self {
        self.min_year_offset = min;
        self.max_year_offset = max;
        self
    }

    pub fn with_invalid_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = InvalidityKind>,
    {
        self.invalid_kinds.extend(kinds);
        self
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_forbidden(&self, ch: char) -> bool {
        self.forbidden_characters.contains(ch)
    }

    /// True when the field carries at least one of `tags`.
    pub fn has_any_tag<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        tags.into_iter().any(|tag| self.tags.contains(tag))
    }
}

/// Inclusive cardinality bounds for list fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ListBounds {
    #[serde(default = "default_min_items")]
    pub min_items: u32,
    #[serde(default = "default_max_items")]
    pub max_items: u32,
}

impl Default for ListBounds {
    fn default() -> Self {
        Self {
            min_items: DEFAULT_MIN_ITEMS,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl ListBounds {
    pub fn new(min_items: u32, max_items: u32) -> Self {
        Self {
            min_items,
            max_items,
        }
    }
}

fn default_required() -> bool {
    true
}

fn default_max_length() -> i64 {
    DEFAULT_MAX_LENGTH
}

fn default_min_year_offset() -> i32 {
    DEFAULT_MIN_YEAR_OFFSET
}

fn default_max_year_offset() -> i32 {
    DEFAULT_MAX_YEAR_OFFSET
}

fn default_min_items() -> u32 {
    DEFAULT_MIN_ITEMS
}

fn default_max_items() -> u32 {
    DEFAULT_MAX_ITEMS
}
