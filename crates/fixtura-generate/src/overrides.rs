use std::collections::BTreeSet;

use fixtura_core::{
    ElementKind, FieldKind, FieldMeta, FieldPath, InvalidityKind, PathPattern, PathSegment,
    SchemaCatalog,
};

use crate::errors::GenerationError;
use crate::value::Value;

/// Converts caller input into a [`PathPattern`]: slash-separated strings,
/// segment arrays, or a pattern.
pub trait IntoPathPattern {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern>;
}

impl IntoPathPattern for PathPattern {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        Ok(self)
    }
}

impl IntoPathPattern for &PathPattern {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        Ok(self.clone())
    }
}

impl IntoPathPattern for &str {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        self.parse()
    }
}

impl IntoPathPattern for String {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        self.parse()
    }
}

impl<const N: usize> IntoPathPattern for [&str; N] {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        PathPattern::parse(self)
    }
}

impl IntoPathPattern for &[&str] {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        PathPattern::parse(self)
    }
}

impl IntoPathPattern for Vec<String> {
    fn into_pattern(self) -> fixtura_core::Result<PathPattern> {
        PathPattern::parse(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEntry<T> {
    pub pattern: PathPattern,
    pub payload: T,
}

/// Caller-supplied overrides. Each kind keeps registration order and lookups
/// return the first entry whose pattern matches.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    values: Vec<OverrideEntry<Value>>,
    invalidations: Vec<OverrideEntry<InvalidityKind>>,
    list_sizes: Vec<OverrideEntry<usize>>,
    locales: Vec<OverrideEntry<String>>,
}

fn first_match<'a, T>(entries: &'a [OverrideEntry<T>], path: &FieldPath) -> Option<&'a T> {
    entries
        .iter()
        .find(|entry| entry.pattern.matches(path))
        .map(|entry| &entry.payload)
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, pattern: PathPattern, value: Value) {
        self.values.push(OverrideEntry {
            pattern,
            payload: value,
        });
    }

    pub fn invalidate(&mut self, pattern: PathPattern, kind: InvalidityKind) {
        self.invalidations.push(OverrideEntry {
            pattern,
            payload: kind,
        });
    }

    pub fn fix_list_size(&mut self, pattern: PathPattern, size: usize) {
        self.list_sizes.push(OverrideEntry {
            pattern,
            payload: size,
        });
    }

    pub fn set_locale(&mut self, pattern: PathPattern, locale: impl Into<String>) {
        self.locales.push(OverrideEntry {
            pattern,
            payload: locale.into(),
        });
    }

    pub fn manual_value(&self, path: &FieldPath) -> Option<&Value> {
        first_match(&self.values, path)
    }

    pub fn invalidity(&self, path: &FieldPath) -> Option<InvalidityKind> {
        first_match(&self.invalidations, path).copied()
    }

    pub fn list_size(&self, path: &FieldPath) -> Option<usize> {
        first_match(&self.list_sizes, path).copied()
    }

    /// Locale registered for exactly this path. Inheritance from enclosing
    /// paths is resolved by the walker.
    pub fn locale(&self, path: &FieldPath) -> Option<&str> {
        first_match(&self.locales, path).map(String::as_str)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &PathPattern> {
        self.values
            .iter()
            .map(|entry| &entry.pattern)
            .chain(self.invalidations.iter().map(|entry| &entry.pattern))
            .chain(self.list_sizes.iter().map(|entry| &entry.pattern))
            .chain(self.locales.iter().map(|entry| &entry.pattern))
    }

    /// Largest concrete index any pattern addresses directly below `path`.
    pub fn highest_index_below(&self, path: &FieldPath) -> Option<usize> {
        self.patterns()
            .filter_map(|pattern| match pattern.next_segment_below(path) {
                Some(PathSegment::Index(index)) => Some(*index),
                _ => None,
            })
            .max()
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.invalidations.len() + self.list_sizes.len() + self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies that every pattern reaching below `path` addresses a child
    /// the node can have. `node` names the field (or root type) for errors.
    ///
    /// A pattern that reached `path` through a wildcard standing for a field
    /// name also matches the node's siblings, which may have other shapes;
    /// for such a pattern a node that cannot hold the next segment is a
    /// non-match rather than an error.
    pub fn check_fit(
        &self,
        path: &FieldPath,
        node: &str,
        shape: NodeShape<'_>,
        catalog: &SchemaCatalog,
    ) -> Result<(), GenerationError> {
        for pattern in self.patterns() {
            let Some(next) = pattern.next_segment_below(path) else {
                continue;
            };
            if spans_field_wildcard(pattern, path) {
                continue;
            }
            if let Some(reason) = shape.rejects(next, catalog) {
                return Err(GenerationError::MalformedPath {
                    pattern: pattern.to_string(),
                    field: node.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

fn spans_field_wildcard(pattern: &PathPattern, path: &FieldPath) -> bool {
    pattern
        .segments()
        .iter()
        .zip(path.segments())
        .any(|(segment, concrete)| {
            *segment == PathSegment::Wildcard && matches!(concrete, PathSegment::Field(_))
        })
}

/// Structural kind of a node in the generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape<'a> {
    Scalar,
    Object(&'a str),
    List,
}

impl<'a> NodeShape<'a> {
    pub fn of_field(kind: &'a FieldKind) -> Self {
        match kind {
            FieldKind::Scalar { .. } => Self::Scalar,
            FieldKind::Object { type_name } => Self::Object(type_name),
            FieldKind::List { .. } => Self::List,
        }
    }

    pub fn of_element(element: &'a ElementKind) -> Self {
        match element {
            ElementKind::Scalar { .. } => Self::Scalar,
            ElementKind::Object { type_name } => Self::Object(type_name),
        }
    }

    fn rejects(self, next: &PathSegment, catalog: &SchemaCatalog) -> Option<String> {
        match (self, next) {
            (Self::Scalar, _) => Some("scalar fields have no children".to_string()),
            (Self::Object(_), PathSegment::Index(index)) => Some(format!(
                "index [{index}] applied to a non-list field"
            )),
            (Self::Object(type_name), PathSegment::Field(name)) => {
                let schema = catalog.get(type_name)?;
                if schema.get_field(name).is_some() {
                    None
                } else {
                    Some(format!("type '{type_name}' has no field '{name}'"))
                }
            }
            (Self::List, PathSegment::Field(name)) => Some(format!(
                "list elements are addressed by [index] or *, found '{name}'"
            )),
            _ => None,
        }
    }
}

/// Global skip rules applied before any override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    pub only_required: bool,
    pub tags: BTreeSet<String>,
}

impl FieldFilter {
    pub fn admits(&self, meta: &FieldMeta) -> bool {
        if self.only_required && !meta.required {
            return false;
        }
        self.tags.is_empty() || meta.has_any_tag(&self.tags)
    }
}

#[cfg(test)]
mod tests {
    use fixtura_core::{FieldSchema, ScalarType, TypeSchema};

    use super::*;

    fn pattern(raw: &str) -> PathPattern {
        raw.parse().expect("pattern")
    }

    fn path(raw: &[&str]) -> FieldPath {
        FieldPath::parse(raw).expect("path")
    }

    #[test]
    fn first_registered_pattern_wins() {
        let mut registry = OverrideRegistry::new();
        registry.invalidate(pattern("addresses/[0]/street"), InvalidityKind::TooLong);
        registry.invalidate(pattern("addresses/*/street"), InvalidityKind::TooShort);

        let first = path(&["addresses", "[0]", "street"]);
        let second = path(&["addresses", "[1]", "street"]);
        assert_eq!(registry.invalidity(&first), Some(InvalidityKind::TooLong));
        assert_eq!(registry.invalidity(&second), Some(InvalidityKind::TooShort));
    }

    #[test]
    fn broad_pattern_registered_first_shadows_specific_one() {
        let mut registry = OverrideRegistry::new();
        registry.fix_list_size(pattern("*"), 1);
        registry.fix_list_size(pattern("addresses"), 4);
        assert_eq!(registry.list_size(&path(&["addresses"])), Some(1));
    }

    #[test]
    fn lookups_require_equal_arity() {
        let mut registry = OverrideRegistry::new();
        registry.set_locale(pattern("addresses"), "fr-FR");
        assert_eq!(registry.locale(&path(&["addresses"])), Some("fr-FR"));
        assert_eq!(registry.locale(&path(&["addresses", "[0]"])), None);
    }

    #[test]
    fn reports_highest_addressed_index() {
        let mut registry = OverrideRegistry::new();
        registry.set_value(pattern("addresses/[1]/city"), Value::from("Moscow"));
        registry.invalidate(pattern("addresses/[4]/street"), InvalidityKind::TooShort);
        registry.invalidate(pattern("addresses/*/street"), InvalidityKind::TooShort);
        assert_eq!(registry.highest_index_below(&path(&["addresses"])), Some(4));
        assert_eq!(registry.highest_index_below(&path(&["phones"])), None);
    }

    #[test]
    fn accepts_several_path_spellings() {
        let from_str = "a/[1]/b".into_pattern().expect("str");
        let from_array = ["a", "[1]", "b"].into_pattern().expect("array");
        let from_vec = vec!["a".to_string(), "[1]".to_string(), "b".to_string()]
            .into_pattern()
            .expect("vec");
        assert_eq!(from_str, from_array);
        assert_eq!(from_array, from_vec);
        assert!("a//b".into_pattern().is_err());
    }

    #[test]
    fn check_fit_reports_malformed_structure() {
        let catalog = SchemaCatalog::new().with_type(
            TypeSchema::new("Address").field(FieldSchema::new(
                "city",
                FieldKind::scalar(ScalarType::Text),
                FieldMeta::default(),
            )),
        );
        let mut registry = OverrideRegistry::new();
        registry.invalidate(pattern("email/[0]"), InvalidityKind::TooShort);
        let email = path(&["email"]);
        let err = registry
            .check_fit(&email, "email", NodeShape::Scalar, &catalog)
            .expect_err("scalar has no children");
        assert!(matches!(err, GenerationError::MalformedPath { .. }));

        let mut registry = OverrideRegistry::new();
        registry.set_value(pattern("address/[1]/city"), Value::from("Moscow"));
        let address = path(&["address"]);
        assert!(
            registry
                .check_fit(&address, "address", NodeShape::Object("Address"), &catalog)
                .is_err()
        );

        let mut registry = OverrideRegistry::new();
        registry.set_value(pattern("address/town"), Value::from("Moscow"));
        assert!(
            registry
                .check_fit(&address, "address", NodeShape::Object("Address"), &catalog)
                .is_err()
        );

        let mut registry = OverrideRegistry::new();
        registry.set_value(pattern("address/city"), Value::from("Moscow"));
        registry.set_value(pattern("other/[3]/x"), Value::from("ignored"));
        assert!(
            registry
                .check_fit(&address, "address", NodeShape::Object("Address"), &catalog)
                .is_ok()
        );
    }

    #[test]
    fn field_wildcard_skips_siblings_of_other_shapes() {
        let catalog = SchemaCatalog::new().with_type(
            TypeSchema::new("Address").field(FieldSchema::new(
                "street",
                FieldKind::scalar(ScalarType::Text),
                FieldMeta::default(),
            )),
        );
        let mut registry = OverrideRegistry::new();
        registry.invalidate(pattern("*/street"), InvalidityKind::TooShort);
        let name = path(&["firstName"]);
        assert!(registry.check_fit(&name, "firstName", NodeShape::Scalar, &catalog).is_ok());
        let tags = path(&["tags"]);
        assert!(registry.check_fit(&tags, "tags", NodeShape::List, &catalog).is_ok());

        let mut registry = OverrideRegistry::new();
        registry.invalidate(pattern("addresses/*/town"), InvalidityKind::TooShort);
        let element = path(&["addresses", "[0]"]);
        let err = registry
            .check_fit(&element, "addresses", NodeShape::Object("Address"), &catalog)
            .expect_err("index wildcard still checks the element type");
        assert!(matches!(err, GenerationError::MalformedPath { .. }));
    }

    #[test]
    fn filter_applies_required_and_tags() {
        let filter = FieldFilter {
            only_required: true,
            tags: BTreeSet::from(["contact".to_string()]),
        };
        assert!(filter.admits(&FieldMeta::default().with_tags(["contact"])));
        assert!(!filter.admits(&FieldMeta::default()));
        assert!(!filter.admits(&FieldMeta::default().optional().with_tags(["contact"])));
        assert!(FieldFilter::default().admits(&FieldMeta::default().optional()));
    }
}
