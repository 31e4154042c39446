pub mod address;
pub mod document;
pub mod fallback;
pub mod numeric;
pub mod person;
pub mod shared;

use chrono::NaiveDate;
use tracing::debug;

use fixtura_core::{FieldMeta, FieldPath, FieldSchema, InvalidityKind, ScalarType};

use crate::config::GlobalConfig;
use crate::errors::GenerationError;
use crate::provider::ValueProvider;
use crate::value::Value;

/// Everything a generator may inspect about the field being generated.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Name of the schema type declaring the field.
    pub owner: &'a str,
    pub field: &'a FieldSchema,
    pub meta: &'a FieldMeta,
    /// Scalar type of the value; for list fields, the element type.
    pub scalar: ScalarType,
    pub path: &'a FieldPath,
    /// Anchor for year offsets.
    pub today: NaiveDate,
}

impl<'a> FieldContext<'a> {
    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    pub fn name_lower(&self) -> String {
        self.field.name.to_ascii_lowercase()
    }

    pub fn owner_lower(&self) -> String {
        self.owner.to_ascii_lowercase()
    }

    /// Lowercase words of the field name, split on case changes and
    /// separators (`passportSeries` -> `passport`, `series`).
    pub fn name_tokens(&self) -> Vec<String> {
        split_words(&self.field.name)
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.name_tokens().iter().any(|word| word == token)
    }
}

fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Strategy producing valid or deliberately invalid values for the fields it
/// claims.
pub trait FieldGenerator {
    fn id(&self) -> &'static str;

    fn supports(&self, field: &FieldContext<'_>) -> bool;

    /// Produces a value conforming to the field's declared bounds.
    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError>;

    /// Produces a value violating exactly `kind`. Kinds the generator does
    /// not specialise use the per-type helpers in [`shared`].
    fn generate_invalid(
        &self,
        field: &FieldContext<'_>,
        kind: InvalidityKind,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        shared::invalid_value(field, kind, provider)
    }

    /// Generators that read [`GlobalConfig`] expose themselves here.
    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableGenerator> {
        None
    }
}

/// A generator that caches process-level flags before a run.
pub trait ConfigurableGenerator {
    fn configure(&mut self, config: &GlobalConfig);
}

/// Ordered generator list with a mandatory fallback.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn FieldGenerator>>,
    fallback: Box<dyn FieldGenerator>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    /// Registry with every built-in generator in priority order.
    pub fn new() -> Self {
        let mut registry = Self::with_fallback(Box::new(fallback::DefaultGenerator));
        person::register(&mut registry);
        document::register(&mut registry);
        address::register(&mut registry);
        numeric::register(&mut registry);
        registry
    }

    /// Registry containing only `fallback`.
    pub fn with_fallback(fallback: Box<dyn FieldGenerator>) -> Self {
        Self {
            generators: Vec::new(),
            fallback,
        }
    }

    /// Appends a generator; earlier registrations take priority.
    pub fn register_generator(&mut self, generator: Box<dyn FieldGenerator>) {
        self.generators.push(generator);
    }

    pub fn generator_ids(&self) -> Vec<&'static str> {
        self.generators
            .iter()
            .chain(std::iter::once(&self.fallback))
            .map(|generator| generator.id())
            .collect()
    }

    /// Hands `config` to every configurable generator, fallback included.
    pub fn configure(&mut self, config: &GlobalConfig) {
        for generator in self
            .generators
            .iter_mut()
            .chain(std::iter::once(&mut self.fallback))
        {
            if let Some(configurable) = generator.as_configurable() {
                configurable.configure(config);
            }
        }
    }

    /// First generator accepting `field`, then the fallback.
    pub fn select(&self, field: &FieldContext<'_>) -> Option<&dyn FieldGenerator> {
        self.generators
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|generator| generator.supports(field))
            .map(|generator| generator.as_ref())
    }

    /// Generates a value for `field`, invalid of `invalid` when given.
    /// Returns the id of the generator used.
    pub fn dispatch(
        &self,
        field: &FieldContext<'_>,
        invalid: Option<InvalidityKind>,
        provider: &mut dyn ValueProvider,
    ) -> Result<(&'static str, Value), GenerationError> {
        if let Some(kind) = invalid {
            if !kind.applies_to(field.scalar) {
                return Err(GenerationError::UnsupportedInvalidity {
                    path: field.path.to_string(),
                    kind,
                    scalar: field.scalar.to_string(),
                });
            }
        }
        let generator = self
            .select(field)
            .ok_or_else(|| GenerationError::UnsupportedField {
                path: field.path.to_string(),
                field: field.field.name.clone(),
            })?;
        debug!(
            path = %field.path,
            generator = generator.id(),
            invalid = invalid.map(InvalidityKind::as_str),
            "generator selected"
        );
        let value = match invalid {
            Some(kind) => generator.generate_invalid(field, kind, provider)?,
            None => generator.generate_valid(field, provider)?,
        };
        Ok((generator.id(), value))
    }
}

#[cfg(test)]
mod tests {
    use fixtura_core::FieldKind;

    use super::*;
    use crate::provider::{FakeProviderFactory, ProviderCache};

    fn field(name: &str, scalar: ScalarType) -> FieldSchema {
        FieldSchema::new(name, FieldKind::scalar(scalar), FieldMeta::default())
    }

    fn context<'a>(
        owner: &'a str,
        schema: &'a FieldSchema,
        path: &'a FieldPath,
        scalar: ScalarType,
    ) -> FieldContext<'a> {
        FieldContext {
            owner,
            field: schema,
            meta: schema.meta.as_ref().expect("meta"),
            scalar,
            path,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }

    struct Never;

    impl FieldGenerator for Never {
        fn id(&self) -> &'static str {
            "test.never"
        }

        fn supports(&self, _field: &FieldContext<'_>) -> bool {
            false
        }

        fn generate_valid(
            &self,
            _field: &FieldContext<'_>,
            _provider: &mut dyn ValueProvider,
        ) -> Result<Value, GenerationError> {
            Ok(Value::Absent)
        }
    }

    struct Constant(&'static str);

    impl FieldGenerator for Constant {
        fn id(&self) -> &'static str {
            self.0
        }

        fn supports(&self, field: &FieldContext<'_>) -> bool {
            field.scalar == ScalarType::Text
        }

        fn generate_valid(
            &self,
            _field: &FieldContext<'_>,
            _provider: &mut dyn ValueProvider,
        ) -> Result<Value, GenerationError> {
            Ok(Value::from(self.0))
        }
    }

    #[test]
    fn splits_field_names_into_words() {
        assert_eq!(split_words("passportSeries"), vec!["passport", "series"]);
        assert_eq!(split_words("inn_ul"), vec!["inn", "ul"]);
        assert_eq!(split_words("daysCount"), vec!["days", "count"]);
        assert_eq!(split_words("INN"), vec!["inn"]);
    }

    #[test]
    fn first_registered_generator_wins() {
        let mut registry = GeneratorRegistry::with_fallback(Box::new(fallback::DefaultGenerator));
        registry.register_generator(Box::new(Constant("first")));
        registry.register_generator(Box::new(Constant("second")));
        let schema = field("note", ScalarType::Text);
        let path = FieldPath::root().child("note");
        let ctx = context("Memo", &schema, &path, ScalarType::Text);
        let factory = FakeProviderFactory;
        let mut cache = ProviderCache::new(&factory, 1, false);
        let provider = cache.get("en").expect("provider");

        let (id, value) = registry.dispatch(&ctx, None, provider).expect("dispatch");
        assert_eq!(id, "first");
        assert_eq!(value, Value::from("first"));
    }

    #[test]
    fn fallback_is_listed_last() {
        let registry = GeneratorRegistry::new();
        let ids = registry.generator_ids();
        assert_eq!(ids.last(), Some(&fallback::DefaultGenerator::ID));
        assert_eq!(ids.first(), Some(&"person.name"));
    }

    #[test]
    fn unclaimed_field_is_a_configuration_defect() {
        let registry = GeneratorRegistry::with_fallback(Box::new(Never));
        let schema = field("note", ScalarType::Text);
        let path = FieldPath::root().child("note");
        let ctx = context("Memo", &schema, &path, ScalarType::Text);
        let factory = FakeProviderFactory;
        let mut cache = ProviderCache::new(&factory, 1, false);
        let provider = cache.get("en").expect("provider");

        let result = registry.dispatch(&ctx, None, provider);
        assert!(matches!(result, Err(GenerationError::UnsupportedField { .. })));
    }

    #[test]
    fn rejects_kind_not_applicable_to_scalar() {
        let registry = GeneratorRegistry::new();
        let schema = field("note", ScalarType::Text);
        let path = FieldPath::root().child("note");
        let ctx = context("Memo", &schema, &path, ScalarType::Text);
        let factory = FakeProviderFactory;
        let mut cache = ProviderCache::new(&factory, 1, false);
        let provider = cache.get("en").expect("provider");

        let result = registry.dispatch(&ctx, Some(InvalidityKind::TooOldDate), provider);
        assert!(matches!(
            result,
            Err(GenerationError::UnsupportedInvalidity {
                kind: InvalidityKind::TooOldDate,
                ..
            })
        ));
    }
}
