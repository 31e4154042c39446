use fixtura_core::{InvalidityKind, ScalarType, ValueFormat};

use crate::errors::GenerationError;
use crate::generators::{FieldContext, FieldGenerator, GeneratorRegistry, shared};
use crate::provider::ValueProvider;
use crate::value::Value;

pub(crate) fn register(registry: &mut GeneratorRegistry) {
    registry.register_generator(Box::new(NameGenerator));
    registry.register_generator(Box::new(PatronymicGenerator));
    registry.register_generator(Box::new(EmailGenerator));
}

/// First and last names.
pub struct NameGenerator;

impl FieldGenerator for NameGenerator {
    fn id(&self) -> &'static str {
        "person.name"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        let name = field.name_lower();
        field.scalar == ScalarType::Text
            && (name.contains("firstname") || name.contains("lastname") || name.contains("surname"))
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let raw = if field.name_lower().contains("first") {
            provider.first_name()
        } else {
            provider.last_name()
        };
        shared::conform_text(field, raw, provider).map(Value::Text)
    }
}

/// Patronymics and middle names.
pub struct PatronymicGenerator;

impl FieldGenerator for PatronymicGenerator {
    fn id(&self) -> &'static str {
        "person.patronymic"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        let name = field.name_lower();
        field.scalar == ScalarType::Text
            && (name.contains("patronymic") || name.contains("middlename"))
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let raw = provider.first_name();
        shared::conform_text(field, raw, provider).map(Value::Text)
    }
}

/// Email addresses, by name or declared format.
pub struct EmailGenerator;

impl FieldGenerator for EmailGenerator {
    fn id(&self) -> &'static str {
        "person.email"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        field.scalar == ScalarType::Text
            && (field.meta.format == Some(ValueFormat::Email)
                || field.name_lower().contains("email"))
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        shared::valid_email(field, provider).map(Value::Text)
    }

    fn generate_invalid(
        &self,
        field: &FieldContext<'_>,
        kind: InvalidityKind,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        match kind {
            InvalidityKind::InvalidEmail => Ok(Value::Text(shared::malformed_email(provider))),
            InvalidityKind::ContainsForbiddenCharacters => {
                let base = shared::valid_email(field, provider)?;
                Ok(Value::Text(shared::with_forbidden_character(
                    field.meta, base, provider,
                )))
            }
            _ => shared::invalid_value(field, kind, provider),
        }
    }
}
