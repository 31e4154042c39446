use fixtura_core::{InvalidityKind, ScalarType};

use crate::errors::GenerationError;
use crate::generators::{FieldContext, FieldGenerator, GeneratorRegistry, shared};
use crate::provider::ValueProvider;
use crate::value::Value;

pub(crate) fn register(registry: &mut GeneratorRegistry) {
    for part in [AddressPart::Street, AddressPart::City, AddressPart::Region] {
        registry.register_generator(Box::new(AddressGenerator::new(part)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPart {
    Street,
    City,
    Region,
}

/// Street lines, city names and regions from the locale's address data.
#[derive(Debug)]
pub struct AddressGenerator {
    part: AddressPart,
}

impl AddressGenerator {
    pub fn new(part: AddressPart) -> Self {
        Self { part }
    }

    fn raw(&self, provider: &mut dyn ValueProvider) -> String {
        match self.part {
            AddressPart::Street => provider.street_address(),
            AddressPart::City => provider.city(),
            AddressPart::Region => provider.region(),
        }
    }
}

impl FieldGenerator for AddressGenerator {
    fn id(&self) -> &'static str {
        match self.part {
            AddressPart::Street => "address.street",
            AddressPart::City => "address.city",
            AddressPart::Region => "address.region",
        }
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        if field.scalar != ScalarType::Text {
            return false;
        }
        match self.part {
            AddressPart::Street => field.name_lower().contains("street"),
            AddressPart::City => field.has_token("city"),
            AddressPart::Region => field.has_token("region") || field.has_token("state"),
        }
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let raw = self.raw(provider);
        shared::conform_text(field, raw, provider).map(Value::Text)
    }

    fn generate_invalid(
        &self,
        field: &FieldContext<'_>,
        kind: InvalidityKind,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        match kind {
            InvalidityKind::ContainsForbiddenCharacters => {
                let base = self.raw(provider);
                Ok(Value::Text(shared::with_forbidden_character(
                    field.meta, base, provider,
                )))
            }
            _ => shared::invalid_value(field, kind, provider),
        }
    }
}
