use crate::errors::GenerationError;
use crate::generators::{FieldContext, FieldGenerator, shared};
use crate::provider::ValueProvider;
use crate::value::Value;

/// Accepts every scalar field and produces a type-driven value within the
/// declared bounds.
#[derive(Debug, Default)]
pub struct DefaultGenerator;

impl DefaultGenerator {
    pub const ID: &'static str = "fallback.default";
}

impl FieldGenerator for DefaultGenerator {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn supports(&self, _field: &FieldContext<'_>) -> bool {
        true
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        shared::valid_value(field, provider)
    }
}
