use fixtura_core::ScalarType;

use crate::errors::GenerationError;
use crate::generators::{FieldContext, FieldGenerator, GeneratorRegistry, shared};
use crate::provider::ValueProvider;
use crate::value::Value;

/// Upper bound for amounts when the declared maximum is left at its default.
const DEFAULT_AMOUNT_CEILING: i64 = 1_000_000;

pub(crate) fn register(registry: &mut GeneratorRegistry) {
    registry.register_generator(Box::new(AmountGenerator));
    registry.register_generator(Box::new(DayCountGenerator));
}

/// Monetary amounts with two decimal places.
pub struct AmountGenerator;

impl FieldGenerator for AmountGenerator {
    fn id(&self) -> &'static str {
        "numeric.amount"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        let name = field.name_lower();
        field.scalar == ScalarType::Decimal && (name.contains("amount") || name.contains("sum"))
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let (min, max) = shared::numeric_bounds(field.meta);
        let ceiling = if max == fixtura_core::constraints::DEFAULT_MAX_LENGTH {
            max.min(min.saturating_add(DEFAULT_AMOUNT_CEILING))
        } else {
            max
        };
        Ok(Value::Decimal(
            provider.decimal_between(min as f64, ceiling as f64),
        ))
    }
}

/// Whole day counts.
pub struct DayCountGenerator;

impl FieldGenerator for DayCountGenerator {
    fn id(&self) -> &'static str {
        "numeric.days"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        field.scalar == ScalarType::Integer && (field.has_token("day") || field.has_token("days"))
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        Ok(Value::Int(shared::valid_int(field.meta, provider)))
    }
}
