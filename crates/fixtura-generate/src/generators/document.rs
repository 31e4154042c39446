use fixtura_core::{InvalidityKind, ScalarType};

use crate::config::GlobalConfig;
use crate::errors::GenerationError;
use crate::generators::{
    ConfigurableGenerator, FieldContext, FieldGenerator, GeneratorRegistry, shared,
};
use crate::provider::ValueProvider;
use crate::value::Value;

const LEGAL_ENTITY_COEFFICIENTS: [u32; 9] = [2, 4, 10, 3, 5, 9, 4, 6, 8];
const INDIVIDUAL_FIRST_COEFFICIENTS: [u32; 10] = [7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
const INDIVIDUAL_SECOND_COEFFICIENTS: [u32; 11] = [3, 7, 2, 4, 10, 3, 5, 9, 4, 6, 8];

pub(crate) fn register(registry: &mut GeneratorRegistry) {
    registry.register_generator(Box::new(TaxIdGenerator::default()));
    registry.register_generator(Box::new(KppGenerator));
    for part in [
        PassportPart::Series,
        PassportPart::Number,
        PassportPart::Code,
    ] {
        registry.register_generator(Box::new(PassportGenerator::new(part)));
    }
}

/// Weighted digit sum modulo 11, with 10 folded to 0.
pub fn tax_id_check_digit(digits: &[u32], coefficients: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip(coefficients)
        .map(|(digit, coefficient)| digit * coefficient)
        .sum();
    match sum % 11 {
        10 => 0,
        remainder => remainder,
    }
}

/// Checks length and check digits of a 10- or 12-digit tax id.
pub fn is_valid_tax_id(value: &str) -> bool {
    let digits: Option<Vec<u32>> = value.chars().map(|ch| ch.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    match digits.len() {
        10 => digits[9] == tax_id_check_digit(&digits, &LEGAL_ENTITY_COEFFICIENTS),
        12 => {
            digits[10] == tax_id_check_digit(&digits, &INDIVIDUAL_FIRST_COEFFICIENTS)
                && digits[11] == tax_id_check_digit(&digits, &INDIVIDUAL_SECOND_COEFFICIENTS)
        }
        _ => false,
    }
}

fn random_digits(provider: &mut dyn ValueProvider, len: usize) -> Vec<u32> {
    provider
        .digits(len)
        .chars()
        .filter_map(|ch| ch.to_digit(10))
        .collect()
}

fn render(digits: &[u32]) -> String {
    digits
        .iter()
        .filter_map(|digit| char::from_digit(*digit, 10))
        .collect()
}

/// Taxpayer id (`inn`): 12-digit individual numbers by default, 10-digit
/// legal-entity numbers when configured. Check digits are always valid.
#[derive(Debug, Default)]
pub struct TaxIdGenerator {
    legal_entity: bool,
}

impl TaxIdGenerator {
    pub fn legal_entity(&self) -> bool {
        self.legal_entity
    }

    fn generate(&self, provider: &mut dyn ValueProvider) -> String {
        if self.legal_entity {
            let mut digits = random_digits(provider, 9);
            digits.push(tax_id_check_digit(&digits, &LEGAL_ENTITY_COEFFICIENTS));
            render(&digits)
        } else {
            let mut digits = random_digits(provider, 10);
            digits.push(tax_id_check_digit(&digits, &INDIVIDUAL_FIRST_COEFFICIENTS));
            digits.push(tax_id_check_digit(&digits, &INDIVIDUAL_SECOND_COEFFICIENTS));
            render(&digits)
        }
    }
}

impl ConfigurableGenerator for TaxIdGenerator {
    fn configure(&mut self, config: &GlobalConfig) {
        self.legal_entity = config.legal_entity_tax_id;
    }
}

impl FieldGenerator for TaxIdGenerator {
    fn id(&self) -> &'static str {
        "document.tax_id"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        field.scalar == ScalarType::Text && field.has_token("inn")
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let raw = self.generate(provider);
        shared::conform_text(field, raw, provider).map(Value::Text)
    }

    fn generate_invalid(
        &self,
        field: &FieldContext<'_>,
        kind: InvalidityKind,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        match kind {
            InvalidityKind::TooShort => Ok(Value::Text(provider.digits(5))),
            InvalidityKind::TooLong => Ok(Value::Text(provider.digits(15))),
            InvalidityKind::ContainsForbiddenCharacters => {
                let base = self.generate(provider);
                Ok(Value::Text(shared::with_forbidden_character(
                    field.meta, base, provider,
                )))
            }
            _ => shared::invalid_value(field, kind, provider),
        }
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableGenerator> {
        Some(self)
    }
}

/// Tax registration reason code (`kpp`): nine digits.
pub struct KppGenerator;

impl FieldGenerator for KppGenerator {
    fn id(&self) -> &'static str {
        "document.kpp"
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        field.scalar == ScalarType::Text && field.has_token("kpp")
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let raw = provider.digits(9);
        shared::conform_text(field, raw, provider).map(Value::Text)
    }

    fn generate_invalid(
        &self,
        field: &FieldContext<'_>,
        kind: InvalidityKind,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        match kind {
            InvalidityKind::TooShort => Ok(Value::Text(provider.digits(3))),
            InvalidityKind::TooLong => Ok(Value::Text(provider.digits(12))),
            InvalidityKind::ContainsForbiddenCharacters => {
                let base = provider.digits(9);
                Ok(Value::Text(shared::with_forbidden_character(
                    field.meta, base, provider,
                )))
            }
            _ => shared::invalid_value(field, kind, provider),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassportPart {
    Series,
    Number,
    Code,
}

impl PassportPart {
    fn keyword(self) -> &'static str {
        match self {
            Self::Series => "series",
            Self::Number => "number",
            Self::Code => "code",
        }
    }
}

/// Passport series, number and issuing-office code. The national layout is
/// numeric; the international one mixes letters and digits.
#[derive(Debug)]
pub struct PassportGenerator {
    part: PassportPart,
    national: bool,
}

impl PassportGenerator {
    pub fn new(part: PassportPart) -> Self {
        Self {
            part,
            national: false,
        }
    }

    pub fn national(&self) -> bool {
        self.national
    }

    fn valid(&self, provider: &mut dyn ValueProvider) -> String {
        match (self.part, self.national) {
            (PassportPart::Series, true) => provider.digits(4),
            (PassportPart::Series, false) => {
                format!("{}-{}", provider.letters(2), provider.digits(3))
            }
            (PassportPart::Number, true) => provider.digits(6),
            (PassportPart::Number, false) => provider.digits(8),
            (PassportPart::Code, true) => {
                format!("{}-{}", provider.digits(3), provider.digits(3))
            }
            (PassportPart::Code, false) => format!(
                "{}-{}-{}",
                provider.letters(2),
                provider.letters(2),
                provider.digits(3)
            ),
        }
    }

    fn too_short(&self, provider: &mut dyn ValueProvider) -> String {
        match (self.part, self.national) {
            (PassportPart::Series, true) => provider.digits(2),
            (PassportPart::Series, false) => provider.digits(1),
            (PassportPart::Number, true) => provider.digits(2),
            (PassportPart::Number, false) => provider.digits(3),
            (PassportPart::Code, _) => provider.digits(3),
        }
    }

    fn too_long(&self, provider: &mut dyn ValueProvider) -> String {
        match (self.part, self.national) {
            (PassportPart::Series, true) => provider.digits(6),
            (PassportPart::Series, false) => {
                format!("{}{}", provider.letters(10), provider.digits(3))
            }
            (PassportPart::Number, true) => provider.digits(10),
            (PassportPart::Number, false) => provider.digits(12),
            (PassportPart::Code, _) => format!(
                "{}-{}-{}-{}",
                provider.digits(3),
                provider.digits(3),
                provider.digits(3),
                provider.digits(3)
            ),
        }
    }
}

impl ConfigurableGenerator for PassportGenerator {
    fn configure(&mut self, config: &GlobalConfig) {
        self.national = config.national_passport_format;
    }
}

impl FieldGenerator for PassportGenerator {
    fn id(&self) -> &'static str {
        match self.part {
            PassportPart::Series => "document.passport_series",
            PassportPart::Number => "document.passport_number",
            PassportPart::Code => "document.passport_code",
        }
    }

    fn supports(&self, field: &FieldContext<'_>) -> bool {
        let name = field.name_lower();
        field.scalar == ScalarType::Text
            && name.contains(self.part.keyword())
            && (field.owner_lower().contains("passport") || name.contains("passport"))
    }

    fn generate_valid(
        &self,
        field: &FieldContext<'_>,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        let raw = self.valid(provider);
        shared::conform_text(field, raw, provider).map(Value::Text)
    }

    fn generate_invalid(
        &self,
        field: &FieldContext<'_>,
        kind: InvalidityKind,
        provider: &mut dyn ValueProvider,
    ) -> Result<Value, GenerationError> {
        match kind {
            InvalidityKind::TooShort => Ok(Value::Text(self.too_short(provider))),
            InvalidityKind::TooLong => Ok(Value::Text(self.too_long(provider))),
            InvalidityKind::ContainsForbiddenCharacters => {
                let base = self.valid(provider);
                Ok(Value::Text(shared::with_forbidden_character(
                    field.meta, base, provider,
                )))
            }
            _ => shared::invalid_value(field, kind, provider),
        }
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableGenerator> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fixtura_core::{FieldKind, FieldMeta, FieldPath, FieldSchema};
    use regex::Regex;

    use super::*;
    use crate::provider::{FakeProvider, LocaleKey};

    fn run<T>(owner: &str, name: &str, body: impl FnOnce(&FieldContext<'_>) -> T) -> T {
        let schema = FieldSchema::new(name, FieldKind::scalar(ScalarType::Text), FieldMeta::default());
        let path = FieldPath::root().child(name);
        let ctx = FieldContext {
            owner,
            field: &schema,
            meta: schema.meta.as_ref().expect("meta"),
            scalar: ScalarType::Text,
            path: &path,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        };
        body(&ctx)
    }

    #[test]
    fn check_digit_matches_known_tax_ids() {
        assert!(is_valid_tax_id("7707083893"));
        assert!(is_valid_tax_id("500100732259"));
        assert!(!is_valid_tax_id("7707083890"));
        assert!(!is_valid_tax_id("12345"));
    }

    #[test]
    fn configuration_switches_tax_id_length() {
        let mut provider = FakeProvider::new("en", LocaleKey::En, 5);
        let mut generator = TaxIdGenerator::default();
        run("Customer", "inn", |ctx| {
            assert!(generator.supports(ctx));
            let individual = generator.generate_valid(ctx, &mut provider).expect("inn");
            let individual = individual.as_str().expect("text");
            assert_eq!(individual.len(), 12);
            assert!(is_valid_tax_id(individual));

            if let Some(configurable) = generator.as_configurable() {
                configurable.configure(&GlobalConfig::default().with_legal_entity_tax_id(true));
            }
            assert!(generator.legal_entity());
            let legal = generator.generate_valid(ctx, &mut provider).expect("inn");
            let legal = legal.as_str().expect("text");
            assert_eq!(legal.len(), 10);
            assert!(is_valid_tax_id(legal));
        });
    }

    #[test]
    fn document_numbers_respect_declared_metadata() {
        let schema = FieldSchema::new(
            "inn",
            FieldKind::scalar(ScalarType::Text),
            FieldMeta::default().with_length(4, 8).with_forbidden("7"),
        );
        let path = FieldPath::root().child("inn");
        let ctx = FieldContext {
            owner: "Company",
            field: &schema,
            meta: schema.meta.as_ref().expect("meta"),
            scalar: ScalarType::Text,
            path: &path,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        };
        let mut provider = FakeProvider::new("en", LocaleKey::En, 9);
        let generators: [Box<dyn FieldGenerator>; 2] =
            [Box::new(TaxIdGenerator::default()), Box::new(KppGenerator)];
        for generator in &generators {
            for _ in 0..20 {
                let value = generator.generate_valid(&ctx, &mut provider).expect("value");
                let text = value.as_str().expect("text");
                assert!((4..=8).contains(&text.chars().count()), "{text}");
                assert!(!text.contains('7'), "{text}");
            }
        }
    }

    #[test]
    fn passport_layout_follows_configuration() {
        let mut provider = FakeProvider::new("en", LocaleKey::En, 5);
        let mut series = PassportGenerator::new(PassportPart::Series);
        let mut code = PassportGenerator::new(PassportPart::Code);
        run("Passport", "series", |ctx| {
            assert!(series.supports(ctx));
            let value = series.generate_valid(ctx, &mut provider).expect("series");
            let international = Regex::new(r"^[A-Z]{2}-\d{3}$").expect("regex");
            assert!(international.is_match(value.as_str().expect("text")));

            series.configure(&GlobalConfig::default().with_national_passport_format(true));
            let value = series.generate_valid(ctx, &mut provider).expect("series");
            let national = Regex::new(r"^\d{4}$").expect("regex");
            assert!(national.is_match(value.as_str().expect("text")));
        });
        run("Passport", "code", |ctx| {
            code.configure(&GlobalConfig::default().with_national_passport_format(true));
            let value = code.generate_valid(ctx, &mut provider).expect("code");
            let national = Regex::new(r"^\d{3}-\d{3}$").expect("regex");
            assert!(national.is_match(value.as_str().expect("text")));
        });
    }

    #[test]
    fn passport_parts_need_passport_context() {
        let generator = PassportGenerator::new(PassportPart::Number);
        run("Order", "number", |ctx| assert!(!generator.supports(ctx)));
        run("Order", "passportNumber", |ctx| assert!(generator.supports(ctx)));
        run("Passport", "number", |ctx| assert!(generator.supports(ctx)));
    }
}
