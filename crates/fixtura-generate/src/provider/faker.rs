use fake::Fake;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::GenerationError;
use crate::provider::locales::LocaleKey;
use crate::provider::{ProviderFactory, ValueProvider};

macro_rules! localized {
    ($key:expr, $rng:expr, $module:ident :: $faker:ident) => {
        match $key {
            LocaleKey::En => fake::faker::$module::en::$faker().fake_with_rng($rng),
            LocaleKey::FrFr => fake::faker::$module::fr_fr::$faker().fake_with_rng($rng),
            LocaleKey::DeDe => fake::faker::$module::de_de::$faker().fake_with_rng($rng),
            LocaleKey::PtBr => fake::faker::$module::pt_br::$faker().fake_with_rng($rng),
            LocaleKey::JaJp => fake::faker::$module::ja_jp::$faker().fake_with_rng($rng),
            LocaleKey::ZhCn => fake::faker::$module::zh_cn::$faker().fake_with_rng($rng),
            LocaleKey::ZhTw => fake::faker::$module::zh_tw::$faker().fake_with_rng($rng),
        }
    };
}

/// [`ValueProvider`] backed by the `fake` crate's locale data.
pub struct FakeProvider {
    tag: String,
    key: LocaleKey,
    rng: ChaCha8Rng,
}

impl FakeProvider {
    pub fn new(tag: impl Into<String>, key: LocaleKey, seed: u64) -> Self {
        Self {
            tag: tag.into(),
            key,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn key(&self) -> LocaleKey {
        self.key
    }
}

impl ValueProvider for FakeProvider {
    fn locale(&self) -> &str {
        &self.tag
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn first_name(&mut self) -> String {
        localized!(self.key, &mut self.rng, name::FirstName)
    }

    fn last_name(&mut self) -> String {
        localized!(self.key, &mut self.rng, name::LastName)
    }

    fn street_name(&mut self) -> String {
        localized!(self.key, &mut self.rng, address::StreetName)
    }

    fn street_address(&mut self) -> String {
        let number: String = localized!(self.key, &mut self.rng, address::BuildingNumber);
        let street = self.street_name();
        format!("{number} {street}")
    }

    fn city(&mut self) -> String {
        localized!(self.key, &mut self.rng, address::CityName)
    }

    fn region(&mut self) -> String {
        localized!(self.key, &mut self.rng, address::StateName)
    }

    fn safe_email(&mut self) -> String {
        localized!(self.key, &mut self.rng, internet::SafeEmail)
    }

    fn word(&mut self) -> String {
        localized!(self.key, &mut self.rng, lorem::Word)
    }
}

/// Default factory: resolves tags to `fake` locale data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeProviderFactory;

impl ProviderFactory for FakeProviderFactory {
    fn create(&self, locale: &str, seed: u64) -> Result<Box<dyn ValueProvider>, GenerationError> {
        let key = LocaleKey::resolve(locale)
            .ok_or_else(|| GenerationError::UnsupportedLocale(locale.to_string()))?;
        Ok(Box::new(FakeProvider::new(locale, key, seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_values() {
        let mut left = FakeProvider::new("fr-FR", LocaleKey::FrFr, 42);
        let mut right = FakeProvider::new("fr-FR", LocaleKey::FrFr, 42);
        assert_eq!(left.first_name(), right.first_name());
        assert_eq!(left.street_address(), right.street_address());
        assert_eq!(left.characters(8), right.characters(8));
    }

    #[test]
    fn every_locale_produces_text() {
        for key in LocaleKey::ALL {
            let mut provider = FakeProvider::new(key.as_str(), key, 7);
            assert!(!provider.first_name().is_empty(), "first name for {key}");
            assert!(!provider.city().is_empty(), "city for {key}");
            assert!(provider.safe_email().contains('@'), "email for {key}");
        }
    }

    #[test]
    fn factory_rejects_unknown_locale() {
        let result = FakeProviderFactory.create("ru", 1);
        assert!(matches!(result, Err(GenerationError::UnsupportedLocale(tag)) if tag == "ru"));
    }
}
