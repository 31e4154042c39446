pub mod faker;
pub mod locales;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{Duration, NaiveDate};
use rand::{Rng, RngCore};
use tracing::{debug, warn};

use crate::errors::GenerationError;
use crate::seed::hash_seed;

pub use self::faker::{FakeProvider, FakeProviderFactory};
pub use self::locales::{DEFAULT_LOCALE, LocaleKey};

const DIGITS: &[u8] = b"0123456789";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Realistic values for one locale, driven by a seeded RNG.
pub trait ValueProvider {
    /// Locale tag the provider serves.
    fn locale(&self) -> &str;
    fn rng(&mut self) -> &mut dyn RngCore;

    fn first_name(&mut self) -> String;
    fn last_name(&mut self) -> String;
    fn street_name(&mut self) -> String;
    fn street_address(&mut self) -> String;
    fn city(&mut self) -> String;
    fn region(&mut self) -> String;
    fn safe_email(&mut self) -> String;
    fn word(&mut self) -> String;

    /// Inclusive range; collapses to `min` when the range is empty.
    fn int_between(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng().random_range(min..=max)
    }

    /// Inclusive range rounded to two decimal places.
    fn decimal_between(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        let raw: f64 = self.rng().random_range(min..=max);
        ((raw * 100.0).round() / 100.0).clamp(min, max)
    }

    fn bool(&mut self) -> bool {
        self.rng().random_bool(0.5)
    }

    fn digits(&mut self, len: usize) -> String {
        sample_alphabet(self.rng(), DIGITS, len)
    }

    fn letters(&mut self, len: usize) -> String {
        sample_alphabet(self.rng(), UPPERCASE, len)
    }

    /// Lowercase letters and digits.
    fn characters(&mut self, len: usize) -> String {
        sample_alphabet(self.rng(), ALPHANUMERIC, len)
    }

    fn date_between(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        let span = (end - start).num_days();
        if span <= 0 {
            return start;
        }
        let offset = self.int_between(0, span);
        start + Duration::days(offset)
    }
}

fn sample_alphabet(rng: &mut dyn RngCore, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Creates providers for locale tags. Injected by the host application.
pub trait ProviderFactory: Send + Sync {
    /// Fails with [`GenerationError::UnsupportedLocale`] when no data exists
    /// for `locale`.
    fn create(&self, locale: &str, seed: u64) -> Result<Box<dyn ValueProvider>, GenerationError>;
}

/// Locale tag to provider memo for one top-level instance.
pub struct ProviderCache<'f> {
    factory: &'f dyn ProviderFactory,
    seed: u64,
    strict: bool,
    providers: HashMap<String, Box<dyn ValueProvider>>,
}

impl<'f> ProviderCache<'f> {
    pub fn new(factory: &'f dyn ProviderFactory, seed: u64, strict: bool) -> Self {
        Self {
            factory,
            seed,
            strict,
            providers: HashMap::new(),
        }
    }

    /// Returns the provider for `locale`, creating it on first use. Unknown
    /// locales fall back to [`DEFAULT_LOCALE`] unless the cache is strict.
    pub fn get(&mut self, locale: &str) -> Result<&mut dyn ValueProvider, GenerationError> {
        let provider = match self.providers.entry(locale.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let seed = hash_seed(self.seed, locale);
                let created = match self.factory.create(locale, seed) {
                    Ok(provider) => provider,
                    Err(GenerationError::UnsupportedLocale(tag)) if !self.strict => {
                        warn!(
                            locale = %tag,
                            fallback = DEFAULT_LOCALE,
                            "no provider data for locale; falling back"
                        );
                        self.factory.create(DEFAULT_LOCALE, seed)?
                    }
                    Err(err) => return Err(err),
                };
                debug!(locale, provider_locale = created.locale(), "value provider created");
                entry.insert(created)
            }
        };
        Ok(provider.as_mut())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_memoizes_per_locale_tag() {
        let factory = FakeProviderFactory;
        let mut cache = ProviderCache::new(&factory, 11, false);
        cache.get("en").expect("en provider");
        cache.get("fr-FR").expect("fr provider");
        cache.get("en").expect("cached en provider");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unknown_locale_falls_back_unless_strict() {
        let factory = FakeProviderFactory;
        let mut lenient = ProviderCache::new(&factory, 11, false);
        let provider = lenient.get("ru").expect("fallback provider");
        assert_eq!(provider.locale(), DEFAULT_LOCALE);

        let mut strict = ProviderCache::new(&factory, 11, true);
        let result = strict.get("ru");
        assert!(matches!(result, Err(GenerationError::UnsupportedLocale(_))));
    }

    #[test]
    fn ranges_stay_inclusive() {
        let factory = FakeProviderFactory;
        let mut cache = ProviderCache::new(&factory, 3, false);
        let provider = cache.get("en").expect("provider");
        for _ in 0..200 {
            let value = provider.int_between(-2, 2);
            assert!((-2..=2).contains(&value));
            let decimal = provider.decimal_between(1.0, 2.0);
            assert!((1.0..=2.0).contains(&decimal));
        }
        assert_eq!(provider.int_between(5, 5), 5);
        assert_eq!(provider.digits(6).len(), 6);
        assert!(provider.digits(6).chars().all(|ch| ch.is_ascii_digit()));
    }
}
