use std::time::Instant;

use chrono::{Local, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use fixtura_core::{InvalidityKind, PathPattern, PathSegment, SchemaCatalog, TypeSchema};

use crate::config::GlobalConfig;
use crate::errors::GenerationError;
use crate::generators::GeneratorRegistry;
use crate::model::GenerationReport;
use crate::overrides::{FieldFilter, IntoPathPattern, OverrideRegistry};
use crate::provider::{DEFAULT_LOCALE, FakeProviderFactory, ProviderCache, ProviderFactory};
use crate::seed::{hash_instance_seed, hash_seed};
use crate::value::{Instance, Value};
use crate::walker::{DEFAULT_MAX_DEPTH, GenerationContext, SchemaWalker};

type RegistryFactory = Box<dyn Fn() -> GeneratorRegistry + Send + Sync>;

/// Builds fixture instances of one schema type.
///
/// Chaining methods record overrides; nothing is resolved against the schema
/// until one of the `build*` methods runs. Path patterns that fail to parse
/// are kept aside and reported by `build*` as
/// [`GenerationError::InvalidOverride`].
pub struct FixtureBuilder<'c> {
    catalog: &'c SchemaCatalog,
    type_name: String,
    overrides: OverrideRegistry,
    filter: FieldFilter,
    locale: Option<String>,
    config: GlobalConfig,
    seed: Option<u64>,
    strict: bool,
    max_depth: usize,
    today: Option<NaiveDate>,
    generators: RegistryFactory,
    providers: Box<dyn ProviderFactory>,
    path_errors: Vec<String>,
}

impl<'c> FixtureBuilder<'c> {
    pub fn new(catalog: &'c SchemaCatalog, type_name: impl Into<String>) -> Self {
        Self {
            catalog,
            type_name: type_name.into(),
            overrides: OverrideRegistry::new(),
            filter: FieldFilter::default(),
            locale: None,
            config: GlobalConfig::default(),
            seed: None,
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            today: None,
            generators: Box::new(GeneratorRegistry::new),
            providers: Box::new(FakeProviderFactory),
            path_errors: Vec::new(),
        }
    }

    fn pattern(&mut self, path: impl IntoPathPattern, operation: &str) -> Option<PathPattern> {
        match path.into_pattern() {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                self.path_errors.push(format!("{operation}: {err}"));
                None
            }
        }
    }

    pub fn invalidate(mut self, path: impl IntoPathPattern, kind: InvalidityKind) -> Self {
        if let Some(pattern) = self.pattern(path, "invalidate") {
            self.overrides.invalidate(pattern, kind);
        }
        self
    }

    /// Invalidates only the `index`-th element of the list at `path`.
    pub fn invalidate_list_item_at(
        mut self,
        path: impl IntoPathPattern,
        index: usize,
        kind: InvalidityKind,
    ) -> Self {
        if let Some(pattern) = self.pattern(path, "invalidate_list_item_at") {
            self.overrides
                .invalidate(pattern.appended(PathSegment::Index(index)), kind);
        }
        self
    }

    pub fn with_fixed_list_size(mut self, path: impl IntoPathPattern, size: usize) -> Self {
        if let Some(pattern) = self.pattern(path, "with_fixed_list_size") {
            self.overrides.fix_list_size(pattern, size);
        }
        self
    }

    /// Uses `value` verbatim at every matching path. Manual values win over
    /// invalidations and generators.
    pub fn set_value(mut self, path: impl IntoPathPattern, value: impl Into<Value>) -> Self {
        if let Some(pattern) = self.pattern(path, "set_value") {
            self.overrides.set_value(pattern, value.into());
        }
        self
    }

    /// Locale for the matching fields and everything nested under them.
    pub fn set_field_locale(mut self, path: impl IntoPathPattern, locale: impl Into<String>) -> Self {
        if let Some(pattern) = self.pattern(path, "set_field_locale") {
            self.overrides.set_locale(pattern, locale);
        }
        self
    }

    pub fn only_required(mut self) -> Self {
        self.filter.only_required = true;
        self
    }

    /// Restricts generation to fields carrying at least one registered tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.filter.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Root locale; replaces the type's default locales.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_config(mut self, config: GlobalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_national_passport_format(mut self, enabled: bool) -> Self {
        self.config = self.config.with_national_passport_format(enabled);
        self
    }

    pub fn with_legal_entity_tax_id(mut self, enabled: bool) -> Self {
        self.config = self.config.with_legal_entity_tax_id(enabled);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Date that year-offset bounds are computed from.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Replaces the generator registry. The factory runs once per `build*`
    /// call so configurable generators start from a clean state.
    pub fn with_generators<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> GeneratorRegistry + Send + Sync + 'static,
    {
        self.generators = Box::new(factory);
        self
    }

    pub fn with_provider_factory(mut self, factory: impl ProviderFactory + 'static) -> Self {
        self.providers = Box::new(factory);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }

    pub fn build(&self) -> Result<Instance, GenerationError> {
        let (mut instances, _) = self.build_list_with_report(1)?;
        instances
            .pop()
            .ok_or_else(|| GenerationError::UnknownType(self.type_name.clone()))
    }

    pub fn build_list(&self, count: usize) -> Result<Vec<Instance>, GenerationError> {
        self.build_list_with_report(count)
            .map(|(instances, _)| instances)
    }

    pub fn build_list_with_report(
        &self,
        count: usize,
    ) -> Result<(Vec<Instance>, GenerationReport), GenerationError> {
        if !self.path_errors.is_empty() {
            return Err(GenerationError::InvalidOverride(self.path_errors.join("; ")));
        }
        let schema = self
            .catalog
            .get(&self.type_name)
            .ok_or_else(|| GenerationError::UnknownType(self.type_name.clone()))?;

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let root_locale = self.root_locale(schema, seed);
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());

        let mut registry = (self.generators)();
        registry.configure(&self.config);
        let walker = SchemaWalker::new(self.catalog, &registry);
        let mut report = GenerationReport::new(run_id.clone(), &self.type_name, seed);

        info!(
            run_id = %run_id,
            type_name = %self.type_name,
            count,
            seed,
            locale = %root_locale,
            strict = self.strict,
            overrides = self.overrides.len(),
            "fixture build started"
        );

        let mut instances = Vec::with_capacity(count);
        for index in 0..count {
            let providers = ProviderCache::new(
                self.providers.as_ref(),
                hash_instance_seed(seed, index as u64),
                self.strict,
            );
            let mut ctx = GenerationContext::new(&self.overrides, &self.filter, providers, &mut report)
                .with_root_locale(root_locale.as_str())
                .with_strict(self.strict)
                .with_max_depth(self.max_depth)
                .with_today(today);
            let instance = walker.walk(&self.type_name, &mut ctx).inspect_err(|err| {
                warn!(run_id = %run_id, index, error = %err, "fixture build failed");
            })?;
            instances.push(instance);
        }

        report.instances = count as u64;
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            instances = report.instances,
            fallback_count = report.fallback_count,
            truncated = report.truncated_paths.len(),
            widened = report.widened_lists.len(),
            duration_ms = report.duration_ms,
            "fixture build finished"
        );
        Ok((instances, report))
    }

    fn root_locale(&self, schema: &TypeSchema, seed: u64) -> String {
        if let Some(locale) = &self.locale {
            return locale.clone();
        }
        if schema.default_locales.is_empty() {
            return DEFAULT_LOCALE.to_string();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(seed, "root-locale"));
        let pick = rng.random_range(0..schema.default_locales.len());
        schema.default_locales[pick].clone()
    }
}
