use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use fixtura_core::{
    ElementKind, FieldKind, FieldMeta, FieldPath, FieldSchema, InvalidityKind, ScalarType,
    SchemaCatalog, TypeSchema,
};

use crate::errors::GenerationError;
use crate::generators::{FieldContext, GeneratorRegistry};
use crate::model::GenerationReport;
use crate::overrides::{FieldFilter, NodeShape, OverrideRegistry};
use crate::provider::{DEFAULT_LOCALE, ProviderCache};
use crate::value::{Instance, Value};

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// How many times a type may already sit on the ancestor chain when a list
/// of that type is expanded. Deeper lists of it are left absent.
pub const MAX_LIST_RECURSION: usize = 1;

/// Request-scoped state for one top-level instance.
pub struct GenerationContext<'a> {
    pub overrides: &'a OverrideRegistry,
    pub filter: &'a FieldFilter,
    pub providers: ProviderCache<'a>,
    /// Locale used where no locale override applies.
    pub root_locale: String,
    pub strict: bool,
    pub max_depth: usize,
    pub today: NaiveDate,
    pub report: &'a mut GenerationReport,
    visited: HashSet<FieldPath>,
    ancestors: Vec<String>,
}

impl<'a> GenerationContext<'a> {
    /// Context with the default locale, lenient mode, the default nesting
    /// limit and today's date.
    pub fn new(
        overrides: &'a OverrideRegistry,
        filter: &'a FieldFilter,
        providers: ProviderCache<'a>,
        report: &'a mut GenerationReport,
    ) -> Self {
        Self {
            overrides,
            filter,
            providers,
            root_locale: DEFAULT_LOCALE.to_string(),
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            today: Local::now().date_naive(),
            report,
            visited: HashSet::new(),
            ancestors: Vec::new(),
        }
    }

    pub fn with_root_locale(mut self, locale: impl Into<String>) -> Self {
        self.root_locale = locale.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Paths expanded so far.
    pub fn visited(&self) -> &HashSet<FieldPath> {
        &self.visited
    }

    fn times_on_chain(&self, type_name: &str) -> usize {
        self.ancestors
            .iter()
            .filter(|ancestor| ancestor.as_str() == type_name)
            .count()
    }
}

/// Walks schema types, consulting overrides and dispatching scalars to the
/// generator registry.
///
/// Per field, in declaration order: skip (no metadata or filtered out),
/// manual value, locale resolution, invalidity resolution, then scalar
/// dispatch, list expansion or nested recursion. Override patterns reaching
/// below a node are checked against its shape when the node is visited.
pub struct SchemaWalker<'r> {
    catalog: &'r SchemaCatalog,
    registry: &'r GeneratorRegistry,
}

impl<'r> SchemaWalker<'r> {
    pub fn new(catalog: &'r SchemaCatalog, registry: &'r GeneratorRegistry) -> Self {
        Self { catalog, registry }
    }

    fn schema(&self, type_name: &str) -> Result<&'r TypeSchema, GenerationError> {
        self.catalog
            .get(type_name)
            .ok_or_else(|| GenerationError::UnknownType(type_name.to_string()))
    }

    /// Populates a top-level instance of `type_name`.
    pub fn walk(
        &self,
        type_name: &str,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Instance, GenerationError> {
        let schema = self.schema(type_name)?;
        let root = FieldPath::root();
        ctx.overrides.check_fit(
            &root,
            &schema.name,
            NodeShape::Object(&schema.name),
            self.catalog,
        )?;
        let locale = ctx.root_locale.clone();
        ctx.ancestors.push(schema.name.clone());
        let instance = self.walk_fields(schema, &root, &locale, ctx)?;
        ctx.ancestors.pop();
        Ok(instance)
    }

    /// Recurses into a nested type at `path`. A path already expanded in this
    /// context, or one deeper than the nesting limit, yields
    /// [`Value::Absent`].
    pub fn expand_nested(
        &self,
        type_name: &str,
        path: &FieldPath,
        locale: &str,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Value, GenerationError> {
        if path.depth() > ctx.max_depth {
            warn!(
                path = %path,
                max_depth = ctx.max_depth,
                "nesting limit reached; subtree left absent"
            );
            ctx.report.record_truncation(path.to_string());
            return Ok(Value::Absent);
        }
        if !ctx.visited.insert(path.clone()) {
            debug!(path = %path, "path already expanded; subtree left absent");
            return Ok(Value::Absent);
        }
        let schema = self.schema(type_name)?;
        ctx.ancestors.push(schema.name.clone());
        let instance = self.walk_fields(schema, path, locale, ctx)?;
        ctx.ancestors.pop();
        Ok(Value::Object(instance))
    }

    fn walk_fields(
        &self,
        schema: &'r TypeSchema,
        parent: &FieldPath,
        locale: &str,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Instance, GenerationError> {
        let mut instance = Instance::new(&schema.name);
        for field in &schema.fields {
            let Some(meta) = field.meta.as_ref() else {
                instance.insert(&field.name, Value::Absent);
                continue;
            };
            if !ctx.filter.admits(meta) {
                debug!(owner = %schema.name, field = %field.name, "field filtered out");
                instance.insert(&field.name, Value::Absent);
                continue;
            }
            let path = parent.child(&field.name);
            let value = self.walk_field(schema, field, meta, &path, locale, ctx)?;
            instance.insert(&field.name, value);
        }
        Ok(instance)
    }

    fn walk_field(
        &self,
        owner: &TypeSchema,
        field: &FieldSchema,
        meta: &FieldMeta,
        path: &FieldPath,
        inherited_locale: &str,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Value, GenerationError> {
        ctx.overrides.check_fit(
            path,
            &field.name,
            NodeShape::of_field(&field.kind),
            self.catalog,
        )?;

        if let Some(value) = ctx.overrides.manual_value(path) {
            debug!(path = %path, "manual value applied");
            ctx.report.record_manual_value();
            return Ok(value.clone());
        }

        let locale = ctx
            .overrides
            .locale(path)
            .unwrap_or(inherited_locale)
            .to_string();
        let invalid = ctx.overrides.invalidity(path);

        let target = FieldTarget {
            owner: &owner.name,
            field,
            meta,
        };
        match &field.kind {
            FieldKind::Scalar { scalar } => {
                self.generate_scalar(target, *scalar, path, &locale, invalid, ctx)
            }
            FieldKind::Object { type_name } => {
                reject_composite_invalidity(path, invalid, &field.kind)?;
                self.expand_nested(type_name, path, &locale, ctx)
            }
            FieldKind::List { element } => {
                reject_composite_invalidity(path, invalid, &field.kind)?;
                self.expand_list(target, element, path, &locale, ctx)
            }
        }
    }

    fn expand_list(
        &self,
        target: FieldTarget<'_>,
        element: &ElementKind,
        path: &FieldPath,
        locale: &str,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Value, GenerationError> {
        if let ElementKind::Object { type_name } = element {
            if ctx.times_on_chain(type_name) > MAX_LIST_RECURSION {
                warn!(
                    path = %path,
                    element = %type_name,
                    "recursive list of an enclosing type; list left absent"
                );
                ctx.report.record_truncation(path.to_string());
                return Ok(Value::Absent);
            }
        }
        if !ctx.visited.insert(path.clone()) {
            debug!(path = %path, "path already expanded; list left absent");
            return Ok(Value::Absent);
        }

        let field = target.field;
        let count = match ctx.overrides.list_size(path) {
            Some(size) => {
                debug!(path = %path, size, "fixed list size applied");
                size
            }
            None => {
                let bounds = field.list_bounds();
                let provider = ctx.providers.get(locale)?;
                let drawn =
                    provider.int_between(i64::from(bounds.min_items), i64::from(bounds.max_items));
                let drawn = usize::try_from(drawn).unwrap_or_default();
                // Elements addressed by index in an override always exist.
                match ctx.overrides.highest_index_below(path) {
                    Some(index) if index >= drawn => {
                        debug!(
                            path = %path,
                            drawn,
                            size = index + 1,
                            max_items = bounds.max_items,
                            "list widened to reach an addressed index"
                        );
                        ctx.report.record_widened_list(path.to_string());
                        index + 1
                    }
                    _ => drawn,
                }
            }
        };

        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let element_path = path.index(index);
            ctx.overrides.check_fit(
                &element_path,
                &field.name,
                NodeShape::of_element(element),
                self.catalog,
            )?;
            if let Some(value) = ctx.overrides.manual_value(&element_path) {
                debug!(path = %element_path, "manual value applied");
                ctx.report.record_manual_value();
                items.push(value.clone());
                continue;
            }
            let element_locale = ctx
                .overrides
                .locale(&element_path)
                .unwrap_or(locale)
                .to_string();
            let invalid = ctx.overrides.invalidity(&element_path);
            let item = match element {
                ElementKind::Object { type_name } => {
                    reject_composite_invalidity(&element_path, invalid, &field.kind)?;
                    self.expand_nested(type_name, &element_path, &element_locale, ctx)?
                }
                ElementKind::Scalar { scalar } => self.generate_scalar(
                    target,
                    *scalar,
                    &element_path,
                    &element_locale,
                    invalid,
                    ctx,
                )?,
            };
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn generate_scalar(
        &self,
        target: FieldTarget<'_>,
        scalar: ScalarType,
        path: &FieldPath,
        locale: &str,
        invalid: Option<InvalidityKind>,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Value, GenerationError> {
        if let Some(kind) = invalid {
            let declared = &target.meta.invalid_kinds;
            if !declared.is_empty() && !declared.contains(&kind) {
                if ctx.strict {
                    return Err(GenerationError::UndeclaredInvalidity {
                        path: path.to_string(),
                        kind,
                    });
                }
                warn!(
                    path = %path,
                    kind = kind.as_str(),
                    "invalidity kind not declared by field; generating anyway"
                );
            }
        }

        let field_ctx = FieldContext {
            owner: target.owner,
            field: target.field,
            meta: target.meta,
            scalar,
            path,
            today: ctx.today,
        };
        let provider = ctx.providers.get(locale)?;
        let (generator_id, value) = self.registry.dispatch(&field_ctx, invalid, provider)?;
        ctx.report.record_generator_usage(generator_id);
        if invalid.is_some() {
            ctx.report.record_invalidation();
        }
        Ok(value)
    }
}

/// The declared field a value is generated for.
#[derive(Clone, Copy)]
struct FieldTarget<'a> {
    owner: &'a str,
    field: &'a FieldSchema,
    meta: &'a FieldMeta,
}

fn reject_composite_invalidity(
    path: &FieldPath,
    invalid: Option<InvalidityKind>,
    kind: &FieldKind,
) -> Result<(), GenerationError> {
    match invalid {
        Some(kind_requested) => Err(GenerationError::UnsupportedInvalidity {
            path: path.to_string(),
            kind: kind_requested,
            scalar: kind.describe(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use fixtura_core::FieldMeta;

    use super::*;
    use crate::provider::FakeProviderFactory;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_type(
                TypeSchema::new("Address")
                    .field(FieldSchema::new(
                        "street",
                        FieldKind::scalar(ScalarType::Text),
                        FieldMeta::default(),
                    ))
                    .field(FieldSchema::new(
                        "city",
                        FieldKind::scalar(ScalarType::Text),
                        FieldMeta::default(),
                    )),
            )
            .with_type(
                TypeSchema::new("Node").field(FieldSchema::new(
                    "child",
                    FieldKind::object("Node"),
                    FieldMeta::default(),
                )),
            )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
    }

    #[test]
    fn revisiting_a_path_yields_absent() {
        let catalog = catalog();
        let registry = GeneratorRegistry::new();
        let walker = SchemaWalker::new(&catalog, &registry);
        let overrides = OverrideRegistry::new();
        let filter = FieldFilter::default();
        let factory = FakeProviderFactory;
        let mut report = GenerationReport::default();
        let mut ctx = GenerationContext::new(
            &overrides,
            &filter,
            ProviderCache::new(&factory, 1, false),
            &mut report,
        )
        .with_today(today());
        let path = FieldPath::root().child("home");

        let first = walker
            .expand_nested("Address", &path, "en", &mut ctx)
            .expect("first expansion");
        assert!(first.as_object().is_some());
        let second = walker
            .expand_nested("Address", &path, "en", &mut ctx)
            .expect("second expansion");
        assert!(second.is_absent());
        assert!(ctx.visited().contains(&path));
    }

    #[test]
    fn self_reference_stops_at_depth_limit() {
        let catalog = catalog();
        let registry = GeneratorRegistry::new();
        let walker = SchemaWalker::new(&catalog, &registry);
        let overrides = OverrideRegistry::new();
        let filter = FieldFilter::default();
        let factory = FakeProviderFactory;
        let mut report = GenerationReport::default();
        let mut ctx = GenerationContext::new(
            &overrides,
            &filter,
            ProviderCache::new(&factory, 1, false),
            &mut report,
        )
        .with_max_depth(3)
        .with_today(today());

        let root = walker.walk("Node", &mut ctx).expect("walk");
        drop(ctx);
        let mut depth = 0;
        let mut current = root.get("child");
        while let Some(Value::Object(node)) = current {
            depth += 1;
            current = node.get("child");
        }
        assert_eq!(depth, 3);
        assert_eq!(current, Some(&Value::Absent));
        assert_eq!(report.truncated_paths, vec!["child/child/child/child".to_string()]);
    }

    #[test]
    fn list_count_stays_within_declared_bounds() {
        let catalog = SchemaCatalog::new().with_type(
            TypeSchema::new("Bag").field(
                FieldSchema::new(
                    "tags",
                    FieldKind::list_of(ElementKind::scalar(ScalarType::Text)),
                    FieldMeta::default(),
                )
                .with_list_bounds(2, 4),
            ),
        );
        let registry = GeneratorRegistry::new();
        let walker = SchemaWalker::new(&catalog, &registry);
        let overrides = OverrideRegistry::new();
        let filter = FieldFilter::default();
        let factory = FakeProviderFactory;
        for seed in 0..20 {
            let mut report = GenerationReport::default();
            let mut ctx = GenerationContext::new(
                &overrides,
                &filter,
                ProviderCache::new(&factory, seed, false),
                &mut report,
            );
            let bag = walker.walk("Bag", &mut ctx).expect("walk");
            let tags = bag.get("tags").and_then(Value::as_list).expect("tags");
            assert!((2..=4).contains(&tags.len()), "{} tags", tags.len());
        }
    }
}
