//! Schema-driven fixture generation for fixtura.
//!
//! A [`FixtureBuilder`] collects path-pattern overrides (manual values,
//! invalidity kinds, fixed list sizes, locales), then walks a type from the
//! [`fixtura_core::SchemaCatalog`] and fills every field through the
//! first matching [`generators::FieldGenerator`]. Runs are deterministic for
//! a given seed.

pub mod builder;
pub mod checks;
pub mod config;
pub mod errors;
pub mod generators;
pub mod model;
pub mod overrides;
pub mod provider;
pub mod request;
mod seed;
pub mod value;
pub mod walker;

pub use builder::FixtureBuilder;
pub use checks::{Rule, Violation, check_instance, check_instance_on};
pub use config::GlobalConfig;
pub use errors::GenerationError;
pub use generators::{ConfigurableGenerator, FieldContext, FieldGenerator, GeneratorRegistry};
pub use model::GenerationReport;
pub use overrides::{FieldFilter, IntoPathPattern, OverrideRegistry};
pub use provider::{FakeProviderFactory, ProviderCache, ProviderFactory, ValueProvider};
pub use request::FixtureRequest;
pub use value::{Instance, Value};
pub use walker::{GenerationContext, SchemaWalker};
