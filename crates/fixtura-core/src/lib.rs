//! Core contracts for fixtura.
//!
//! This crate defines the schema descriptor consumed by the generation
//! engine, the invalidity kinds, and the path / path-pattern types used to
//! address fields inside generated object graphs.

pub mod constraints;
pub mod error;
pub mod invalid;
pub mod path;
pub mod schema;
pub mod types;
pub mod validation;

pub use constraints::{FieldMeta, ListBounds, ValueFormat};
pub use error::{Error, Result};
pub use invalid::InvalidityKind;
pub use path::{FieldPath, PathPattern, PathSegment};
pub use schema::{FieldSchema, SchemaCatalog, TypeSchema};
pub use types::{ElementKind, FieldKind, ScalarType};
pub use validation::validate_catalog;

/// Current contract version for schema catalog files.
pub const SCHEMA_VERSION: &str = "0.1";
