use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{Error, Result};
use crate::schema::{FieldSchema, SchemaCatalog};

/// Validate internal consistency of a schema catalog.
///
/// This checks:
/// - duplicate type and field names
/// - nested type references resolve to a declared type
/// - length, year-offset and list-size bounds are ordered
/// - declared patterns compile
pub fn validate_catalog(catalog: &SchemaCatalog) -> Result<()> {
    let mut names = BTreeSet::new();
    for schema in &catalog.types {
        if schema.name.is_empty() {
            return Err(Error::InvalidSchema("type name must not be empty".to_string()));
        }
        if !names.insert(schema.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate type name: {}",
                schema.name
            )));
        }
    }

    for schema in &catalog.types {
        let mut fields = BTreeSet::new();
        for field in &schema.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate field name: {}.{}",
                    schema.name, field.name
                )));
            }
            validate_field(&schema.name, field, &names)?;
        }
    }

    Ok(())
}

fn validate_field(owner: &str, field: &FieldSchema, types: &BTreeSet<&str>) -> Result<()> {
    if field.name.is_empty() || field.name.contains(['/', '[', ']', '*']) {
        return Err(Error::InvalidSchema(format!(
            "invalid field name '{}' in {}",
            field.name, owner
        )));
    }

    if let Some(nested) = field.kind.nested_type()
        && !types.contains(nested)
    {
        return Err(Error::InvalidSchema(format!(
            "unknown nested type '{}' referenced by {}.{}",
            nested, owner, field.name
        )));
    }

    if let Some(bounds) = field.list {
        if !field.kind.is_list() {
            return Err(Error::InvalidSchema(format!(
                "list bounds declared on non-list field {}.{}",
                owner, field.name
            )));
        }
        if bounds.min_items > bounds.max_items {
            return Err(Error::InvalidSchema(format!(
                "min_items must be <= max_items for {}.{}",
                owner, field.name
            )));
        }
    }

    let Some(meta) = &field.meta else {
        return Ok(());
    };

    if meta.min_length > meta.max_length {
        return Err(Error::InvalidSchema(format!(
            "min_length must be <= max_length for {}.{}",
            owner, field.name
        )));
    }
    if meta.min_year_offset > meta.max_year_offset {
        return Err(Error::InvalidSchema(format!(
            "min_year_offset must be <= max_year_offset for {}.{}",
            owner, field.name
        )));
    }
    if let Some(pattern) = &meta.pattern {
        Regex::new(pattern).map_err(|err| {
            Error::InvalidSchema(format!(
                "invalid pattern for {}.{}: {err}",
                owner, field.name
            ))
        })?;
    }

    Ok(())
}
