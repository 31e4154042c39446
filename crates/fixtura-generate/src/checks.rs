use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::Serialize;

use fixtura_core::{
    ElementKind, FieldKind, FieldMeta, FieldPath, FieldSchema, ScalarType, SchemaCatalog,
    ValueFormat,
};

use crate::generators::shared;
use crate::value::{Instance, Value};

/// Which declared bound a value breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Length,
    Range,
    ForbiddenCharacter,
    EmailFormat,
    Pattern,
    DateWindow,
    ItemCount,
    Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub path: String,
    pub rule: Rule,
    pub detail: String,
}

fn email_check() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Checks `instance` with year offsets measured from the local date.
pub fn check_instance(catalog: &SchemaCatalog, instance: &Instance) -> Vec<Violation> {
    check_instance_on(catalog, instance, Local::now().date_naive())
}

/// Checks `instance` with year offsets measured from `today`.
pub fn check_instance_on(
    catalog: &SchemaCatalog,
    instance: &Instance,
    today: NaiveDate,
) -> Vec<Violation> {
    let mut checker = Checker {
        catalog,
        today,
        violations: Vec::new(),
    };
    checker.instance(instance, &FieldPath::root());
    checker.violations
}

struct Checker<'a> {
    catalog: &'a SchemaCatalog,
    today: NaiveDate,
    violations: Vec<Violation>,
}

impl Checker<'_> {
    fn push(&mut self, path: &FieldPath, rule: Rule, detail: String) {
        self.violations.push(Violation {
            path: path.to_string(),
            rule,
            detail,
        });
    }

    fn instance(&mut self, instance: &Instance, path: &FieldPath) {
        let Some(schema) = self.catalog.get(instance.type_name()) else {
            self.push(
                path,
                Rule::Shape,
                format!("unknown type '{}'", instance.type_name()),
            );
            return;
        };
        for field in &schema.fields {
            let child = path.child(&field.name);
            match instance.get(&field.name) {
                None => self.push(&child, Rule::Shape, "declared field missing".to_string()),
                Some(Value::Absent) => {}
                Some(value) => self.field(field, value, &child),
            }
        }
    }

    fn field(&mut self, field: &FieldSchema, value: &Value, path: &FieldPath) {
        let Some(meta) = field.meta.as_ref() else {
            return;
        };
        match (&field.kind, value) {
            (FieldKind::Scalar { scalar }, _) => self.scalar(meta, *scalar, value, path),
            (FieldKind::Object { .. }, Value::Object(nested)) => self.instance(nested, path),
            (FieldKind::List { element }, Value::List(items)) => {
                let bounds = field.list_bounds();
                let count = items.len();
                if count < bounds.min_items as usize || count > bounds.max_items as usize {
                    self.push(
                        path,
                        Rule::ItemCount,
                        format!(
                            "{count} items outside {}..={}",
                            bounds.min_items, bounds.max_items
                        ),
                    );
                }
                for (index, item) in items.iter().enumerate() {
                    let item_path = path.index(index);
                    match (element, item) {
                        (_, Value::Absent) => {}
                        (ElementKind::Scalar { scalar }, _) => {
                            self.scalar(meta, *scalar, item, &item_path)
                        }
                        (ElementKind::Object { .. }, Value::Object(nested)) => {
                            self.instance(nested, &item_path)
                        }
                        (ElementKind::Object { type_name }, _) => self.push(
                            &item_path,
                            Rule::Shape,
                            format!("expected an instance of '{type_name}'"),
                        ),
                    }
                }
            }
            (kind, _) => self.push(path, Rule::Shape, format!("expected {}", kind.describe())),
        }
    }

    fn scalar(&mut self, meta: &FieldMeta, scalar: ScalarType, value: &Value, path: &FieldPath) {
        match (scalar, value) {
            (ScalarType::Text, Value::Text(text)) => self.text(meta, text, path),
            (ScalarType::Integer, Value::Int(number)) => {
                let (min, max) = shared::numeric_bounds(meta);
                if *number < min || *number > max {
                    self.push(path, Rule::Range, format!("{number} outside {min}..={max}"));
                }
            }
            (ScalarType::Decimal, Value::Decimal(number)) => {
                let (min, max) = shared::numeric_bounds(meta);
                if *number < min as f64 || *number > max as f64 {
                    self.push(path, Rule::Range, format!("{number} outside {min}..={max}"));
                }
            }
            (ScalarType::Date, Value::Date(date)) => {
                let (lower, upper) = shared::date_bounds(meta, self.today);
                if *date < lower || *date > upper {
                    self.push(
                        path,
                        Rule::DateWindow,
                        format!("{date} outside {lower}..={upper}"),
                    );
                }
            }
            (ScalarType::Bool, Value::Bool(_)) => {}
            (scalar, other) => self.push(
                path,
                Rule::Shape,
                format!("expected {}, found {other:?}", scalar.as_str()),
            ),
        }
    }

    fn text(&mut self, meta: &FieldMeta, text: &str, path: &FieldPath) {
        let (min, max) = shared::length_bounds(meta);
        let len = text.chars().count();
        if len < min || len > max {
            self.push(path, Rule::Length, format!("length {len} outside {min}..={max}"));
        }
        if let Some(ch) = text.chars().find(|ch| meta.is_forbidden(*ch)) {
            self.push(
                path,
                Rule::ForbiddenCharacter,
                format!("contains forbidden character '{ch}'"),
            );
        }
        if meta.format == Some(ValueFormat::Email)
            && email_check().is_some_and(|check| !check.is_match(text))
        {
            self.push(path, Rule::EmailFormat, format!("'{text}' is not an email"));
        }
        if let Some(pattern) = &meta.pattern {
            match shared::pattern_matcher(pattern) {
                Ok(matcher) if matcher.is_match(text) => {}
                Ok(_) => self.push(path, Rule::Pattern, format!("'{text}' does not match {pattern}")),
                Err(err) => self.push(path, Rule::Pattern, format!("pattern does not compile: {err}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fixtura_core::{FieldMeta, TypeSchema};

    use super::*;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with_type(
                TypeSchema::new("Customer")
                    .field(FieldSchema::new(
                        "email",
                        FieldKind::scalar(ScalarType::Text),
                        FieldMeta::default().with_format(ValueFormat::Email),
                    ))
                    .field(FieldSchema::new(
                        "age",
                        FieldKind::scalar(ScalarType::Integer),
                        FieldMeta::default().with_length(18, 99),
                    ))
                    .field(
                        FieldSchema::new(
                            "addresses",
                            FieldKind::list_of(ElementKind::object("Address")),
                            FieldMeta::default(),
                        )
                        .with_list_bounds(1, 2),
                    ),
            )
            .with_type(TypeSchema::new("Address").field(FieldSchema::new(
                "street",
                FieldKind::scalar(ScalarType::Text),
                FieldMeta::default().with_length(3, 20).with_forbidden("#"),
            )))
    }

    fn address(street: &str) -> Value {
        let mut address = Instance::new("Address");
        address.insert("street", Value::from(street));
        Value::Object(address)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
    }

    #[test]
    fn conforming_instance_has_no_violations() {
        let mut customer = Instance::new("Customer");
        customer.insert("email", Value::from("ann@example.com"));
        customer.insert("age", Value::Int(30));
        customer.insert("addresses", Value::List(vec![address("Main Street")]));
        assert!(check_instance_on(&catalog(), &customer, today()).is_empty());
    }

    #[test]
    fn reports_each_broken_bound() {
        let mut customer = Instance::new("Customer");
        customer.insert("email", Value::from("invalid-email@"));
        customer.insert("age", Value::Int(7));
        customer.insert(
            "addresses",
            Value::List(vec![address("Main#"), address("ok street"), address("x")]),
        );
        let violations = check_instance_on(&catalog(), &customer, today());
        let rules: Vec<(String, Rule)> = violations
            .iter()
            .map(|violation| (violation.path.clone(), violation.rule))
            .collect();
        assert_eq!(
            rules,
            vec![
                ("email".to_string(), Rule::EmailFormat),
                ("age".to_string(), Rule::Range),
                ("addresses".to_string(), Rule::ItemCount),
                ("addresses/[0]/street".to_string(), Rule::ForbiddenCharacter),
                ("addresses/[2]/street".to_string(), Rule::Length),
            ]
        );
    }

    #[test]
    fn absent_fields_are_not_checked() {
        let mut customer = Instance::new("Customer");
        customer.insert("email", Value::Absent);
        customer.insert("age", Value::Absent);
        customer.insert("addresses", Value::Absent);
        assert!(check_instance_on(&catalog(), &customer, today()).is_empty());
    }
}
