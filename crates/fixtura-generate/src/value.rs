use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::{Map, Number, Value as JsonValue};

use fixtura_core::{FieldPath, PathSegment};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Generated value for a field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Field skipped by a filter, lacking metadata, or cut by a recursion guard.
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
    List(Vec<Value>),
    Object(Instance),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Absent => JsonValue::Null,
            Value::Bool(value) => JsonValue::Bool(*value),
            Value::Int(value) => JsonValue::Number((*value).into()),
            Value::Decimal(value) => Number::from_f64(*value)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Text(value) => JsonValue::String(value.clone()),
            Value::Date(value) => JsonValue::String(value.format(DATE_FORMAT).to_string()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(instance) => instance.to_json(),
        }
    }

    /// Converts a JSON literal into a manual value. Strings stay text and
    /// objects become untyped instances.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Absent,
            JsonValue::Bool(value) => Value::Bool(*value),
            JsonValue::Number(number) => match number.as_i64() {
                Some(int) => Value::Int(int),
                None => Value::Decimal(number.as_f64().unwrap_or_default()),
            },
            JsonValue::String(value) => Value::Text(value.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            JsonValue::Object(map) => {
                let mut instance = Instance::new("");
                for (name, item) in map {
                    instance.insert(name.clone(), Value::from_json(item));
                }
                Value::Object(instance)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Object(value)
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        Value::from_json(value)
    }
}

/// A populated object of a schema type. Fields keep declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instance {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Instance {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets `name`, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves a concrete path below this instance.
    pub fn at(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.segments().iter();
        let first = match segments.next()? {
            PathSegment::Field(name) => self.get(name)?,
            _ => return None,
        };
        segments.try_fold(first, |current, segment| match (segment, current) {
            (PathSegment::Field(name), Value::Object(instance)) => instance.get(name),
            (PathSegment::Index(index), Value::List(items)) => items.get(*index),
            _ => None,
        })
    }

    /// Paths of every populated leaf and container, list indices folded to
    /// `*`. Two instances with the same shape yield the same set.
    pub fn populated_shape(&self) -> BTreeSet<String> {
        let mut shape = BTreeSet::new();
        collect_shape(self, "", &mut shape);
        shape
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }
}

fn collect_shape(instance: &Instance, prefix: &str, shape: &mut BTreeSet<String>) {
    for (name, value) in instance.fields() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        collect_value_shape(value, path, shape);
    }
}

fn collect_value_shape(value: &Value, path: String, shape: &mut BTreeSet<String>) {
    match value {
        Value::Absent => {}
        Value::Object(nested) => {
            collect_shape(nested, &path, shape);
            shape.insert(path);
        }
        Value::List(items) => {
            let element_path = format!("{path}/*");
            for item in items {
                collect_value_shape(item, element_path.clone(), shape);
            }
            shape.insert(path);
        }
        _ => {
            shape.insert(path);
        }
    }
}
