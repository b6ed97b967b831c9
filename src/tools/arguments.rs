//! Argument value set: the caller-supplied values for one invocation.
//!
//! A field is either present with a value or absent. JSON `null` coming from a
//! caller means "not supplied" and is dropped on construction, so a present
//! empty string stays distinguishable from an unset field.

use crate::rules::value_type_name;
use crate::types::{Error, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    values: Map<String, Value>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Build from a JSON object, dropping `null` entries.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let values = map.into_iter().filter(|(_, v)| !v.is_null()).collect();
        Self { values }
    }

    /// Build from any JSON value; `null` yields an empty set, non-objects are rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Ok(Self::new()),
            other => Err(Error::validation(format!(
                "arguments must be a JSON object, got {}",
                value_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn array(&self, name: &str) -> Option<&Vec<Value>> {
        self.values.get(name).and_then(Value::as_array)
    }

    pub fn object(&self, name: &str) -> Option<&Map<String, Value>> {
        self.values.get(name).and_then(Value::as_object)
    }

    /// Set a field. Setting `null` unsets it.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if value.is_null() {
            self.values.remove(&name);
        } else {
            self.values.insert(name, value);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
