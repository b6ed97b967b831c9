//! Operation catalog: typed metadata, argument binding, input schemas.
//!
//! Each operation is described once by an [`OperationDescriptor`]: its
//! arguments, the ordered rules that guard it, the wire endpoint it targets
//! and the normalizer that builds its payload.

use crate::client::{Endpoint, PreparedRequest};
use crate::normalize::Payload;
use crate::rules::{self, value_type_name, Rule};
use crate::tools::ArgumentSet;
use crate::types::{Error, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// =============================================================================
// Parameter types
// =============================================================================

/// Semantic type of an operation argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Bool,
    StringList,
    /// List of mappings (tag filters, privilege lists, bind infos).
    ObjectList,
    /// Mapping from string key to a list of strings.
    StringListMap,
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Int => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(format!("expected integer, got {}", value_type_name(value)))
                }
            }
            ParamType::Bool => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ParamType::StringList => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| format!("expected array, got {}", value_type_name(value)))?;
                for (i, item) in arr.iter().enumerate() {
                    if !item.is_string() {
                        return Err(format!(
                            "expected string at index {}, got {}",
                            i,
                            value_type_name(item)
                        ));
                    }
                }
                Ok(())
            }
            ParamType::ObjectList => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| format!("expected array, got {}", value_type_name(value)))?;
                for (i, item) in arr.iter().enumerate() {
                    if !item.is_object() {
                        return Err(format!(
                            "expected object at index {}, got {}",
                            i,
                            value_type_name(item)
                        ));
                    }
                }
                Ok(())
            }
            ParamType::StringListMap => {
                let map = value
                    .as_object()
                    .ok_or_else(|| format!("expected object, got {}", value_type_name(value)))?;
                for (key, values) in map {
                    ParamType::StringList
                        .validate(values)
                        .map_err(|e| format!("key '{}': {}", key, e))?;
                }
                Ok(())
            }
        }
    }

    /// JSON schema fragment for this type.
    pub fn json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Int => json!({"type": "integer"}),
            ParamType::Bool => json!({"type": "boolean"}),
            ParamType::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamType::ObjectList => json!({"type": "array", "items": {"type": "object"}}),
            ParamType::StringListMap => json!({
                "type": "object",
                "additionalProperties": {"type": "array", "items": {"type": "string"}},
            }),
        }
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single argument definition.
#[derive(Debug, Clone, Serialize)]
pub struct ParamDef {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn new(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            default: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn int(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Int, description)
    }

    pub fn bool(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Bool, description)
    }

    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::StringList, description)
    }

    pub fn object_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::ObjectList, description)
    }

    /// Documented default, applied when the caller leaves the argument unset.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

// =============================================================================
// Operation descriptor
// =============================================================================

/// Builds the canonical payload from a validated argument set.
pub type Normalizer = fn(&ArgumentSet) -> Result<Payload>;

/// Static description of one operation.
#[derive(Clone)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: Endpoint,
    pub params: Vec<ParamDef>,
    pub rules: Vec<Rule>,
    pub normalize: Normalizer,
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("params", &self.params.len())
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl OperationDescriptor {
    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Arguments are required exactly when a `Required` rule names them.
    pub fn is_required(&self, name: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule, Rule::Required(field) if *field == name))
    }

    /// Fixed value set for an argument, taken from its `EnumMembership` rule.
    pub fn allowed_values(&self, name: &str) -> Option<&'static [&'static str]> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::EnumMembership { field, allowed } if *field == name => Some(*allowed),
            _ => None,
        })
    }

    /// Type-check caller arguments and apply documented defaults.
    ///
    /// Unknown arguments and type mismatches are all reported together.
    pub fn bind(&self, arguments: Map<String, Value>) -> Result<ArgumentSet> {
        let mut args = ArgumentSet::from_map(arguments);

        let known: HashMap<&str, &ParamDef> = self.params.iter().map(|p| (p.name, p)).collect();
        let mut errors = Vec::new();
        for name in args.names() {
            match known.get(name) {
                Some(param) => {
                    if let Some(value) = args.get(name) {
                        if let Err(e) = param.param_type.validate(value) {
                            errors.push(format!("Parameter '{}': {}", name, e));
                        }
                    }
                }
                None => errors.push(format!("Unknown parameter: {}", name)),
            }
        }
        if !errors.is_empty() {
            return Err(Error::validation(errors.join("; ")));
        }

        for param in &self.params {
            if !args.contains(param.name) {
                if let Some(default) = &param.default {
                    args.set(param.name, default.clone());
                }
            }
        }

        Ok(args)
    }

    /// Run the operation's rules in order.
    pub fn check(&self, args: &ArgumentSet) -> Result<()> {
        rules::check_all(&self.rules, args)
    }

    /// Bind, validate and normalize caller arguments into a request.
    ///
    /// Pure: no I/O, and the same arguments always yield the same request.
    pub fn prepare(&self, arguments: Map<String, Value>) -> Result<PreparedRequest> {
        let args = self.bind(arguments)?;
        self.check(&args)?;
        let payload = (self.normalize)(&args)?;
        Ok(PreparedRequest {
            endpoint: self.endpoint,
            payload,
        })
    }

    /// JSON schema describing the operation's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for param in &self.params {
            let mut schema = param.param_type.json_schema();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".to_string(), json!(param.description));
                if let Some(default) = &param.default {
                    obj.insert("default".to_string(), default.clone());
                }
                if let Some(allowed) = self.allowed_values(param.name) {
                    obj.insert("enum".to_string(), json!(allowed));
                }
            }
            properties.insert(param.name.to_string(), schema);
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .map(|p| p.name)
            .filter(|name| self.is_required(name))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(required));
        schema.insert("additionalProperties".to_string(), json!(false));
        schema
    }
}

// =============================================================================
// Operation catalog
// =============================================================================

/// Registry of operation descriptors keyed by name.
#[derive(Debug, Default)]
pub struct OperationCatalog {
    entries: BTreeMap<&'static str, OperationDescriptor>,
}

impl OperationCatalog {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register an operation. Names must be non-empty and unique.
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(Error::validation("Operation name cannot be empty"));
        }
        if self.entries.contains_key(descriptor.name) {
            return Err(Error::validation(format!(
                "Operation already registered: {}",
                descriptor.name
            )));
        }
        self.entries.insert(descriptor.name, descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.entries.get(name)
    }

    /// All operation names, sorted.
    pub fn list_names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// All descriptors, sorted by name.
    pub fn list_entries(&self) -> Vec<&OperationDescriptor> {
        self.entries.values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
