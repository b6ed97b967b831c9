//! Request normalizer: turns a validated argument set into a wire payload.
//!
//! Payload keys keep insertion order, so the same arguments always produce
//! byte-identical JSON. Unset arguments never become keys; present values are
//! copied even when empty (an empty description clears the remote value).

use crate::rules::{self, Rule};
use crate::tools::ArgumentSet;
use crate::types::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Static caller-name → wire-name table for one operation.
pub type FieldMap = &'static [(&'static str, &'static str)];

// =============================================================================
// Payload
// =============================================================================

/// Canonical request mapping sent to the resource client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Serialized JSON body.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }
}

// =============================================================================
// Field mapping
// =============================================================================

/// Copy every present argument listed in `fields`, renamed to its wire name.
pub fn map_fields(args: &ArgumentSet, fields: FieldMap) -> Payload {
    let mut payload = Payload::new();
    copy_fields(&mut payload, args, fields);
    payload
}

/// Append present arguments listed in `fields` to an existing payload.
pub fn copy_fields(payload: &mut Payload, args: &ArgumentSet, fields: FieldMap) {
    for (caller, wire) in fields {
        if let Some(value) = args.get(caller) {
            payload.insert(*wire, value.clone());
        }
    }
}

// =============================================================================
// Positional expansion
// =============================================================================

/// Expand a list into `Prefix.1`, `Prefix.2`, … keeping input order.
pub fn expand_indexed(payload: &mut Payload, prefix: &str, values: &[Value]) {
    for (i, value) in values.iter().enumerate() {
        payload.insert(format!("{}.{}", prefix, i + 1), value.clone());
    }
}

/// Expand a key → values mapping into `Prefix.N.Key` / `Prefix.N.Values.M`.
pub fn expand_tag_map(payload: &mut Payload, prefix: &str, tags: &Map<String, Value>) {
    for (i, (key, values)) in tags.iter().enumerate() {
        let entry = format!("{}.{}", prefix, i + 1);
        payload.insert(format!("{entry}.Key"), key.as_str());
        if let Some(values) = values.as_array() {
            expand_indexed(payload, &format!("{entry}.Values"), values);
        }
    }
}

// =============================================================================
// Nested list elements
// =============================================================================

/// Validate every element of a list-of-mapping argument with `element_rules`.
///
/// The first malformed element rejects the whole request; the error names the
/// argument and the element index.
pub fn check_elements(args: &ArgumentSet, field: &str, element_rules: &[Rule]) -> Result<()> {
    let Some(items) = args.array(field) else {
        return Ok(());
    };
    for (i, item) in items.iter().enumerate() {
        let element = match item {
            Value::Object(map) => ArgumentSet::from_map(map.clone()),
            _ => {
                return Err(Error::validation(format!(
                    "{field}[{i}] must be an object"
                )))
            }
        };
        rules::check_all(element_rules, &element).map_err(|e| match e {
            Error::Validation(msg) => Error::validation(format!("{field}[{i}]: {msg}")),
            other => other,
        })?;
    }
    Ok(())
}

// =============================================================================
// Node fan-out
// =============================================================================

/// Role tag of one node in an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeRole {
    Primary,
    Secondary,
    ReadOnly,
}

/// One node of the expanded node list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDescriptor {
    pub node_type: NodeRole,
    pub zone_id: String,
    pub node_spec: String,
}

/// A group of equivalent nodes. `zone = None` falls back to the primary zone.
#[derive(Debug, Clone, Copy)]
pub struct NodeGroup<'a> {
    pub count: u64,
    pub zone: Option<&'a str>,
    pub spec: &'a str,
}

/// Expand node groups into descriptors: one Primary, then `secondary.count`
/// Secondary nodes, then `read_only.count` ReadOnly nodes.
pub fn fan_out_nodes(
    primary_zone: &str,
    primary_spec: &str,
    secondary: NodeGroup<'_>,
    read_only: NodeGroup<'_>,
) -> Vec<NodeDescriptor> {
    let mut nodes = vec![NodeDescriptor {
        node_type: NodeRole::Primary,
        zone_id: primary_zone.to_string(),
        node_spec: primary_spec.to_string(),
    }];
    for (role, group) in [(NodeRole::Secondary, secondary), (NodeRole::ReadOnly, read_only)] {
        let zone = group.zone.unwrap_or(primary_zone);
        for _ in 0..group.count {
            nodes.push(NodeDescriptor {
                node_type: role,
                zone_id: zone.to_string(),
                node_spec: group.spec.to_string(),
            });
        }
    }
    nodes
}

// =============================================================================
// Tests
// =============================================================================
