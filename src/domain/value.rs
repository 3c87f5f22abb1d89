// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Property Values
//!
//! Provisioning engines report resource inputs and outputs as loosely typed
//! trees. Everything downstream (attribute projection, drift calculation,
//! identifier extraction) works over [`PropertyValue`], a closed tagged variant
//! that can be matched exhaustively instead of probed with runtime casts.
//!
//! ```text
//! PropertyValue
//!   ├── Null
//!   ├── Bool
//!   ├── Number
//!   ├── String
//!   ├── Sequence(Vec<PropertyValue>)
//!   └── Mapping(PropertyMap)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key → value map of resource properties, ordered by key
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single resource property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Explicit null / unknown
    Null,
    /// Boolean primitive
    Bool(bool),
    /// Numeric primitive (integer or float, as reported)
    Number(Number),
    /// String primitive
    String(String),
    /// Ordered list of values
    Sequence(Vec<PropertyValue>),
    /// Nested property map
    Mapping(PropertyMap),
}

impl PropertyValue {
    /// Borrow as a string primitive
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a nested mapping
    pub fn as_mapping(&self) -> Option<&PropertyMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render a primitive as text. Strings are returned unquoted, numbers and
    /// booleans in their JSON spelling. Containers and null yield `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Sequence(_) | Self::Mapping(_) => None,
        }
    }

    /// Walk a dotted path (`metadata.name`) through nested mappings
    pub fn get_path(&self, path: &str) -> Option<&PropertyValue> {
        path.split('.').try_fold(self, |current, segment| {
            current.as_mapping().and_then(|map| map.get(segment))
        })
    }

    /// Convert into a plain JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Look up a dotted path inside a property map
pub fn lookup<'a>(map: &'a PropertyMap, path: &str) -> Option<&'a PropertyValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    segments.try_fold(map.get(first)?, |current, segment| {
        current.as_mapping().and_then(|inner| inner.get(segment))
    })
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

/// Build a [`PropertyMap`] from a JSON object literal.
///
/// Non-object values produce an empty map.
pub fn property_map(value: Value) -> PropertyMap {
    match PropertyValue::from(value) {
        PropertyValue::Mapping(map) => map,
        _ => PropertyMap::new(),
    }
}
