// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attribute Projection
//!
//! Flattens a resource's observed outputs into the attribute map stored on an
//! asset node. Cluster resources carry live status and engine bookkeeping
//! fields that are suppressed here; cloud resources are stored as observed.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::provider::ProviderFamily;
use super::value::PropertyMap;

/// Top-level output keys never stored for cluster resources
pub const CLUSTER_SUPPRESSED_FIELDS: &[&str] = &["status", "__inputs", "__initialApiVersion"];

/// Nested fields of cluster resources that are stored as a YAML document string
pub const CLUSTER_YAML_FIELDS: &[&str] = &["metadata.managedFields", "data.spec.template"];

/// Storable attribute map.
///
/// Serializes as a JSON *string*, which is the shape the asset store expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a compact JSON object string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self.to_json_string().map_err(S::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        serde_json::from_str(&encoded)
            .map(Attributes)
            .map_err(D::Error::custom)
    }
}

/// Projects observed outputs into [`Attributes`] with per-family suppression
#[derive(Debug, Clone)]
pub struct AttributeProjector {
    suppressed: &'static [&'static str],
    yaml_fields: &'static [&'static str],
}

impl AttributeProjector {
    /// Projector configured for a provider family
    pub fn for_family(family: ProviderFamily) -> Self {
        match family {
            ProviderFamily::Kubernetes => Self {
                suppressed: CLUSTER_SUPPRESSED_FIELDS,
                yaml_fields: CLUSTER_YAML_FIELDS,
            },
            ProviderFamily::Aws | ProviderFamily::Unknown => Self {
                suppressed: &[],
                yaml_fields: &[],
            },
        }
    }

    pub fn project(&self, outputs: &PropertyMap) -> Attributes {
        let mut attributes: BTreeMap<String, Value> = outputs
            .iter()
            .filter(|(key, _)| !self.suppressed.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();

        for path in self.yaml_fields {
            render_as_yaml(&mut attributes, path);
        }

        Attributes(attributes)
    }
}

/// Replace the value at `path` by its YAML rendering, if present
fn render_as_yaml(attributes: &mut BTreeMap<String, Value>, path: &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    let parent = rest
        .iter()
        .try_fold(attributes.get_mut(*first), |current, segment| {
            Some(current?.as_object_mut()?.get_mut(*segment))
        })
        .flatten()
        .and_then(Value::as_object_mut);

    let Some(target) = parent.and_then(|object| object.get_mut(leaf)) else {
        return;
    };
    if target.is_string() || target.is_null() {
        return;
    }

    match serde_yaml::to_string(&*target) {
        Ok(yaml) => *target = Value::String(yaml),
        Err(e) => warn!(field = %path, "failed to render field as yaml: {}", e),
    }
}
