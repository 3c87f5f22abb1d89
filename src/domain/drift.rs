// Copyright (c) 2025 - Cowboy AI, Inc.
//! Drift Calculation
//!
//! Structural diff between the prior and the refreshed state of one resource,
//! restricted to a whitelist of user-meaningful attribute paths.
//!
//! # Whitelist
//!
//! The whitelist starts from the top-level keys the user declared (the prior
//! state's inputs), or every output key when no inputs were recorded. Paths the
//! provider computes on its own are then removed, so churn in fields like
//! `arn` or `metadata.resourceVersion` never shows up as drift.
//!
//! # Granularity
//!
//! Nested mappings are walked down to their leaves and reported with dotted
//! paths (`spec.replicas`). Sequences are compared as a whole.
//!
//! Keys are joined verbatim. A key that itself contains a dot is not escaped:
//! ConfigMap key `config.yaml` under `data` is reported as `data.config.yaml`,
//! the same path a nested `data.config.yaml` would get.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::provider::ProviderFamily;
use super::value::{PropertyMap, PropertyValue};

/// Provider-computed paths of cloud resources
pub const CLOUD_COMPUTED_PATHS: &[&str] = &["arn", "id", "urn", "tagsAll"];

/// Provider-computed paths of cluster resources
pub const CLUSTER_COMPUTED_PATHS: &[&str] = &[
    "status",
    "metadata.resourceVersion",
    "metadata.generation",
    "metadata.managedFields",
    "__inputs",
    "__initialApiVersion",
];

/// Errors raised when drift cannot be computed at all
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriftError {
    /// An update step arrived without a prior state to compare against
    #[error("no prior state recorded for {0}")]
    MissingPriorState(String),

    /// An update step arrived without a refreshed state
    #[error("no refreshed state recorded for {0}")]
    MissingNewState(String),
}

/// One drifted attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEntry {
    /// Dotted attribute path
    pub path: String,
    /// Value in the prior (desired) state; `null` when absent
    pub old_value: Value,
    /// Value in the refreshed (observed) state; `null` when absent
    pub new_value: Value,
}

/// All drifted attributes of one resource, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriftRecord {
    entries: Vec<DriftEntry>,
}

impl DriftRecord {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[DriftEntry] {
        &self.entries
    }

    /// Entry for an exact path
    pub fn get(&self, path: &str) -> Option<&DriftEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }
}

/// Set of attribute paths eligible for drift reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftWhitelist {
    allowed: BTreeSet<String>,
    computed: BTreeSet<String>,
}

impl DriftWhitelist {
    /// Whitelist from explicit paths, with no computed exclusions
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: paths.into_iter().map(Into::into).collect(),
            computed: BTreeSet::new(),
        }
    }

    /// Whitelist for one resource of `family`, seeded from its prior state
    pub fn for_resource(family: ProviderFamily, inputs: &PropertyMap, outputs: &PropertyMap) -> Self {
        let seed = if inputs.is_empty() { outputs } else { inputs };
        let computed: &[&str] = match family {
            ProviderFamily::Aws => CLOUD_COMPUTED_PATHS,
            ProviderFamily::Kubernetes => CLUSTER_COMPUTED_PATHS,
            ProviderFamily::Unknown => &[],
        };

        Self {
            allowed: seed.keys().cloned().collect(),
            computed: computed.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether `path` may be reported.
    ///
    /// A path is allowed when one of its prefixes is whitelisted and none of
    /// its prefixes is a computed path.
    pub fn allows(&self, path: &str) -> bool {
        let prefixes = path_prefixes(path);
        prefixes.iter().any(|p| self.allowed.contains(*p))
            && !prefixes.iter().any(|p| self.computed.contains(*p))
    }

    /// Whether any whitelisted path lives under `path` (so descending is useful)
    fn may_contain(&self, path: &str) -> bool {
        if self.allows(path) {
            return true;
        }
        let nested = format!("{}.", path);
        self.allowed.iter().any(|allowed| allowed.starts_with(&nested))
    }
}

/// `a.b.c` → `["a", "a.b", "a.b.c"]`
fn path_prefixes(path: &str) -> Vec<&str> {
    path.char_indices()
        .filter(|(_, c)| *c == '.')
        .map(|(i, _)| &path[..i])
        .chain(std::iter::once(path))
        .collect()
}

/// Compute drift between `old` and `new` restricted to `whitelist`
pub fn calculate_drift(old: &PropertyMap, new: &PropertyMap, whitelist: &DriftWhitelist) -> DriftRecord {
    let mut entries = Vec::new();
    diff_maps("", old, new, whitelist, &mut entries);
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    DriftRecord { entries }
}

fn diff_maps(
    prefix: &str,
    old: &PropertyMap,
    new: &PropertyMap,
    whitelist: &DriftWhitelist,
    entries: &mut Vec<DriftEntry>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for key in keys {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        if !whitelist.may_contain(&path) {
            continue;
        }

        match (old.get(key), new.get(key)) {
            (Some(PropertyValue::Mapping(old_inner)), Some(PropertyValue::Mapping(new_inner))) => {
                diff_maps(&path, old_inner, new_inner, whitelist, entries);
            }
            (old_value, new_value) if old_value != new_value => {
                if whitelist.allows(&path) {
                    entries.push(DriftEntry {
                        path,
                        old_value: old_value.map(PropertyValue::to_json).unwrap_or(Value::Null),
                        new_value: new_value.map(PropertyValue::to_json).unwrap_or(Value::Null),
                    });
                }
            }
            _ => {}
        }
    }
}
