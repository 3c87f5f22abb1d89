// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Drift Calculation

use cim_iac_assets::domain::drift::CLOUD_COMPUTED_PATHS;
use cim_iac_assets::domain::value::property_map;
use cim_iac_assets::domain::{calculate_drift, DriftWhitelist, PropertyMap, ProviderFamily};
use proptest::prelude::*;
use serde_json::{json, Value};

const KEYS: &[&str] = &["size", "name", "mode", "encrypted", "arn", "id", "tagsAll"];

// ============================================================================
// Strategies
// ============================================================================

fn flat_state() -> impl Strategy<Value = PropertyMap> {
    prop::collection::btree_map(prop::sample::select(KEYS), 0i64..4, 0..KEYS.len()).prop_map(
        |entries| {
            property_map(Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), json!(value)))
                    .collect(),
            ))
        },
    )
}

fn nested_state() -> impl Strategy<Value = PropertyMap> {
    (0i64..3, 0i64..3, prop::option::of(0i64..3)).prop_map(|(size, replicas, extra)| {
        let mut spec = json!({ "size": size, "replicas": replicas });
        if let Some(extra) = extra {
            spec["extra"] = json!(extra);
        }
        property_map(json!({ "spec": spec, "tagsAll": { "rev": replicas } }))
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: reported paths are declared and never provider computed
    #[test]
    fn prop_only_whitelisted_paths_reported(
        inputs in flat_state(),
        old in flat_state(),
        new in flat_state(),
    ) {
        let whitelist = DriftWhitelist::for_resource(ProviderFamily::Aws, &inputs, &old);
        let drift = calculate_drift(&old, &new, &whitelist);
        let seed = if inputs.is_empty() { &old } else { &inputs };

        for entry in drift.entries() {
            prop_assert!(seed.contains_key(&entry.path), "{} not declared", entry.path);
            prop_assert!(!CLOUD_COMPUTED_PATHS.contains(&entry.path.as_str()));
            prop_assert_ne!(&entry.old_value, &entry.new_value);
        }
    }

    /// Property: a resource compared with itself never drifts
    #[test]
    fn prop_identical_states_never_drift(state in flat_state(), inputs in flat_state()) {
        let whitelist = DriftWhitelist::for_resource(ProviderFamily::Aws, &inputs, &state);
        prop_assert!(calculate_drift(&state, &state, &whitelist).is_empty());
    }

    /// Property: swapping old and new reports the same paths with values swapped
    #[test]
    fn prop_drift_is_symmetric(inputs in flat_state(), old in flat_state(), new in flat_state()) {
        let whitelist = DriftWhitelist::for_resource(ProviderFamily::Aws, &inputs, &old);
        let forward = calculate_drift(&old, &new, &whitelist);
        let backward = calculate_drift(&new, &old, &whitelist);

        prop_assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.entries().iter().zip(backward.entries()) {
            prop_assert_eq!(&f.path, &b.path);
            prop_assert_eq!(&f.old_value, &b.new_value);
            prop_assert_eq!(&f.new_value, &b.old_value);
        }
    }

    /// Property: entries come out ordered by path
    #[test]
    fn prop_entries_sorted(old in nested_state(), new in nested_state()) {
        let whitelist = DriftWhitelist::for_resource(ProviderFamily::Aws, &PropertyMap::new(), &old);
        let drift = calculate_drift(&old, &new, &whitelist);
        let paths: Vec<&str> = drift.entries().iter().map(|e| e.path.as_str()).collect();

        let mut sorted = paths.clone();
        sorted.sort();
        prop_assert_eq!(paths, sorted);
        prop_assert!(drift.entries().iter().all(|e| !e.path.starts_with("tagsAll")));
    }
}
